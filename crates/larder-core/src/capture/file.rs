//! Image file as a capture source (`--image photo.jpg`).

use std::path::PathBuf;

use super::{CaptureError, FrameSource, encode_jpeg};

/// Serves the same image file as every frame
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    path: PathBuf,
    open: bool,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            open: false,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&mut self) -> Result<(), CaptureError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => {
                self.open = true;
                Ok(())
            }
            Ok(_) => Err(CaptureError::Device(format!(
                "{} is not a file",
                self.path.display()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(CaptureError::AccessDenied(e.to_string()))
            }
            Err(e) => Err(CaptureError::Device(format!("{}: {e}", self.path.display()))),
        }
    }

    fn grab_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        if !self.open {
            return Err(CaptureError::NotStreaming);
        }
        let bytes = std::fs::read(&self.path)
            .map_err(|e| CaptureError::Device(format!("{}: {e}", self.path.display())))?;
        encode_jpeg(&bytes).map_err(|e| CaptureError::Device(format!("{e:#}")))
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureSession, is_jpeg};
    use image::{ImageFormat, Rgb, RgbImage};

    #[test]
    fn png_file_is_served_as_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fridge.png");
        RgbImage::from_pixel(4, 4, Rgb([10, 200, 10]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let mut session = CaptureSession::new(Box::new(ImageFileSource::new(&path)));
        session.activate().unwrap();
        let still = session.snapshot().unwrap();
        assert!(is_jpeg(&still.bytes));
    }

    #[test]
    fn missing_file_fails_to_open() {
        let mut source = ImageFileSource::new("/nonexistent/fridge.jpg");
        assert!(matches!(source.open(), Err(CaptureError::Device(_))));
        assert!(matches!(source.grab_frame(), Err(CaptureError::NotStreaming)));
    }
}
