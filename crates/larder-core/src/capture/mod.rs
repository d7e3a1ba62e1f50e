//! Capture adapter: camera activation, live stream, still snapshot.
//!
//! The session opens a [`FrameSource`], keeps it streaming until the user
//! takes a still, then stops it. Retaking discards the still but does not
//! reopen the stream; the camera has to be activated again.

mod encode;
mod ffmpeg;
mod file;

use thiserror::Error;

pub use encode::{encode_jpeg, is_jpeg};
pub use ffmpeg::FfmpegCamera;
pub use file::ImageFileSource;

/// An encoded still frame ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl StillImage {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Camera access denied: {0}")]
    AccessDenied(String),

    #[error("Camera error: {0}")]
    Device(String),

    #[error("Camera is not streaming")]
    NotStreaming,

    #[error("No frame received from camera")]
    NoFrame,
}

/// A device (or stand-in) that can stream frames.
pub trait FrameSource: Send {
    /// Human-readable source name for logs
    fn describe(&self) -> String;

    /// Acquire the device and start streaming
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Grab one frame from the running stream, encoded as JPEG
    fn grab_frame(&mut self) -> Result<Vec<u8>, CaptureError>;

    /// Stop streaming and release the device; safe to call twice
    fn close(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    /// Capture surface not shown
    Closed,
    /// Device open, live frames available
    Streaming,
    /// A still was taken; the stream has been stopped
    Captured(StillImage),
    /// Surface open after a retake, stream not running
    Stopped,
}

pub struct CaptureSession {
    source: Box<dyn FrameSource>,
    state: CaptureState,
}

impl CaptureSession {
    pub fn new(source: Box<dyn FrameSource>) -> Self {
        Self {
            source,
            state: CaptureState::Closed,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != CaptureState::Closed
    }

    /// Request the camera and start the live stream.
    ///
    /// On failure the surface is closed again.
    pub fn activate(&mut self) -> Result<(), CaptureError> {
        if self.state == CaptureState::Streaming {
            return Ok(());
        }
        crate::verbose!("Opening capture source {}", self.source.describe());

        match self.source.open() {
            Ok(()) => {
                self.state = CaptureState::Streaming;
                Ok(())
            }
            Err(e) => {
                self.source.close();
                self.state = CaptureState::Closed;
                Err(e)
            }
        }
    }

    /// Take one still and stop the stream
    pub fn snapshot(&mut self) -> Result<&StillImage, CaptureError> {
        if self.state != CaptureState::Streaming {
            return Err(CaptureError::NotStreaming);
        }

        let frame = self.source.grab_frame();
        self.source.close();

        match frame {
            Ok(bytes) => {
                crate::verbose!("Captured still ({:.1} KB)", bytes.len() as f64 / 1024.0);
                self.state = CaptureState::Captured(StillImage::jpeg(bytes));
                self.still().ok_or(CaptureError::NoFrame)
            }
            Err(e) => {
                self.state = CaptureState::Closed;
                Err(e)
            }
        }
    }

    /// Discard the still. The stream stays stopped until `activate` is called.
    pub fn retake(&mut self) {
        if matches!(self.state, CaptureState::Captured(_)) {
            self.state = CaptureState::Stopped;
        }
    }

    /// The still taken, if any
    pub fn still(&self) -> Option<&StillImage> {
        match &self.state {
            CaptureState::Captured(still) => Some(still),
            _ => None,
        }
    }

    /// Close the surface, releasing the device and dropping any still
    pub fn close(&mut self) {
        self.source.close();
        self.state = CaptureState::Closed;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.source.close();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted frame source recording how it was driven
    #[derive(Clone, Default)]
    pub(crate) struct FakeCamera {
        pub deny: bool,
        pub log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FrameSource for FakeCamera {
        fn describe(&self) -> String {
            "fake".into()
        }

        fn open(&mut self) -> Result<(), CaptureError> {
            self.log.lock().unwrap().push("open");
            if self.deny {
                Err(CaptureError::AccessDenied("permission denied".into()))
            } else {
                Ok(())
            }
        }

        fn grab_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
            self.log.lock().unwrap().push("grab");
            Ok(vec![0xFF, 0xD8, 0x01, 0xFF, 0xD9])
        }

        fn close(&mut self) {
            self.log.lock().unwrap().push("close");
        }
    }

    #[test]
    fn snapshot_stops_the_stream() {
        let camera = FakeCamera::default();
        let log = camera.log.clone();
        let mut session = CaptureSession::new(Box::new(camera));

        session.activate().unwrap();
        assert_eq!(session.state(), &CaptureState::Streaming);

        let still = session.snapshot().unwrap().clone();
        assert_eq!(still.mime_type, "image/jpeg");
        assert_eq!(*log.lock().unwrap(), vec!["open", "grab", "close"]);
        assert!(session.snapshot().is_err());
    }

    #[test]
    fn retake_does_not_restart_stream() {
        let camera = FakeCamera::default();
        let log = camera.log.clone();
        let mut session = CaptureSession::new(Box::new(camera));

        session.activate().unwrap();
        session.snapshot().unwrap();
        session.retake();

        assert_eq!(session.state(), &CaptureState::Stopped);
        assert!(session.still().is_none());
        assert!(matches!(session.snapshot(), Err(CaptureError::NotStreaming)));
        assert_eq!(log.lock().unwrap().iter().filter(|e| **e == "open").count(), 1);

        session.activate().unwrap();
        assert!(session.snapshot().is_ok());
    }

    #[test]
    fn denied_access_closes_surface() {
        let camera = FakeCamera {
            deny: true,
            ..Default::default()
        };
        let mut session = CaptureSession::new(Box::new(camera));

        assert!(matches!(
            session.activate(),
            Err(CaptureError::AccessDenied(_))
        ));
        assert!(!session.is_open());
    }
}
