//! Still-image encoding for upload.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Longest edge sent to the model; larger photos are scaled down
const MAX_EDGE: u32 = 1536;

const JPEG_QUALITY: u8 = 85;

/// JPEG start-of-image marker
const SOI: [u8; 2] = [0xFF, 0xD8];

pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&SOI)
}

/// Re-encode any supported image (JPEG, PNG, WebP) as a JPEG of bounded size.
///
/// Small JPEGs pass through untouched.
pub fn encode_jpeg(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes).context("Unsupported or corrupt image")?;

    let oversized = img.width().max(img.height()) > MAX_EDGE;
    if is_jpeg(bytes) && !oversized {
        return Ok(bytes.to_vec());
    }

    let img = if oversized {
        img.resize(MAX_EDGE, MAX_EDGE, FilterType::Triangle)
    } else {
        img
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    image::DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .context("Failed to encode JPEG")?;

    crate::verbose!(
        "Encoded still as JPEG: {:.1} KB -> {:.1} KB",
        bytes.len() as f64 / 1024.0,
        out.len() as f64 / 1024.0
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_becomes_jpeg() {
        let jpeg = encode_jpeg(&png(8, 8)).unwrap();
        assert!(is_jpeg(&jpeg));
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn large_images_are_scaled_down() {
        let jpeg = encode_jpeg(&png(2000, 1000)).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), MAX_EDGE);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(encode_jpeg(b"definitely not an image").is_err());
    }
}
