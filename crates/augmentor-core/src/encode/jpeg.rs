//! JPEG encoding and artifact writing.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

use crate::decode::DecodedImage;

/// Quality used when nothing else is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Errors that can occur while encoding or writing an artifact.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },
}

/// Encode RGB pixel data to JPEG bytes.
///
/// `quality` is clamped to 1..=100.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Encode a decoded raster to JPEG bytes.
pub fn encode_image(image: &DecodedImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    encode_jpeg(&image.pixels, image.width, image.height, quality)
}

/// Encode `image` and write it to `path`, replacing any existing file.
pub fn write_jpeg(path: &Path, image: &DecodedImage, quality: u8) -> Result<(), EncodeError> {
    let bytes = encode_image(image, quality)?;
    fs::write(path, bytes).map_err(|e| EncodeError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
