//! Mirror operations addressed by the conventional integer flip codes.

use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::decode::DecodedImage;

/// Flip direction, keyed by the integer codes clients send.
///
/// - `0`: flip around the x-axis (upside down)
/// - `1`: flip around the y-axis (left-right mirror)
/// - `-1`: both, which equals a 180 degree rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipCode {
    Vertical,
    Horizontal,
    Both,
}

impl FlipCode {
    /// The integer code of this flip.
    pub fn code(self) -> i32 {
        match self {
            FlipCode::Vertical => 0,
            FlipCode::Horizontal => 1,
            FlipCode::Both => -1,
        }
    }
}

impl TryFrom<f64> for FlipCode {
    type Error = TransformError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 0.0 {
            Ok(FlipCode::Vertical)
        } else if value == 1.0 {
            Ok(FlipCode::Horizontal)
        } else if value == -1.0 {
            Ok(FlipCode::Both)
        } else {
            Err(TransformError::InvalidFlipCode(value))
        }
    }
}

/// Mirror an image.
pub fn apply_flip(image: &DecodedImage, code: FlipCode) -> DecodedImage {
    let (flip_rows, flip_cols) = match code {
        FlipCode::Vertical => (true, false),
        FlipCode::Horizontal => (false, true),
        FlipCode::Both => (true, true),
    };

    let row_bytes = (image.width as usize) * 3;
    let mut output = Vec::with_capacity(image.pixels.len());

    for y in 0..image.height {
        let src_y = if flip_rows { image.height - 1 - y } else { y };
        let start = (src_y as usize) * row_bytes;
        let row = &image.pixels[start..start + row_bytes];

        if flip_cols {
            for px in row.chunks_exact(3).rev() {
                output.extend_from_slice(px);
            }
        } else {
            output.extend_from_slice(row);
        }
    }

    DecodedImage::new(image.width, image.height, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x2 image with distinct pixels:
    //   A B C
    //   D E F
    fn abc_def() -> DecodedImage {
        let mut pixels = Vec::new();
        for v in [10u8, 20, 30, 40, 50, 60] {
            pixels.extend_from_slice(&[v, v + 1, v + 2]);
        }
        DecodedImage::new(3, 2, pixels)
    }

    #[test]
    fn test_flip_codes() {
        assert_eq!(FlipCode::try_from(0.0).unwrap(), FlipCode::Vertical);
        assert_eq!(FlipCode::try_from(1.0).unwrap(), FlipCode::Horizontal);
        assert_eq!(FlipCode::try_from(-1.0).unwrap(), FlipCode::Both);
        assert_eq!(FlipCode::Both.code(), -1);
    }

    #[test]
    fn test_unknown_flip_code_rejected() {
        for bad in [2.0, -2.0, 0.5, f64::NAN] {
            assert!(matches!(
                FlipCode::try_from(bad),
                Err(TransformError::InvalidFlipCode(_))
            ));
        }
    }

    #[test]
    fn test_vertical_flip_swaps_rows() {
        let result = apply_flip(&abc_def(), FlipCode::Vertical);
        assert_eq!(result.pixel(0, 0), [40, 41, 42]);
        assert_eq!(result.pixel(2, 1), [30, 31, 32]);
    }

    #[test]
    fn test_horizontal_flip_mirrors_columns() {
        let result = apply_flip(&abc_def(), FlipCode::Horizontal);
        assert_eq!(result.pixel(0, 0), [30, 31, 32]);
        assert_eq!(result.pixel(2, 1), [40, 41, 42]);
    }

    #[test]
    fn test_both_flip_reverses_everything() {
        let result = apply_flip(&abc_def(), FlipCode::Both);
        assert_eq!(result.pixel(0, 0), [60, 61, 62]);
        assert_eq!(result.pixel(2, 1), [10, 11, 12]);
    }

    #[test]
    fn test_flip_is_involution() {
        let img = abc_def();
        for code in [FlipCode::Vertical, FlipCode::Horizontal, FlipCode::Both] {
            assert_eq!(apply_flip(&apply_flip(&img, code), code), img);
        }
    }
}
