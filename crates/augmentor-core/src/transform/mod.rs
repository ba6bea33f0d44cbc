//! Per-value image transforms.
//!
//! Every transform reads the untouched source image and returns a new raster
//! of the same size. Operations are independent: a rotation never sees the
//! output of a zoom.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Origin is the top-left corner, y grows downward
//! - The rotation pivot is `(width / 2, height / 2)` in integer pixels

mod blur;
mod flip;
mod rotation;
mod zoom;

use thiserror::Error;

use crate::decode::DecodedImage;

pub use blur::{
    apply_augmentation, apply_blur, gaussian_blur, kernel_for_sigma, sigma_for_kernel, KernelSize,
    MAX_KERNEL_SIZE,
};
pub use flip::{apply_flip, FlipCode};
pub use rotation::{apply_rotation, is_full_turn};
pub use zoom::{
    apply_zoom, check_zoom, crop, resize, zoom_dimensions, MAX_ZOOM_FACTOR, MAX_ZOOM_PIXELS,
};

/// Errors raised by a transform or by validating its parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("zoom factor must be between 1.0 and 10.0, got {0}")]
    InvalidZoomFactor(f64),

    #[error("zoom factor {factor} would scale a {width}x{height} image past 100 megapixels")]
    ZoomTooLarge { factor: f64, width: u32, height: u32 },

    #[error("rotation angle must be finite, got {0}")]
    InvalidAngle(f64),

    #[error("flip code must be 0, 1 or -1, got {0}")]
    InvalidFlipCode(f64),

    #[error("blur kernel size must be an odd integer from 1 to 301, got {0}")]
    InvalidKernelSize(f64),

    #[error("augmentation sigma must be positive and at most 50, got {0}")]
    InvalidSigma(f64),

    #[error("cannot resize to {width}x{height}")]
    ResizeFailed { width: u32, height: u32 },
}

/// The five image operations, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Zoom,
    Rotation,
    Flip,
    DeTexturize,
    Augmentation,
}

impl OperationKind {
    /// All operations in the order the pipeline runs them.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Zoom,
        OperationKind::Rotation,
        OperationKind::Flip,
        OperationKind::DeTexturize,
        OperationKind::Augmentation,
    ];

    /// Key used in the options structure.
    pub fn key(self) -> &'static str {
        match self {
            OperationKind::Zoom => "zoom",
            OperationKind::Rotation => "rotation",
            OperationKind::Flip => "flip",
            OperationKind::DeTexturize => "blur",
            OperationKind::Augmentation => "augmentation",
        }
    }

    /// Prefix of artifact filenames, e.g. `zoomed` in `zoomed_image_0.jpg`.
    pub fn file_prefix(self) -> &'static str {
        match self {
            OperationKind::Zoom => "zoomed",
            OperationKind::Rotation => "rotated",
            OperationKind::Flip => "flipped",
            OperationKind::DeTexturize => "de_texturized",
            OperationKind::Augmentation => "augmented",
        }
    }

    /// Artifact filename for the value at `index`.
    pub fn artifact_name(self, index: usize) -> String {
        format!("{}_image_{index}.jpg", self.file_prefix())
    }
}

/// One validated transform with its parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Zoom(f64),
    Rotate(f64),
    Flip(FlipCode),
    DeTexturize(KernelSize),
    Augment(f64),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Zoom(_) => OperationKind::Zoom,
            Operation::Rotate(_) => OperationKind::Rotation,
            Operation::Flip(_) => OperationKind::Flip,
            Operation::DeTexturize(_) => OperationKind::DeTexturize,
            Operation::Augment(_) => OperationKind::Augmentation,
        }
    }

    /// Run this operation on `image`.
    pub fn apply(&self, image: &DecodedImage) -> Result<DecodedImage, TransformError> {
        match *self {
            Operation::Zoom(factor) => apply_zoom(image, factor),
            Operation::Rotate(angle) => {
                if !angle.is_finite() {
                    return Err(TransformError::InvalidAngle(angle));
                }
                Ok(apply_rotation(image, angle))
            }
            Operation::Flip(code) => Ok(apply_flip(image, code)),
            Operation::DeTexturize(size) => apply_blur(image, size),
            Operation::Augment(sigma) => apply_augmentation(image, sigma),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        assert_eq!(OperationKind::Zoom.artifact_name(0), "zoomed_image_0.jpg");
        assert_eq!(OperationKind::Rotation.artifact_name(11), "rotated_image_11.jpg");
        assert_eq!(OperationKind::Flip.artifact_name(2), "flipped_image_2.jpg");
        assert_eq!(
            OperationKind::DeTexturize.artifact_name(1),
            "de_texturized_image_1.jpg"
        );
        assert_eq!(
            OperationKind::Augmentation.artifact_name(0),
            "augmented_image_0.jpg"
        );
    }

    #[test]
    fn test_operation_kind_mapping() {
        assert_eq!(Operation::Zoom(1.5).kind(), OperationKind::Zoom);
        assert_eq!(Operation::Flip(FlipCode::Both).kind(), OperationKind::Flip);
        assert_eq!(Operation::Augment(5.0).kind().key(), "augmentation");
        assert_eq!(OperationKind::DeTexturize.key(), "blur");
    }

    #[test]
    fn test_every_operation_keeps_canvas() {
        let img = DecodedImage::new(12, 7, vec![77; 12 * 7 * 3]);
        let ops = [
            Operation::Zoom(1.2),
            Operation::Rotate(30.0),
            Operation::Flip(FlipCode::Vertical),
            Operation::DeTexturize(KernelSize::new(5).unwrap()),
            Operation::Augment(5.0),
        ];
        for op in ops {
            let out = op.apply(&img).unwrap();
            assert_eq!((out.width, out.height), (12, 7), "{op:?}");
        }
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let img = DecodedImage::black(3, 3);
        assert!(matches!(
            Operation::Rotate(f64::NAN).apply(&img),
            Err(TransformError::InvalidAngle(_))
        ));
    }
}
