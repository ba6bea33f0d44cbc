//! Image-mode transform pipeline.
//!
//! Runs every operation of a [`TransformPlan`] against the same source image,
//! in the fixed order zoom, rotation, flip, de-texturize, augmentation, and
//! writes one JPEG per value. The first failure stops the run; artifacts
//! already written stay on disk.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::decode::DecodedImage;
use crate::encode::{write_jpeg, EncodeError};
use crate::options::TransformPlan;
use crate::transform::TransformError;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{file}: {source}")]
    Transform {
        file: String,
        #[source]
        source: TransformError,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Files produced by one request, in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    pub output_dir: PathBuf,
    pub files: Vec<String>,
}

impl OutputBundle {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            files: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `(name, path on disk)` for every artifact.
    pub fn entries(&self) -> impl Iterator<Item = (&str, PathBuf)> + '_ {
        self.files
            .iter()
            .map(|name| (name.as_str(), self.output_dir.join(name)))
    }
}

/// Apply `plan` to `image` and write the artifacts into `output_dir`.
///
/// `output_dir` must already exist.
#[tracing::instrument(skip(image, plan), fields(width = image.width, height = image.height))]
pub fn process(
    image: &DecodedImage,
    plan: &TransformPlan,
    output_dir: &Path,
    quality: u8,
) -> Result<OutputBundle, PipelineError> {
    let mut bundle = OutputBundle::new(output_dir);

    for (kind, operations) in plan.groups() {
        for (index, operation) in operations.iter().enumerate() {
            let name = kind.artifact_name(index);
            let output = operation
                .apply(image)
                .map_err(|source| PipelineError::Transform {
                    file: name.clone(),
                    source,
                })?;

            write_jpeg(&output_dir.join(&name), &output, quality)?;
            debug!(file = %name, ?operation, "wrote artifact");
            bundle.files.push(name);
        }
    }

    info!(count = bundle.len(), dir = %output_dir.display(), "image pipeline finished");
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{OperationSetting, TransformOptions};
    use crate::transform::FlipCode;

    fn sample(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn only_flips(codes: Vec<FlipCode>) -> TransformPlan {
        TransformPlan {
            zoom: vec![],
            rotation: vec![],
            flip: codes,
            blur: vec![],
            augmentation: vec![],
        }
    }

    #[test]
    fn test_default_plan_writes_24_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = process(&sample(32, 24), &TransformPlan::default(), dir.path(), 95).unwrap();

        assert_eq!(bundle.len(), 24);
        assert_eq!(bundle.files[0], "zoomed_image_0.jpg");
        assert_eq!(bundle.files[3], "rotated_image_0.jpg");
        assert_eq!(bundle.files[14], "rotated_image_11.jpg");
        assert_eq!(bundle.files[15], "flipped_image_0.jpg");
        assert_eq!(bundle.files[18], "de_texturized_image_0.jpg");
        assert_eq!(bundle.files[23], "augmented_image_2.jpg");

        for (_, path) in bundle.entries() {
            assert!(path.is_file(), "{} missing", path.display());
        }
    }

    #[test]
    fn test_artifacts_keep_source_size() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = process(&sample(20, 12), &TransformPlan::default(), dir.path(), 90).unwrap();

        for (name, path) in bundle.entries() {
            let img = crate::decode::decode_file(&path).unwrap();
            assert_eq!((img.width, img.height), (20, 12), "{name}");
        }
    }

    #[test]
    fn test_operations_read_the_source_not_previous_output() {
        // Flipping twice with the same code must write two identical files,
        // since each flip starts from the original.
        let dir = tempfile::tempdir().unwrap();
        let plan = only_flips(vec![FlipCode::Horizontal, FlipCode::Horizontal]);
        let bundle = process(&sample(10, 10), &plan, dir.path(), 95).unwrap();

        let a = std::fs::read(dir.path().join(&bundle.files[0])).unwrap();
        let b = std::fs::read(dir.path().join(&bundle.files[1])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_disabled_operations_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = TransformOptions {
            zoom: Some(OperationSetting::disabled()),
            rotation: Some(OperationSetting::enabled(vec![90.0])),
            flip: Some(OperationSetting::disabled()),
            blur: Some(OperationSetting::disabled()),
            augmentation: Some(OperationSetting::disabled()),
        };
        let plan = TransformPlan::resolve(&options).unwrap();

        let bundle = process(&sample(8, 8), &plan, dir.path(), 95).unwrap();
        assert_eq!(bundle.files, vec!["rotated_image_0.jpg".to_string()]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_failure_is_fail_fast() {
        // A directory squatting on the second artifact name makes its write
        // fail. The first artifact stays, nothing after it is written.
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("flipped_image_1.jpg")).unwrap();

        let plan = only_flips(vec![FlipCode::Vertical, FlipCode::Horizontal, FlipCode::Both]);
        let result = process(&sample(6, 6), &plan, dir.path(), 95);

        assert!(matches!(result, Err(PipelineError::Encode(EncodeError::WriteFailed { .. }))));
        assert!(dir.path().join("flipped_image_0.jpg").is_file());
        assert!(!dir.path().join("flipped_image_2.jpg").exists());
    }

    #[test]
    fn test_transform_error_names_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut plan = only_flips(vec![]);
        plan.zoom = vec![0.5];

        let err = process(&sample(4, 4), &plan, dir.path(), 95).unwrap_err();
        assert!(err.to_string().starts_with("zoomed_image_0.jpg"));
    }
}
