//! Request-level error taxonomy.
//!
//! Module errors are folded into four kinds that decide the status a caller
//! sees: bad input (400), missing file (404), undecodable media (400) and
//! everything that went wrong while producing output (500).

use thiserror::Error;

use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::options::OptionsError;
use crate::pipeline::PipelineError;
use crate::storage::{ArchiveError, StorageError};
use crate::video::VideoError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AugmentError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("processing error: {0}")]
    Processing(String),
}

pub type AugmentResult<T> = Result<T, AugmentError>;

impl AugmentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            AugmentError::Validation(_) | AugmentError::Decode(_) => 400,
            AugmentError::NotFound(_) => 404,
            AugmentError::Processing(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AugmentError::Validation(_) => "validation",
            AugmentError::NotFound(_) => "not_found",
            AugmentError::Decode(_) => "decode",
            AugmentError::Processing(_) => "processing",
        }
    }
}

impl From<OptionsError> for AugmentError {
    fn from(err: OptionsError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<DecodeError> for AugmentError {
    fn from(err: DecodeError) -> Self {
        Self::decode(err.to_string())
    }
}

impl From<EncodeError> for AugmentError {
    fn from(err: EncodeError) -> Self {
        Self::processing(err.to_string())
    }
}

impl From<PipelineError> for AugmentError {
    fn from(err: PipelineError) -> Self {
        Self::processing(err.to_string())
    }
}

impl From<ArchiveError> for AugmentError {
    fn from(err: ArchiveError) -> Self {
        Self::processing(err.to_string())
    }
}

impl From<ConfigError> for AugmentError {
    fn from(err: ConfigError) -> Self {
        Self::processing(err.to_string())
    }
}

impl From<StorageError> for AugmentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => Self::not_found(err.to_string()),
            StorageError::Io { .. } => Self::processing(err.to_string()),
            StorageError::EmptyFilename
            | StorageError::DisallowedExtension(_)
            | StorageError::TooLarge { .. }
            | StorageError::InvalidName(_) => Self::validation(err.to_string()),
        }
    }
}

impl From<VideoError> for AugmentError {
    fn from(err: VideoError) -> Self {
        match err {
            VideoError::Open { .. } | VideoError::Probe(_) => Self::decode(err.to_string()),
            VideoError::InvalidStep { .. } => Self::validation(err.to_string()),
            VideoError::Frame { .. } | VideoError::Encode(_) => Self::processing(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformError;

    #[test]
    fn test_status_codes() {
        assert_eq!(AugmentError::validation("x").status_code(), 400);
        assert_eq!(AugmentError::decode("x").status_code(), 400);
        assert_eq!(AugmentError::not_found("x").status_code(), 404);
        assert_eq!(AugmentError::processing("x").status_code(), 500);
    }

    #[test]
    fn test_display_prefixes_are_stable() {
        assert!(AugmentError::validation("x")
            .to_string()
            .starts_with("validation error:"));
        assert!(AugmentError::processing("boom")
            .to_string()
            .contains("boom"));
    }

    #[test]
    fn test_storage_error_mapping() {
        assert_eq!(
            AugmentError::from(StorageError::DisallowedExtension("a.txt".into())).status_code(),
            400
        );
        assert_eq!(
            AugmentError::from(StorageError::NotFound("a.png".into())).status_code(),
            404
        );
        assert_eq!(
            AugmentError::from(StorageError::Io {
                path: "p".into(),
                message: "denied".into()
            })
            .kind(),
            "processing"
        );
    }

    #[test]
    fn test_options_and_decode_mapping() {
        let err = OptionsError::InvalidValue {
            operation: "flip",
            index: 0,
            source: TransformError::InvalidFlipCode(3.0),
        };
        assert_eq!(AugmentError::from(err).kind(), "validation");
        assert_eq!(AugmentError::from(DecodeError::InvalidFormat).kind(), "decode");
    }

    #[test]
    fn test_video_error_mapping() {
        let open = VideoError::Open {
            path: "v.mp4".into(),
            message: "no such file".into(),
        };
        assert_eq!(AugmentError::from(open).status_code(), 400);

        let step = VideoError::InvalidStep {
            interval: 0.01,
            fps: 10.0,
        };
        assert_eq!(AugmentError::from(step).kind(), "validation");
    }
}
