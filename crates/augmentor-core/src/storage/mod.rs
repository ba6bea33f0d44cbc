//! Filesystem collaborators: upload intake, output paths and archives.

mod archive;
mod paths;
mod upload;

use thiserror::Error;

pub use archive::{archive_name, write_archive, ArchiveError};
pub use paths::{existing_file, resolve_output_dir, validate_bare_name};
pub use upload::{
    sanitize_filename, MediaKind, StoredUpload, UploadReceiver, IMAGE_EXTENSIONS,
    VIDEO_EXTENSIONS,
};

/// Errors from upload intake and path handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("filename is required")]
    EmptyFilename,

    #[error("file type not allowed: {0}")]
    DisallowedExtension(String),

    #[error("upload is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("{path}: {message}")]
    Io { path: String, message: String },
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        StorageError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
