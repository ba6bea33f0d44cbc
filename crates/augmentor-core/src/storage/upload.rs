//! Upload intake.
//!
//! An upload is accepted only if its name carries an allowed image or video
//! extension and its size is within the configured cap. Accepted files are
//! stored as `<uuid>_<sanitized name>` so two uploads never collide.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use super::StorageError;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv"];

/// What an accepted upload contains, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a filename by its last extension, case-insensitively.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Reduce a client-supplied name to a safe ASCII filename.
///
/// Whitespace and path separators become `_`, every character outside
/// `[A-Za-z0-9._-]` is dropped, and leading or trailing dots and
/// underscores are stripped. The result may be empty.
pub fn sanitize_filename(name: &str) -> String {
    let joined = name
        .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// A file accepted and written by [`UploadReceiver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Name the file is stored under; later requests refer to it by this.
    pub filename: String,
    pub path: PathBuf,
    pub kind: MediaKind,
    pub size: usize,
}

/// Validates and stores uploads in one directory.
#[derive(Debug, Clone)]
pub struct UploadReceiver {
    upload_dir: PathBuf,
    max_bytes: usize,
}

impl UploadReceiver {
    pub fn new(upload_dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_bytes,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Validate `original_name` and `bytes`, then store them.
    ///
    /// Nothing touches the filesystem unless every check passes.
    pub fn receive(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload, StorageError> {
        let original_name = original_name.trim();
        if original_name.is_empty() {
            return Err(StorageError::EmptyFilename);
        }

        let kind = MediaKind::from_filename(original_name)
            .ok_or_else(|| StorageError::DisallowedExtension(original_name.to_string()))?;

        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let filename = format!("{}_{}", Uuid::new_v4(), stored_name(original_name));
        fs::create_dir_all(&self.upload_dir).map_err(|e| StorageError::io(&self.upload_dir, e))?;
        let path = self.upload_dir.join(&filename);
        fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;

        info!(file = %filename, size = bytes.len(), ?kind, "stored upload");
        Ok(StoredUpload {
            filename,
            path,
            kind,
            size: bytes.len(),
        })
    }
}

/// Sanitized name that still ends in the original extension.
fn stored_name(original: &str) -> String {
    let sanitized = sanitize_filename(original);
    if MediaKind::from_filename(&sanitized).is_some() {
        return sanitized;
    }
    let ext = original
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    format!("upload.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_filename() {
        assert_eq!(MediaKind::from_filename("a.PNG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_filename("a.b.jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_filename("clip.mkv"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_filename("notes.txt"), None);
        assert_eq!(MediaKind::from_filename("png"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Photo.jpg"), "My_Photo.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\secret.png"), "secret.png");
        assert_eq!(sanitize_filename("résumé (1).png"), "rsum_1.png");
        assert_eq!(sanitize_filename("_.hidden.gif"), "hidden.gif");
        assert_eq!(sanitize_filename("///"), "");
    }

    #[test]
    fn test_stored_name_keeps_extension() {
        assert_eq!(stored_name("cat.png"), "cat.png");
        assert_eq!(stored_name("şğ.PNG"), "upload.png");
    }

    #[test]
    fn test_receive_stores_with_uuid_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(dir.path(), 1024);

        let stored = receiver.receive("holiday pic.png", b"bytes").unwrap();

        assert!(stored.filename.ends_with("_holiday_pic.png"));
        // 36 characters of hyphenated uuid, then the separator.
        assert_eq!(stored.filename.find('_'), Some(36));
        assert!(Uuid::parse_str(&stored.filename[..36]).is_ok());
        assert_eq!(stored.kind, MediaKind::Image);
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"bytes");
    }

    #[test]
    fn test_same_name_twice_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(dir.path(), 1024);

        let a = receiver.receive("x.jpg", b"a").unwrap();
        let b = receiver.receive("x.jpg", b"b").unwrap();

        assert_ne!(a.filename, b.filename);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_disallowed_extension_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(dir.path().join("uploads"), 1024);

        let result = receiver.receive("notes.txt", b"hello");

        assert_eq!(
            result,
            Err(StorageError::DisallowedExtension("notes.txt".to_string()))
        );
        assert!(!dir.path().join("uploads").exists());
    }

    #[test]
    fn test_empty_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(dir.path(), 1024);
        assert_eq!(receiver.receive("  ", b"x"), Err(StorageError::EmptyFilename));
    }

    #[test]
    fn test_oversized_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(dir.path(), 4);

        let result = receiver.receive("big.mp4", b"12345");

        assert_eq!(result, Err(StorageError::TooLarge { size: 5, limit: 4 }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_video_upload_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(dir.path(), 1024);

        let stored = receiver.receive("clip.MOV", b"data").unwrap();
        assert_eq!(stored.kind, MediaKind::Video);
        assert!(stored.filename.ends_with("_clip.MOV"));
    }
}
