//! Output directory resolution and name checks.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::StorageError;

/// Accept `name` only if it names a single entry inside a directory.
///
/// Empty names, `.`/`..` and anything containing a path separator or NUL
/// are rejected.
pub fn validate_bare_name(name: &str) -> Result<&str, StorageError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StorageError::EmptyFilename);
    }
    if trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\', '\0'])
        || Path::new(trimmed).is_absolute()
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// Path of an existing regular file `name` inside `root`.
pub fn existing_file(root: &Path, name: &str) -> Result<PathBuf, StorageError> {
    let name = validate_bare_name(name)?;
    let path = root.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(StorageError::NotFound(name.to_string()))
    }
}

/// Pick and create the directory artifacts are written to.
///
/// A custom base is used only when it already exists as a directory;
/// otherwise the folder goes under `processed_root`.
pub fn resolve_output_dir(
    processed_root: &Path,
    folder: &str,
    custom_base: Option<&Path>,
) -> Result<PathBuf, StorageError> {
    let folder = validate_bare_name(folder)?;

    let base = match custom_base {
        Some(base) if base.is_dir() => base,
        Some(base) => {
            debug!(base = %base.display(), "custom output path missing, using processed root");
            processed_root
        }
        None => processed_root,
    };

    let dir = base.join(folder);
    fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bare_name() {
        assert_eq!(validate_bare_name("abc_photo.png").unwrap(), "abc_photo.png");
        assert_eq!(validate_bare_name("  frames ").unwrap(), "frames");
        assert_eq!(validate_bare_name(""), Err(StorageError::EmptyFilename));
        assert_eq!(validate_bare_name("   "), Err(StorageError::EmptyFilename));
        for bad in ["..", ".", "../etc/passwd", "a/b", "a\\b", "/abs"] {
            assert!(
                matches!(validate_bare_name(bad), Err(StorageError::InvalidName(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_resolve_under_processed_root() {
        let root = tempfile::tempdir().unwrap();
        let dir = resolve_output_dir(root.path(), "processed_images", None).unwrap();

        assert_eq!(dir, root.path().join("processed_images"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_resolve_under_existing_custom_base() {
        let root = tempfile::tempdir().unwrap();
        let custom = tempfile::tempdir().unwrap();

        let dir = resolve_output_dir(root.path(), "out", Some(custom.path())).unwrap();

        assert_eq!(dir, custom.path().join("out"));
        assert!(dir.is_dir());
        assert!(!root.path().join("out").exists());
    }

    #[test]
    fn test_missing_custom_base_falls_back() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("no").join("such").join("place");

        let dir = resolve_output_dir(root.path(), "out", Some(&missing)).unwrap();

        assert_eq!(dir, root.path().join("out"));
        assert!(!missing.exists());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        resolve_output_dir(root.path(), "again", None).unwrap();
        assert!(resolve_output_dir(root.path(), "again", None).is_ok());
    }

    #[test]
    fn test_resolve_rejects_path_like_folder() {
        let root = tempfile::tempdir().unwrap();
        assert!(resolve_output_dir(root.path(), "../escape", None).is_err());
        assert!(!root.path().parent().unwrap().join("escape").exists());
    }

    #[test]
    fn test_existing_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.zip"), b"x").unwrap();
        std::fs::create_dir(root.path().join("folder")).unwrap();

        assert_eq!(
            existing_file(root.path(), "a.zip").unwrap(),
            root.path().join("a.zip")
        );
        assert_eq!(
            existing_file(root.path(), "b.zip"),
            Err(StorageError::NotFound("b.zip".to_string()))
        );
        assert!(matches!(
            existing_file(root.path(), "folder"),
            Err(StorageError::NotFound(_))
        ));
    }
}
