//! Runtime configuration.
//!
//! Every filesystem root and limit is carried in an [`AugmentConfig`] passed
//! to the collaborators that need it. A JSON file may set any subset of the
//! fields; missing ones keep their defaults.
//!
//! ```json
//! {
//!   "storage": { "upload_dir": "/srv/augmentor/uploads" },
//!   "max_upload_bytes": 33554432,
//!   "jpeg_quality": 90
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::DEFAULT_JPEG_QUALITY;

/// 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("cannot create directory {path}: {message}")]
    CreateDir { path: String, message: String },
}

/// Where uploads and outputs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            processed_dir: PathBuf::from("processed"),
        }
    }
}

impl StorageConfig {
    /// Both roots under one base directory.
    pub fn under(base: &Path) -> Self {
        Self {
            upload_dir: base.join("uploads"),
            processed_dir: base.join("processed"),
        }
    }

    /// Create both roots if they are missing.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.upload_dir, &self.processed_dir] {
            fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    pub storage: StorageConfig,
    pub max_upload_bytes: usize,
    pub jpeg_quality: u8,
    /// `ffmpeg` executable, looked up on `PATH` unless absolute.
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
        }
    }
}

impl AugmentConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AugmentConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be positive".to_string(),
            ));
        }
        if self.ffmpeg_bin.trim().is_empty() || self.ffprobe_bin.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "ffmpeg_bin and ffprobe_bin must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
