//! Request and response bodies of the service operations.
//!
//! Field names match the JSON the browser front end sends and reads.

use std::path::PathBuf;

use augmentor_core::{AugmentError, AugmentResult, TransformOptions, VideoOptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_FOLDER: &str = "processed_images";
pub const DEFAULT_VIDEO_FOLDER: &str = "video_frames";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub output_folder: Option<String>,
    #[serde(default)]
    pub custom_output_path: Option<String>,
    #[serde(default)]
    pub selected_options: TransformOptions,
}

impl ProcessRequest {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn folder(&self) -> &str {
        folder_or(&self.output_folder, DEFAULT_IMAGE_FOLDER)
    }

    pub fn custom_base(&self) -> Option<PathBuf> {
        custom_base(&self.custom_output_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub message: String,
    pub processed_count: usize,
    pub zip_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessVideoRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub output_folder: Option<String>,
    #[serde(default)]
    pub custom_output_path: Option<String>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub selected_options: VideoOptions,
}

impl ProcessVideoRequest {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn folder(&self) -> &str {
        folder_or(&self.output_folder, DEFAULT_VIDEO_FOLDER)
    }

    pub fn custom_base(&self) -> Option<PathBuf> {
        custom_base(&self.custom_output_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessVideoResponse {
    pub success: bool,
    pub message: String,
    pub processed_count: usize,
    pub zip_file: String,
    pub start_time: f64,
    /// Requested end, or the video duration when none was given.
    pub end_time: f64,
}

/// A processed file ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPathsResponse {
    pub current_path: String,
    pub default_paths: Vec<String>,
    pub system: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&AugmentError> for ErrorBody {
    fn from(err: &AugmentError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// A status code and JSON body, ready for any transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Turn a handler result into a [`Reply`].
pub fn reply<T: Serialize>(result: &AugmentResult<T>) -> Reply {
    let error_reply = |err: &AugmentError| Reply {
        status: err.status_code(),
        body: serde_json::json!({ "error": ErrorBody::from(err).error }),
    };

    match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(body) => Reply { status: 200, body },
            Err(e) => error_reply(&AugmentError::processing(e.to_string())),
        },
        Err(err) => error_reply(err),
    }
}

fn folder_or<'a>(folder: &'a Option<String>, default: &'a str) -> &'a str {
    match folder.as_deref().map(str::trim) {
        Some(f) if !f.is_empty() => f,
        _ => default,
    }
}

fn custom_base(path: &Option<String>) -> Option<PathBuf> {
    path.as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_request_from_page_json() {
        let req: ProcessRequest = serde_json::from_str(
            r#"{
                "filename": "abc_cat.png",
                "output_folder": "",
                "custom_output_path": null,
                "selected_options": {"zoom": {"enabled": true, "values": [1.5]}}
            }"#,
        )
        .unwrap();

        assert_eq!(req.filename, "abc_cat.png");
        assert_eq!(req.folder(), DEFAULT_IMAGE_FOLDER);
        assert_eq!(req.custom_base(), None);
        assert_eq!(
            req.selected_options.zoom.unwrap().values,
            Some(vec![1.5])
        );
    }

    #[test]
    fn test_minimal_requests() {
        let req: ProcessRequest = serde_json::from_str("{}").unwrap();
        assert!(req.filename.is_empty());

        let video: ProcessVideoRequest =
            serde_json::from_str(r#"{"filename": "v.mp4", "start_time": 3}"#).unwrap();
        assert_eq!(video.folder(), DEFAULT_VIDEO_FOLDER);
        assert_eq!(video.start_time, Some(3.0));
        assert_eq!(video.end_time, None);
    }

    #[test]
    fn test_custom_folder_and_base() {
        let mut req = ProcessRequest::new("x.png");
        req.output_folder = Some(" batch1 ".to_string());
        req.custom_output_path = Some("/data/out".to_string());

        assert_eq!(req.folder(), "batch1");
        assert_eq!(req.custom_base(), Some(PathBuf::from("/data/out")));
    }

    #[test]
    fn test_reply_success() {
        let ok: AugmentResult<UploadResponse> = Ok(UploadResponse {
            success: true,
            filename: "f.png".to_string(),
            message: "ok".to_string(),
        });
        let r = reply(&ok);

        assert_eq!(r.status, 200);
        assert!(r.is_success());
        assert_eq!(r.body["filename"], "f.png");
    }

    #[test]
    fn test_reply_error() {
        let err: AugmentResult<UploadResponse> = Err(AugmentError::not_found("missing.png"));
        let r = reply(&err);

        assert_eq!(r.status, 404);
        assert!(!r.is_success());
        assert!(r.body["error"].as_str().unwrap().contains("missing.png"));
    }
}
