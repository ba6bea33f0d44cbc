//! Frame extraction from uploaded videos.
//!
//! Frames are pulled one at a time through the [`VideoSource`] trait, so the
//! extraction walk does not depend on how a frame is decoded. The production
//! source shells out to `ffprobe`/`ffmpeg`; tests use in-memory sources.

mod extract;
mod ffmpeg;

use thiserror::Error;

use crate::decode::DecodedImage;
use crate::encode::EncodeError;

pub use extract::{extract_frames, frame_name, frame_range, frame_step};
pub use ffmpeg::{parse_probe_output, FfmpegVideo};

/// Errors from opening, probing or walking a video.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("cannot open video {path}: {message}")]
    Open { path: String, message: String },

    #[error("cannot read video metadata: {0}")]
    Probe(String),

    #[error("failed to decode frame {index}: {message}")]
    Frame { index: u64, message: String },

    #[error("interval {interval}s is shorter than one frame at {fps} fps")]
    InvalidStep { interval: f64, fps: f64 },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Stream properties needed to map seconds to frame indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
}

impl VideoInfo {
    /// Frame index nearest to `seconds`.
    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds * self.fps).round().max(0.0) as u64
    }

    pub fn duration(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame_count as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// A seekable video that yields decoded RGB frames by index.
pub trait VideoSource {
    fn info(&self) -> VideoInfo;

    /// Decode exactly the frame at `index`, seeking from the source each time.
    fn frame(&mut self, index: u64) -> Result<DecodedImage, VideoError>;
}
