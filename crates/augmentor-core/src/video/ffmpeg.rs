//! `ffprobe`/`ffmpeg` backed [`VideoSource`].

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use super::{VideoError, VideoInfo, VideoSource};
use crate::decode::DecodedImage;

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Parse the JSON printed by `ffprobe -print_format json -show_streams -show_format`.
pub fn parse_probe_output(json: &[u8]) -> Result<VideoInfo, VideoError> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| VideoError::Probe(format!("ffprobe json parse failed: {e}")))?;

    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| VideoError::Probe("no video stream found".to_string()))?;

    let width = stream
        .width
        .ok_or_else(|| VideoError::Probe("missing video width".to_string()))?;
    let height = stream
        .height
        .ok_or_else(|| VideoError::Probe("missing video height".to_string()))?;

    let fps = [stream.r_frame_rate.as_deref(), stream.avg_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(parse_ff_ratio)
        .find(|fps| *fps > 0.0)
        .ok_or_else(|| VideoError::Probe("invalid frame rate".to_string()))?;

    let frame_count = match stream.nb_frames.as_deref().and_then(|n| n.parse::<u64>().ok()) {
        Some(n) if n > 0 => n,
        _ => {
            let duration = stream
                .duration
                .as_deref()
                .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
                .and_then(|d| d.parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d >= 0.0)
                .ok_or_else(|| VideoError::Probe("unknown frame count and duration".to_string()))?;
            (duration * fps).round() as u64
        }
    };

    Ok(VideoInfo {
        width,
        height,
        fps,
        frame_count,
    })
}

fn parse_ff_ratio(s: &str) -> Option<f64> {
    let mut parts = s.split('/');
    let num = parts.next()?.trim().parse::<f64>().ok()?;
    let den = match parts.next() {
        Some(d) => d.trim().parse::<f64>().ok()?,
        None => 1.0,
    };
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// A video file decoded through external `ffprobe` and `ffmpeg` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegVideo {
    path: PathBuf,
    ffmpeg: String,
    info: VideoInfo,
}

impl FfmpegVideo {
    /// Probe `path` and prepare it for frame-by-frame decoding.
    pub fn open(path: &Path, ffprobe: &str, ffmpeg: &str) -> Result<Self, VideoError> {
        let open_err = |message: String| VideoError::Open {
            path: path.display().to_string(),
            message,
        };

        let out = Command::new(ffprobe)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| open_err(format!("failed to run {ffprobe}: {e}")))?;
        if !out.status.success() {
            return Err(open_err(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ));
        }

        let info = parse_probe_output(&out.stdout)?;
        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frames = info.frame_count,
            "probed video"
        );

        Ok(Self {
            path: path.to_path_buf(),
            ffmpeg: ffmpeg.to_string(),
            info,
        })
    }
}

impl VideoSource for FfmpegVideo {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn frame(&mut self, index: u64) -> Result<DecodedImage, VideoError> {
        let seconds = index as f64 / self.info.fps;
        let frame_err = |message: String| VideoError::Frame { index, message };

        let out = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-ss", &format!("{seconds:.9}")])
            .arg("-i")
            .arg(&self.path)
            .args([
                "-frames:v",
                "1",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "pipe:1",
            ])
            .output()
            .map_err(|e| frame_err(format!("failed to run {}: {e}", self.ffmpeg)))?;

        if !out.status.success() {
            return Err(frame_err(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ));
        }

        let expected = self.info.width as usize * self.info.height as usize * 3;
        if expected == 0 || out.stdout.len() < expected {
            return Err(frame_err(format!(
                "got {} bytes, expected {expected}",
                out.stdout.len()
            )));
        }

        let mut pixels = out.stdout;
        pixels.truncate(expected);
        Ok(DecodedImage::new(self.info.width, self.info.height, pixels))
    }
}
