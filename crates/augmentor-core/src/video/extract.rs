//! Interval-based frame extraction.

use std::path::Path;

use tracing::{debug, info, warn};

use super::{VideoError, VideoInfo, VideoSource};
use crate::encode::write_jpeg;
use crate::options::VideoPlan;
use crate::pipeline::OutputBundle;

/// Artifact name of an extracted frame, e.g. `frame_0003_interval_0.5.jpg`.
pub fn frame_name(counter: usize, interval: f64) -> String {
    format!("frame_{counter:04}_interval_{interval}.jpg")
}

/// Half-open frame range `[start, end)` covered by the plan.
pub fn frame_range(info: &VideoInfo, plan: &VideoPlan) -> (u64, u64) {
    let start = info.frame_at(plan.start_time);
    let end = plan
        .end_time
        .map_or(info.frame_count, |t| info.frame_at(t).min(info.frame_count));
    (start, end)
}

/// Frames between two samples for `interval` seconds.
///
/// Steps longer than the whole video are clamped to its frame count; they
/// sample the start frame only.
pub fn frame_step(info: &VideoInfo, interval: f64) -> Result<u64, VideoError> {
    let step = (interval * info.fps).round();
    if !step.is_finite() || step < 1.0 {
        return Err(VideoError::InvalidStep {
            interval,
            fps: info.fps,
        });
    }
    Ok((step as u64).min(info.frame_count.max(1)))
}

/// Walk the video once per interval and write every sampled frame.
///
/// One counter numbers the frames of all intervals, so names never collide.
/// A frame that fails to decode is logged and skipped; a frame that fails
/// to write aborts the run.
#[tracing::instrument(skip(source, plan), fields(intervals = plan.intervals.len()))]
pub fn extract_frames<S: VideoSource + ?Sized>(
    source: &mut S,
    plan: &VideoPlan,
    output_dir: &Path,
    quality: u8,
) -> Result<OutputBundle, VideoError> {
    let info = source.info();
    let (start, end) = frame_range(&info, plan);

    let steps = plan
        .intervals
        .iter()
        .map(|&interval| frame_step(&info, interval).map(|step| (interval, step)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut bundle = OutputBundle::new(output_dir);
    let mut counter = 0usize;

    for (interval, step) in steps {
        let mut index = start;
        while index < end {
            match source.frame(index) {
                Ok(frame) => {
                    let name = frame_name(counter, interval);
                    write_jpeg(&output_dir.join(&name), &frame, quality)?;
                    debug!(file = %name, frame = index, "wrote frame");
                    bundle.files.push(name);
                    counter += 1;
                }
                Err(e) => warn!(frame = index, error = %e, "skipping unreadable frame"),
            }
            match index.checked_add(step) {
                Some(next) => index = next,
                None => break,
            }
        }
    }

    info!(
        count = bundle.len(),
        start_frame = start,
        end_frame = end,
        "frame extraction finished"
    );
    Ok(bundle)
}
