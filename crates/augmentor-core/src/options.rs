//! Request options and the validated plans they resolve to.
//!
//! Clients send a loosely shaped options object: every operation key is
//! optional, and inside each one both `enabled` and `values` are optional.
//! [`TransformPlan::resolve`] fills in the defaults once and checks every
//! value, so the pipeline only ever sees typed, valid parameters.
//!
//! ```json
//! {
//!   "zoom":     { "enabled": true, "values": [1.2, 1.5] },
//!   "rotation": { "enabled": false },
//!   "blur":     { "values": [3] }
//! }
//! ```
//!
//! An explicit empty `values` list is respected and produces no artifacts
//! for that operation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::{
    check_zoom, kernel_for_sigma, FlipCode, KernelSize, Operation, OperationKind, TransformError,
    MAX_ZOOM_FACTOR,
};

pub const DEFAULT_ZOOM: [f64; 3] = [1.2, 1.5, 2.0];
pub const DEFAULT_ROTATION: [f64; 12] = [
    30.0, 60.0, 90.0, 120.0, 150.0, 180.0, 210.0, 240.0, 270.0, 300.0, 330.0, 360.0,
];
pub const DEFAULT_FLIP: [f64; 3] = [0.0, 1.0, -1.0];
pub const DEFAULT_BLUR: [f64; 3] = [5.0, 15.0, 25.0];
pub const DEFAULT_AUGMENTATION: [f64; 3] = [5.0, 10.0, 15.0];
pub const DEFAULT_INTERVALS: [f64; 1] = [0.5];

/// Errors found while resolving options into a plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("invalid {operation} value at index {index}: {source}")]
    InvalidValue {
        operation: &'static str,
        index: usize,
        #[source]
        source: TransformError,
    },

    #[error("video interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("{name} must be a non-negative number of seconds, got {value}")]
    InvalidTime { name: &'static str, value: f64 },
}

/// Wire form of one operation's setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
}

impl OperationSetting {
    pub fn enabled(values: Vec<f64>) -> Self {
        Self {
            enabled: Some(true),
            values: Some(values),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            values: None,
        }
    }
}

/// Resolve a possibly absent setting to the values to run.
fn effective_values<'a>(setting: Option<&'a OperationSetting>, defaults: &'a [f64]) -> &'a [f64] {
    match setting {
        Some(s) if s.enabled == Some(false) => &[],
        Some(s) => s.values.as_deref().unwrap_or(defaults),
        None => defaults,
    }
}

/// Wire form of the image options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<OperationSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<OperationSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip: Option<OperationSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<OperationSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub augmentation: Option<OperationSetting>,
}

impl TransformOptions {
    fn setting(&self, kind: OperationKind) -> Option<&OperationSetting> {
        match kind {
            OperationKind::Zoom => self.zoom.as_ref(),
            OperationKind::Rotation => self.rotation.as_ref(),
            OperationKind::Flip => self.flip.as_ref(),
            OperationKind::DeTexturize => self.blur.as_ref(),
            OperationKind::Augmentation => self.augmentation.as_ref(),
        }
    }
}

fn defaults_for(kind: OperationKind) -> &'static [f64] {
    match kind {
        OperationKind::Zoom => &DEFAULT_ZOOM,
        OperationKind::Rotation => &DEFAULT_ROTATION,
        OperationKind::Flip => &DEFAULT_FLIP,
        OperationKind::DeTexturize => &DEFAULT_BLUR,
        OperationKind::Augmentation => &DEFAULT_AUGMENTATION,
    }
}

/// Validated image plan. A disabled operation has an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformPlan {
    pub zoom: Vec<f64>,
    pub rotation: Vec<f64>,
    pub flip: Vec<FlipCode>,
    pub blur: Vec<KernelSize>,
    pub augmentation: Vec<f64>,
}

impl TransformPlan {
    /// Apply defaults and validate every value.
    pub fn resolve(options: &TransformOptions) -> Result<Self, OptionsError> {
        let values = |kind| effective_values(options.setting(kind), defaults_for(kind));

        Ok(Self {
            zoom: validate_each(OperationKind::Zoom, values(OperationKind::Zoom), |f| {
                if f.is_finite() && (1.0..=MAX_ZOOM_FACTOR).contains(&f) {
                    Ok(f)
                } else {
                    Err(TransformError::InvalidZoomFactor(f))
                }
            })?,
            rotation: validate_each(OperationKind::Rotation, values(OperationKind::Rotation), |a| {
                if a.is_finite() {
                    Ok(a)
                } else {
                    Err(TransformError::InvalidAngle(a))
                }
            })?,
            flip: validate_each(
                OperationKind::Flip,
                values(OperationKind::Flip),
                FlipCode::try_from,
            )?,
            blur: validate_each(
                OperationKind::DeTexturize,
                values(OperationKind::DeTexturize),
                KernelSize::try_from,
            )?,
            augmentation: validate_each(
                OperationKind::Augmentation,
                values(OperationKind::Augmentation),
                |s| kernel_for_sigma(s).map(|_| s),
            )?,
        })
    }

    /// Check the size-dependent limits against the decoded source.
    ///
    /// Zoom factors are bounded on their own by [`TransformPlan::resolve`];
    /// the scaled raster can only be bounded once the source size is known.
    pub fn check_source(&self, width: u32, height: u32) -> Result<(), OptionsError> {
        for (index, &factor) in self.zoom.iter().enumerate() {
            check_zoom(width, height, factor).map_err(|source| OptionsError::InvalidValue {
                operation: OperationKind::Zoom.key(),
                index,
                source,
            })?;
        }
        Ok(())
    }

    /// Operations grouped by kind, in pipeline order.
    pub fn groups(&self) -> Vec<(OperationKind, Vec<Operation>)> {
        vec![
            (
                OperationKind::Zoom,
                self.zoom.iter().copied().map(Operation::Zoom).collect(),
            ),
            (
                OperationKind::Rotation,
                self.rotation.iter().copied().map(Operation::Rotate).collect(),
            ),
            (
                OperationKind::Flip,
                self.flip.iter().copied().map(Operation::Flip).collect(),
            ),
            (
                OperationKind::DeTexturize,
                self.blur.iter().copied().map(Operation::DeTexturize).collect(),
            ),
            (
                OperationKind::Augmentation,
                self.augmentation.iter().copied().map(Operation::Augment).collect(),
            ),
        ]
    }

    /// Number of artifacts this plan writes.
    pub fn artifact_count(&self) -> usize {
        self.zoom.len() + self.rotation.len() + self.flip.len() + self.blur.len() + self.augmentation.len()
    }
}

impl Default for TransformPlan {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM.to_vec(),
            rotation: DEFAULT_ROTATION.to_vec(),
            flip: vec![FlipCode::Vertical, FlipCode::Horizontal, FlipCode::Both],
            blur: DEFAULT_BLUR
                .iter()
                .filter_map(|&k| KernelSize::try_from(k).ok())
                .collect(),
            augmentation: DEFAULT_AUGMENTATION.to_vec(),
        }
    }
}

fn validate_each<T>(
    kind: OperationKind,
    values: &[f64],
    check: impl Fn(f64) -> Result<T, TransformError>,
) -> Result<Vec<T>, OptionsError> {
    values
        .iter()
        .enumerate()
        .map(|(index, &v)| {
            check(v).map_err(|source| OptionsError::InvalidValue {
                operation: kind.key(),
                index,
                source,
            })
        })
        .collect()
}

/// Wire form of the video options, as sent by the frame-extraction page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervals: Option<Vec<f64>>,
}

/// Validated frame-extraction plan.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoPlan {
    pub start_time: f64,
    /// `None` runs to the end of the video.
    pub end_time: Option<f64>,
    pub intervals: Vec<f64>,
}

impl VideoPlan {
    pub fn resolve(
        start_time: Option<f64>,
        end_time: Option<f64>,
        options: &VideoOptions,
    ) -> Result<Self, OptionsError> {
        let start_time = check_time("start_time", start_time.unwrap_or(0.0))?;
        let end_time = end_time.map(|t| check_time("end_time", t)).transpose()?;

        let intervals = if options.interval_enabled == Some(false) {
            Vec::new()
        } else {
            options
                .intervals
                .clone()
                .unwrap_or_else(|| DEFAULT_INTERVALS.to_vec())
        };
        if let Some(&bad) = intervals.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(OptionsError::InvalidInterval(bad));
        }

        Ok(Self {
            start_time,
            end_time,
            intervals,
        })
    }
}

fn check_time(name: &'static str, value: f64) -> Result<f64, OptionsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(OptionsError::InvalidTime { name, value })
    }
}
