//! Augmentor Core - batch image and video augmentation
//!
//! This crate turns one uploaded image into a fan-out of augmented copies
//! (zoom, rotation, flip, de-texturize, blur augmentation), extracts frames
//! from videos at fixed intervals, and packages the results as a zip.

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod storage;
pub mod transform;
pub mod video;

pub use config::{AugmentConfig, ConfigError, StorageConfig};
pub use decode::{decode_file, decode_image, DecodeError, DecodedImage};
pub use encode::{write_jpeg, EncodeError};
pub use error::{AugmentError, AugmentResult};
pub use options::{OperationSetting, TransformOptions, TransformPlan, VideoOptions, VideoPlan};
pub use pipeline::{process, OutputBundle, PipelineError};
pub use transform::{FlipCode, KernelSize, Operation, OperationKind, TransformError};
pub use video::{extract_frames, FfmpegVideo, VideoError, VideoInfo, VideoSource};
