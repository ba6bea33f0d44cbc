//! Artifact encoding.
//!
//! Every artifact, image or video frame, is written as a baseline JPEG. The
//! quality comes from configuration and defaults to 95.
//!
//! # Examples
//!
//! ```ignore
//! use augmentor_core::encode::write_jpeg;
//!
//! write_jpeg(&out_dir.join("zoomed_image_0.jpg"), &zoomed, 95)?;
//! ```

mod jpeg;

pub use jpeg::{encode_image, encode_jpeg, write_jpeg, EncodeError, DEFAULT_JPEG_QUALITY};
