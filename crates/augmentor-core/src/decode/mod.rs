//! Source image decoding.
//!
//! Uploaded images are decoded once per request into an RGB [`DecodedImage`]
//! that every transform reads. Video frames land in the same type, so the
//! encoder and the transforms never care where a raster came from.
//!
//! # Examples
//!
//! ```ignore
//! use augmentor_core::decode::decode_file;
//!
//! let image = decode_file(Path::new("uploads/photo.png"))?;
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod source;
mod types;

pub use source::{decode_file, decode_image};
pub use types::{DecodeError, DecodedImage};

pub(crate) use types::Orientation;
