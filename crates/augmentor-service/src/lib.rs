//! Augmentor Service - request handlers for the augmentation backend
//!
//! This crate exposes the backend operations (upload, process, process_video,
//! download, get_output_paths) as typed, transport-agnostic handlers on
//! [`Service`]. Each returns `Result<Response, AugmentError>`; [`api::reply`]
//! turns that into a status code and JSON body for whatever transport sits in
//! front. The `augmentor` binary drives the same handlers from the shell.
//!
//! # Usage
//!
//! ```ignore
//! use augmentor_service::{api::ProcessRequest, Service};
//!
//! let service = Service::new(AugmentConfig::default())?;
//! let stored = service.upload("cat.png", &bytes)?;
//! let done = service.process(&ProcessRequest::new(stored.filename))?;
//! println!("{} artifacts in {}", done.processed_count, done.zip_file);
//! ```

pub mod api;
mod service;

pub use service::Service;
