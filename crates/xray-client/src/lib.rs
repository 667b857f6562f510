//! Client for the remote pneumonia prediction service.
//!
//! This crate provides:
//! - Image acquisition (decode a picked file into a bitmap)
//! - A scoped temp-file guard for the JPEG re-encoding
//! - The HTTP client that uploads the image and interprets the answer
//! - A submission controller publishing state changes to the UI
//!
//! Each submission is independent; no state is shared across requests.

pub mod acquisition;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod temp_jpeg;

pub use acquisition::{decode_bytes, load_image, Bitmap, ImageSource};
pub use client::{parse_prediction, PredictionClient};
pub use config::PredictionClientConfig;
pub use controller::SubmissionController;
pub use error::{ClientResult, PredictionError};
pub use temp_jpeg::TempJpeg;
