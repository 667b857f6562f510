//! Shared data models for the chest X-ray prediction client.
//!
//! This crate provides Serde-serializable types for:
//! - Prediction results returned by the model-serving endpoint
//! - The submission state machine the UI observes
//! - Health and error bodies of the service

pub mod prediction;
pub mod submission;
pub mod wire;

// Re-export common types
pub use prediction::{PredictionResult, PredictionValidationError, NORMAL_LABEL, PNEUMONIA_LABEL};
pub use submission::{PrimaryAction, SubmissionEvent, SubmissionState, TransitionError};
pub use wire::{ErrorBody, HealthResponse};
