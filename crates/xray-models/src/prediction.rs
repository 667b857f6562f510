//! Prediction result returned by the model-serving endpoint.

use serde::{Deserialize, Serialize};

/// Label the service uses for a positive classification.
pub const PNEUMONIA_LABEL: &str = "Pneumonia";

/// Label the service uses for a negative classification.
pub const NORMAL_LABEL: &str = "Normal";

/// Classification returned for a single submitted image.
///
/// Only ever built by parsing a successful server response, and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Classification label ("Pneumonia" or "Normal")
    #[serde(rename = "prediction")]
    pub label: String,
    /// Confidence in the label, in [0, 1]
    pub confidence: f64,
    /// Raw model score, in [0, 1]
    pub probability: f64,
}

/// Reason a decoded response body was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionValidationError {
    #[error("prediction label is empty")]
    EmptyLabel,

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl PredictionResult {
    /// Create a result, validating the numeric ranges.
    pub fn new(
        label: impl Into<String>,
        confidence: f64,
        probability: f64,
    ) -> Result<Self, PredictionValidationError> {
        let result = Self {
            label: label.into(),
            confidence,
            probability,
        };
        result.validate()?;
        Ok(result)
    }

    /// Check that the label is present and both scores are unit-interval values.
    pub fn validate(&self) -> Result<(), PredictionValidationError> {
        if self.label.trim().is_empty() {
            return Err(PredictionValidationError::EmptyLabel);
        }
        check_unit("confidence", self.confidence)?;
        check_unit("probability", self.probability)?;
        Ok(())
    }

    /// Whether the service classified the image as pneumonia.
    pub fn is_pneumonia(&self) -> bool {
        self.label.eq_ignore_ascii_case(PNEUMONIA_LABEL)
    }

    /// Confidence as a whole percentage, truncated.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).clamp(0.0, 100.0) as u8
    }

    /// Two-line summary shown to the user.
    pub fn summary(&self) -> String {
        format!(
            "Result: {}\nConfidence: {}%",
            self.label,
            self.confidence_percent()
        )
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), PredictionValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PredictionValidationError::OutOfRange { field, value })
    }
}
