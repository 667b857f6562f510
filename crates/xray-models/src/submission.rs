//! Submission state machine observed by the UI.
//!
//! The UI never mutates state directly. It feeds [`SubmissionEvent`]s through
//! [`SubmissionState::apply`], which either yields the next state or rejects
//! the event and leaves the current state untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prediction::PredictionResult;

/// Where a single image submission currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    /// Nothing selected yet
    #[default]
    Idle,
    /// An image was decoded and is ready to submit
    ImageSelected,
    /// The upload is in flight
    Submitting,
    /// The service returned a classification
    ResultReady { result: PredictionResult },
    /// Selection or submission failed
    Failed { reason: String },
}

/// Inputs that drive [`SubmissionState`] transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    /// A picked image decoded successfully
    ImageSelected,
    /// A picked image could not be decoded
    ImageRejected(String),
    /// The user asked to analyze the selected image
    SubmitStarted,
    /// The service answered with a valid prediction
    Completed(PredictionResult),
    /// The submission failed or was cancelled
    SubmitFailed(String),
    /// The user dismissed the result or error
    Reset,
}

impl SubmissionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionEvent::ImageSelected => "image_selected",
            SubmissionEvent::ImageRejected(_) => "image_rejected",
            SubmissionEvent::SubmitStarted => "submit_started",
            SubmissionEvent::Completed(_) => "completed",
            SubmissionEvent::SubmitFailed(_) => "submit_failed",
            SubmissionEvent::Reset => "reset",
        }
    }
}

/// An event that is not legal in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply '{event}' while {state}")]
pub struct TransitionError {
    pub state: &'static str,
    pub event: &'static str,
}

/// The single action the UI offers for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    SelectImage,
    Analyze,
    AnalyzeAnother,
}

impl PrimaryAction {
    /// Button text for this action.
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::SelectImage => "Select X-Ray Image",
            PrimaryAction::Analyze => "Analyze This X-Ray",
            PrimaryAction::AnalyzeAnother => "Analyze Another Image",
        }
    }
}

impl SubmissionState {
    /// Get string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::ImageSelected => "image_selected",
            SubmissionState::Submitting => "submitting",
            SubmissionState::ResultReady { .. } => "result_ready",
            SubmissionState::Failed { .. } => "failed",
        }
    }

    /// Compute the state that follows `event`.
    pub fn apply(&self, event: SubmissionEvent) -> Result<SubmissionState, TransitionError> {
        use SubmissionEvent as E;
        use SubmissionState as S;

        match (self, event) {
            (S::Idle, E::ImageSelected) => Ok(S::ImageSelected),
            (S::Idle, E::ImageRejected(reason)) => Ok(S::Failed { reason }),
            (S::ImageSelected, E::SubmitStarted) => Ok(S::Submitting),
            (S::Submitting, E::Completed(result)) => Ok(S::ResultReady { result }),
            (S::Submitting, E::SubmitFailed(reason)) => Ok(S::Failed { reason }),
            (S::ResultReady { .. } | S::Failed { .. }, E::Reset) => Ok(S::Idle),
            (state, event) => Err(TransitionError {
                state: state.as_str(),
                event: event.as_str(),
            }),
        }
    }

    /// Whether a request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }

    /// Check if this is a terminal state for the current submission.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::ResultReady { .. } | SubmissionState::Failed { .. }
        )
    }

    /// The prediction, once one is available.
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            SubmissionState::ResultReady { result } => Some(result),
            _ => None,
        }
    }

    /// The failure reason, if the last attempt failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// The action the UI should offer. `None` while submitting.
    pub fn primary_action(&self) -> Option<PrimaryAction> {
        match self {
            SubmissionState::Idle => Some(PrimaryAction::SelectImage),
            SubmissionState::ImageSelected => Some(PrimaryAction::Analyze),
            SubmissionState::Submitting => None,
            SubmissionState::ResultReady { .. } | SubmissionState::Failed { .. } => {
                Some(PrimaryAction::AnalyzeAnother)
            }
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
