//! Terminal rendering of submission states.

use tokio::sync::watch;
use tracing::info;
use xray_models::SubmissionState;

/// One-line status for progress output.
pub fn status_line(state: &SubmissionState) -> String {
    match state {
        SubmissionState::Idle => "Waiting for an X-ray image".to_string(),
        SubmissionState::ImageSelected => "X-ray loaded, ready to analyze".to_string(),
        SubmissionState::Submitting => "Analyzing X-ray...".to_string(),
        SubmissionState::ResultReady { result } => {
            format!("{} ({}%)", result.label, result.confidence_percent())
        }
        SubmissionState::Failed { reason } => reason.clone(),
    }
}

/// Final text printed to stdout once the submission settles.
pub fn final_report(state: &SubmissionState) -> String {
    match state {
        SubmissionState::ResultReady { result } => {
            let verdict = if result.is_pneumonia() {
                "Signs of pneumonia detected"
            } else {
                "No signs of pneumonia detected"
            };
            format!(
                "{}\nRaw probability: {:.4}\n{}",
                result.summary(),
                result.probability,
                verdict
            )
        }
        SubmissionState::Failed { reason } => reason.clone(),
        other => status_line(other),
    }
}

/// Log every published state until the controller goes away.
pub async fn follow(mut states: watch::Receiver<SubmissionState>) {
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        info!(state = %state, "{}", status_line(&state));
    }
}
