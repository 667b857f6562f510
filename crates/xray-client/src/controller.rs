//! Submission controller driving the UI-facing state machine.
//!
//! The controller is the only writer of [`SubmissionState`]. Every change is
//! published on a `watch` channel; the UI subscribes and re-renders, and never
//! touches state directly. Predictions run on a spawned tokio task, so the
//! caller's context is free while the upload is in flight.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};
use xray_models::{PredictionResult, SubmissionEvent, SubmissionState, TransitionError};

use crate::acquisition::{load_image, Bitmap, ImageSource};
use crate::client::PredictionClient;
use crate::error::{ClientResult, PredictionError};

/// Owns the selected image and the state of its single submission.
pub struct SubmissionController {
    client: PredictionClient,
    state: watch::Sender<SubmissionState>,
    image: Mutex<Option<Bitmap>>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl SubmissionController {
    pub fn new(client: PredictionClient) -> Arc<Self> {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Arc::new(Self {
            client,
            state,
            image: Mutex::new(None),
            in_flight: Mutex::new(None),
        })
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// Apply `event` atomically; the state is left untouched when illegal.
    fn apply(&self, event: SubmissionEvent) -> Result<(), TransitionError> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| match state.apply(event) {
            Ok(next) => {
                debug!(from = %state, to = %next, "Submission state changed");
                *state = next;
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    /// Decode the picked image and make it the current selection.
    ///
    /// Only legal while idle. A decode failure moves the state to `Failed`
    /// and is also returned to the caller.
    pub async fn select_image(&self, source: impl Into<ImageSource>) -> ClientResult<()> {
        // Refuse early so a busy controller never decodes
        self.state().apply(SubmissionEvent::ImageSelected)?;

        match load_image(source).await {
            Ok(bitmap) => {
                let (width, height) = bitmap.dimensions();
                let mut image = self.image.lock().await;
                self.apply(SubmissionEvent::ImageSelected)?;
                *image = Some(bitmap);
                info!(width, height, "Image selected");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Selected image could not be decoded");
                if let Err(transition) = self.apply(SubmissionEvent::ImageRejected(e.user_message())) {
                    debug!(error = %transition, "State moved on during decode");
                }
                Err(e)
            }
        }
    }

    /// Start analyzing the selected image on a background task.
    ///
    /// Only legal from `ImageSelected`, so a second press while a request is
    /// in flight is refused. The returned handle resolves after the final
    /// state has been published.
    pub async fn submit(
        self: &Arc<Self>,
    ) -> Result<JoinHandle<ClientResult<PredictionResult>>, TransitionError> {
        let bitmap = self.image.lock().await.clone();
        let mut in_flight = self.in_flight.lock().await;
        self.apply(SubmissionEvent::SubmitStarted)?;

        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = match bitmap {
                Some(bitmap) => controller.client.predict(&bitmap).await,
                None => Err(PredictionError::decode("no image selected")),
            };
            controller.finish(&result).await;
            result
        });

        *in_flight = Some(handle.abort_handle());
        Ok(handle)
    }

    async fn finish(&self, result: &ClientResult<PredictionResult>) {
        let mut in_flight = self.in_flight.lock().await;
        let event = match result {
            Ok(prediction) => SubmissionEvent::Completed(prediction.clone()),
            Err(e) => SubmissionEvent::SubmitFailed(e.user_message()),
        };
        if let Err(e) = self.apply(event) {
            debug!(error = %e, "Submission already settled");
        }
        in_flight.take();
    }

    /// Abort an in-flight submission. Returns whether anything was cancelled.
    pub async fn cancel(&self) -> bool {
        let mut in_flight = self.in_flight.lock().await;
        let Some(handle) = in_flight.take() else {
            return false;
        };
        handle.abort();

        let cancelled = self
            .apply(SubmissionEvent::SubmitFailed(
                PredictionError::Cancelled.user_message(),
            ))
            .is_ok();
        if cancelled {
            info!("Submission cancelled");
        }
        cancelled
    }

    /// Dismiss a result or error and drop the selected image.
    pub async fn reset(&self) -> Result<(), TransitionError> {
        let mut image = self.image.lock().await;
        self.apply(SubmissionEvent::Reset)?;
        *image = None;
        Ok(())
    }

    /// Whether an image is currently held.
    pub async fn has_image(&self) -> bool {
        self.image.lock().await.is_some()
    }
}
