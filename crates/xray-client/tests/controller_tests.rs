//! Submission controller integration tests.

mod common;

use std::time::Duration;

use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xray_client::{PredictionError, SubmissionController};
use xray_models::{PrimaryAction, SubmissionState};

use common::{client_for, leftover_files, pneumonia_body, xray_png};

async fn mock_predict(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Wait until the mock has seen `count` requests.
async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..200 {
        if server.received_requests().await.unwrap_or_default().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("mock server never received {} request(s)", count);
}

#[tokio::test]
async fn test_full_cycle_publishes_every_state() {
    let server = MockServer::start().await;
    mock_predict(&server, ResponseTemplate::new(200).set_body_json(pneumonia_body())).await;

    let temp = TempDir::new().unwrap();
    let controller = SubmissionController::new(client_for(&server, temp.path()));
    let mut states = controller.subscribe();
    assert_eq!(*states.borrow(), SubmissionState::Idle);
    assert_eq!(
        controller.state().primary_action(),
        Some(PrimaryAction::SelectImage)
    );

    assert_ok!(controller.select_image(xray_png()).await);
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), SubmissionState::ImageSelected);
    assert!(controller.has_image().await);

    let handle = assert_ok!(controller.submit().await);
    let result = assert_ok!(handle.await.unwrap());
    assert_eq!(result.label, "Pneumonia");

    // The final state is published before the handle resolves
    let state = states.borrow_and_update().clone();
    assert_eq!(state.result(), Some(&result));
    assert_eq!(state.primary_action(), Some(PrimaryAction::AnalyzeAnother));
    assert_eq!(leftover_files(temp.path()), 0);

    assert_ok!(controller.reset().await);
    assert_eq!(controller.state(), SubmissionState::Idle);
    assert!(!controller.has_image().await);
}

#[tokio::test]
async fn test_undecodable_image_fails_selection() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let controller = SubmissionController::new(client_for(&server, temp.path()));

    let err = assert_err!(controller.select_image(b"%PDF-1.4 not an xray".to_vec()).await);
    assert!(matches!(err, PredictionError::Decode(_)));

    let state = controller.state();
    assert!(state.failure().unwrap().starts_with("Error: Couldn't read image"));
    assert!(!controller.has_image().await);

    // Submitting without a selection is refused
    assert_err!(controller.submit().await);

    assert_ok!(controller.reset().await);
    assert_eq!(controller.state(), SubmissionState::Idle);
}

#[tokio::test]
async fn test_submit_requires_selected_image() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let controller = SubmissionController::new(client_for(&server, temp.path()));

    let err = assert_err!(controller.submit().await);
    assert_eq!(err.state, "idle");
    assert_eq!(controller.state(), SubmissionState::Idle);
}

#[tokio::test]
async fn test_server_failure_lands_in_failed_state() {
    let server = MockServer::start().await;
    mock_predict(&server, ResponseTemplate::new(500)).await;

    let temp = TempDir::new().unwrap();
    let controller = SubmissionController::new(client_for(&server, temp.path()));
    assert_ok!(controller.select_image(xray_png()).await);

    let handle = assert_ok!(controller.submit().await);
    let err = assert_err!(handle.await.unwrap());
    assert!(matches!(err, PredictionError::Server { status_code: 500, .. }));
    assert_eq!(
        controller.state().failure(),
        Some("Error: Server error: 500")
    );

    // The UI is interactive again
    assert_eq!(
        controller.state().primary_action(),
        Some(PrimaryAction::AnalyzeAnother)
    );
}

#[tokio::test]
async fn test_no_resubmission_while_in_flight() {
    let server = MockServer::start().await;
    mock_predict(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(pneumonia_body())
            .set_delay(Duration::from_millis(300)),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let controller = SubmissionController::new(client_for(&server, temp.path()));
    assert_ok!(controller.select_image(xray_png()).await);

    let handle = assert_ok!(controller.submit().await);
    assert!(controller.state().is_busy());
    assert_eq!(controller.state().primary_action(), None);

    let err = assert_err!(controller.submit().await);
    assert_eq!(err.state, "submitting");
    assert_err!(controller.select_image(xray_png()).await);
    assert_err!(controller.reset().await);

    assert_ok!(handle.await.unwrap());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_in_flight_submission() {
    let server = MockServer::start().await;
    mock_predict(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(pneumonia_body())
            .set_delay(Duration::from_secs(10)),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let controller = SubmissionController::new(client_for(&server, temp.path()));
    assert_ok!(controller.select_image(xray_png()).await);

    let handle = assert_ok!(controller.submit().await);
    wait_for_requests(&server, 1).await;
    assert_eq!(leftover_files(temp.path()), 1);

    assert!(controller.cancel().await);
    assert_eq!(
        controller.state().failure(),
        Some("Error: Submission cancelled")
    );

    let join = handle.await;
    assert!(join.unwrap_err().is_cancelled());
    assert_eq!(leftover_files(temp.path()), 0);

    // Nothing left to cancel
    assert!(!controller.cancel().await);
}
