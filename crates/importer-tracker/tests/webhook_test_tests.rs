//! Webhook test button timing and payloads, under paused time.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use common::{advance, coordinator, messages, webhook};
use importer_client::{MockFailure, MockImportApi, MockOp};
use importer_core::{EventType, WebhookTestResult};
use importer_tracker::{ImportCoordinator, Severity, TestButton, TrackerError, View};

async fn loaded(api: &Arc<MockImportApi>) -> ImportCoordinator {
    let tracker = coordinator(api);
    tracker.switch_view(View::Webhooks).await;
    tracker
}

fn button(tracker: &ImportCoordinator, id: i64) -> TestButton {
    tracker.snapshot().test_button(id)
}

#[tokio::test(start_paused = true)]
async fn test_product_created_payload() {
    let api = Arc::new(MockImportApi::new().with_webhooks(vec![webhook(1, &["product.created"])]));
    let tracker = loaded(&api).await;

    tracker.test_webhook(1).await.unwrap();

    let requests = api.webhook_test_requests();
    assert_eq!(requests.len(), 1);
    let (id, request) = &requests[0];
    assert_eq!(*id, 1);
    assert_eq!(request.event_type, EventType::ProductCreated);

    let data = &request.test_data;
    assert_eq!(data["id"], 123);
    assert_eq!(data["sku"], "TEST-SKU-CREATED");
    assert_eq!(data["name"], "Test Product Created");
    let stamp = data["timestamp"].as_str().unwrap();
    assert!(stamp.ends_with('Z'));
    assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_first_event_type_is_used() {
    let api = Arc::new(
        MockImportApi::new().with_webhooks(vec![webhook(4, &["import.completed", "product.created"])]),
    );
    let tracker = loaded(&api).await;

    tracker.test_webhook(4).await.unwrap();

    let (_, request) = &api.webhook_test_requests()[0];
    assert_eq!(request.event_type, EventType::ImportCompleted);
    assert_eq!(request.test_data["import_job_id"], 999);
    assert_eq!(request.test_data["failed_imports"], 5);
}

#[tokio::test(start_paused = true)]
async fn test_success_shows_result_then_reloads_and_restores() {
    let api = Arc::new(MockImportApi::new().with_webhooks(vec![webhook(1, &["product.updated"])]));
    let tracker = loaded(&api).await;
    assert_eq!(api.call_count(MockOp::ListWebhooks), 1);

    let result = tracker.test_webhook(1).await.unwrap();
    assert!(result.success);
    assert_eq!(button(&tracker, 1), TestButton::Succeeded);
    assert_eq!(
        messages(&tracker.notifier().history(), Severity::Success),
        vec!["✅ Webhook test successful! Response: 200 (42ms)".to_string()]
    );

    advance(999).await;
    assert_eq!(api.call_count(MockOp::ListWebhooks), 1);
    advance(2).await;
    assert_eq!(api.call_count(MockOp::ListWebhooks), 2);
    // The reload picked up the recorded response.
    assert_eq!(tracker.webhook_rows()[0].last_response, "200");

    assert_eq!(button(&tracker, 1), TestButton::Succeeded);
    advance(1000).await;
    assert_eq!(button(&tracker, 1), TestButton::Idle);
    assert_eq!(tracker.pending_button_restores(), 0);

    advance(10_000).await;
    assert_eq!(api.call_count(MockOp::ListWebhooks), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_delivery_marks_button() {
    let api = Arc::new(
        MockImportApi::new()
            .with_webhooks(vec![webhook(2, &["product.deleted"])])
            .with_webhook_tests(vec![Ok(WebhookTestResult {
                success: false,
                response_code: Some(500),
                response_time_ms: Some(120),
                response_body: None,
                error_message: Some("Connection reset".into()),
            })]),
    );
    let tracker = loaded(&api).await;

    let result = tracker.test_webhook(2).await.unwrap();
    assert!(!result.success);
    assert_eq!(button(&tracker, 2), TestButton::Failed);
    assert_eq!(
        messages(&tracker.notifier().history(), Severity::Error),
        vec!["❌ Webhook test failed: Connection reset".to_string()]
    );

    advance(1001).await;
    assert_eq!(api.call_count(MockOp::ListWebhooks), 2);
    advance(1000).await;
    assert_eq!(button(&tracker, 2), TestButton::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_still_restores_button_once() {
    let api = Arc::new(
        MockImportApi::new()
            .with_webhooks(vec![webhook(3, &["import.failed"])])
            .with_failure(MockOp::TestWebhook, MockFailure::Connection),
    );
    let tracker = loaded(&api).await;

    let err = tracker.test_webhook(3).await.unwrap_err();
    assert!(err.client_error().is_some_and(|e| e.is_network_error()));
    assert_eq!(
        messages(&tracker.notifier().history(), Severity::Error),
        vec!["Failed to test webhook".to_string()]
    );
    assert_eq!(button(&tracker, 3), TestButton::Busy);
    assert_eq!(tracker.pending_button_restores(), 1);

    advance(1999).await;
    assert_eq!(button(&tracker, 3), TestButton::Busy);
    advance(2).await;
    assert_eq!(button(&tracker, 3), TestButton::Idle);
    assert_eq!(tracker.pending_button_restores(), 0);

    // No reload without a response.
    advance(10_000).await;
    assert_eq!(api.call_count(MockOp::ListWebhooks), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_test_call_still_restores_button() {
    let api = Arc::new(
        MockImportApi::new()
            .with_webhooks(vec![webhook(1, &["product.created"])])
            .with_latency(Duration::from_millis(500)),
    );
    let tracker = loaded(&api).await;

    let cut_short = tokio::time::timeout(Duration::from_millis(100), tracker.test_webhook(1)).await;
    assert!(cut_short.is_err());
    assert_eq!(button(&tracker, 1), TestButton::Busy);
    assert_eq!(tracker.pending_button_restores(), 1);

    advance(1899).await;
    assert_eq!(button(&tracker, 1), TestButton::Busy);
    advance(2).await;
    assert_eq!(button(&tracker, 1), TestButton::Idle);
    assert_eq!(tracker.pending_button_restores(), 0);

    // Nothing answered, so nothing is reloaded.
    advance(10_000).await;
    assert_eq!(api.call_count(MockOp::ListWebhooks), 1);
}

#[tokio::test(start_paused = true)]
async fn test_response_slower_than_restore_leaves_button_idle() {
    let api = Arc::new(
        MockImportApi::new()
            .with_webhooks(vec![webhook(2, &["product.updated"])])
            .with_latency(Duration::from_millis(2500)),
    );
    let tracker = loaded(&api).await;

    let result = tracker.test_webhook(2).await.unwrap();
    assert!(result.success);
    assert_eq!(button(&tracker, 2), TestButton::Idle);
    assert_eq!(tracker.pending_button_restores(), 0);

    advance(10_000).await;
    assert_eq!(button(&tracker, 2), TestButton::Idle);
    assert_eq!(api.call_count(MockOp::ListWebhooks), 2);
}

#[tokio::test(start_paused = true)]
async fn test_webhook_without_event_types_is_not_sent() {
    let api = Arc::new(MockImportApi::new().with_webhooks(vec![webhook(5, &[])]));
    let tracker = loaded(&api).await;

    let err = tracker.test_webhook(5).await.unwrap_err();
    assert!(matches!(err, TrackerError::WebhookUnavailable { id: 5 }));
    assert_eq!(api.call_count(MockOp::TestWebhook), 0);
    assert_eq!(
        messages(&tracker.notifier().history(), Severity::Error),
        vec!["Webhook not found or has no event types".to_string()]
    );

    // The button still goes back to idle.
    assert_eq!(button(&tracker, 5), TestButton::Busy);
    advance(2001).await;
    assert_eq!(button(&tracker, 5), TestButton::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_unloaded_webhook_is_not_sent() {
    let api = Arc::new(MockImportApi::new().with_webhooks(vec![webhook(6, &["product.created"])]));
    // The list was never loaded.
    let tracker = coordinator(&api);

    assert!(tracker.test_webhook(6).await.is_err());
    assert_eq!(api.call_count(MockOp::TestWebhook), 0);
    assert_eq!(api.call_count(MockOp::ListWebhooks), 0);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_tests_interleave() {
    let api = Arc::new(MockImportApi::new().with_webhooks(vec![webhook(1, &["product.created"])]));
    let tracker = loaded(&api).await;

    tracker.test_webhook(1).await.unwrap();
    advance(1500).await;
    tracker.test_webhook(1).await.unwrap();
    assert_eq!(tracker.pending_button_restores(), 2);

    // The first restore fires on its own schedule.
    advance(501).await;
    assert_eq!(button(&tracker, 1), TestButton::Idle);
    assert_eq!(tracker.pending_button_restores(), 1);

    advance(1500).await;
    assert_eq!(tracker.pending_button_restores(), 0);
    assert_eq!(api.call_count(MockOp::TestWebhook), 2);
}
