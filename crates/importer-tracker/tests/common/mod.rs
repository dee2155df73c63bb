//! Fixtures shared by the tracker integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use importer_client::MockImportApi;
use importer_core::{EventType, ImportJob, ImportStatus, ImportTask, Product, TaskId, Webhook};
use importer_tracker::{ConfirmationProvider, ImportCoordinator, Notification, Severity, TrackerSettings};

pub fn settings() -> TrackerSettings {
    TrackerSettings::default()
}

pub fn coordinator(api: &Arc<MockImportApi>) -> ImportCoordinator {
    ImportCoordinator::new(api.clone(), settings())
}

pub fn coordinator_with(
    api: &Arc<MockImportApi>,
    settings: TrackerSettings,
    confirmer: Arc<dyn ConfirmationProvider>,
) -> ImportCoordinator {
    ImportCoordinator::new(api.clone(), settings).with_confirmation(confirmer)
}

pub fn task(id: &str, status: ImportStatus, pct: u32) -> ImportTask {
    ImportTask {
        task_id: TaskId::new(id),
        status,
        progress_percentage: pct,
        processed_records: u64::from(pct) * 2,
        total_records: 200,
        successful_records: u64::from(pct) * 2,
        failed_records: 0,
        error_message: None,
        estimated_time_remaining: (status == ImportStatus::Processing).then_some(30),
    }
}

pub fn failed_task(id: &str, message: Option<&str>) -> ImportTask {
    ImportTask {
        error_message: message.map(str::to_string),
        ..task(id, ImportStatus::Failed, 40)
    }
}

pub fn job(id: i64, status: ImportStatus) -> ImportJob {
    let started = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    ImportJob {
        id,
        task_id: TaskId::new(format!("task-{id}")),
        filename: format!("batch-{id}.csv"),
        total_records: 100,
        processed_records: 100,
        successful_records: 95,
        failed_records: 5,
        status,
        progress_percentage: 100,
        error_message: None,
        result_summary: None,
        started_at: Some(started),
        completed_at: status.is_terminal().then(|| started + chrono::Duration::seconds(45)),
        created_at: started,
    }
}

pub fn webhook(id: i64, events: &[&str]) -> Webhook {
    let now = Utc::now();
    Webhook {
        id,
        name: format!("hook-{id}"),
        url: format!("https://example.com/hooks/{id}"),
        event_types: events.iter().map(|e| EventType::from(*e)).collect(),
        is_active: true,
        secret_key: None,
        headers: None,
        retry_count: 3,
        timeout_seconds: 30,
        last_triggered_at: None,
        last_response_code: None,
        last_response_time_ms: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn product(id: i64, sku: &str) -> Product {
    let now = Utc::now();
    Product {
        id,
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        description: None,
        price: Some(9.99),
        category: None,
        brand: None,
        inventory_count: Some(1),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Advance paused time, letting every task that becomes ready run.
pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    settle().await;
}

/// Let spawned tasks run without moving the clock.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

pub fn messages(notifications: &[Notification], severity: Severity) -> Vec<String> {
    notifications
        .iter()
        .filter(|n| n.severity == severity)
        .map(|n| n.message.clone())
        .collect()
}
