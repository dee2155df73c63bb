//! Shared type definitions used across importer crates.
//!
//! These mirror the JSON shapes served by the import API so that the client
//! can deserialize responses directly into them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a product row.
pub type ProductId = i64;

/// Identifier of a webhook.
pub type WebhookId = i64;

/// Identifier of an import job row (not the task id).
pub type ImportJobId = i64;

/// Opaque identifier of a running import task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap a raw task identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Lifecycle status shared by live tasks and historical jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    /// Queued, not yet picked up by a worker
    #[default]
    Pending,
    /// Rows are being processed
    Processing,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl ImportStatus {
    /// Returns true for `completed` and `failed`; polling stops on these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true while the import is still pending or processing.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportStatus {
    type Err = crate::ImporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(crate::ImporterError::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Live progress of one import, as returned by the progress endpoint.
///
/// Each poll response replaces the previous value wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportTask {
    pub task_id: TaskId,
    pub status: ImportStatus,
    /// Server-computed percentage, shown as-is.
    pub progress_percentage: u32,
    pub processed_records: u64,
    pub total_records: u64,
    pub successful_records: u64,
    pub failed_records: u64,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Seconds, estimated by the server while processing.
    #[serde(default)]
    pub estimated_time_remaining: Option<i64>,
}

/// Historical import record listed in the jobs table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: ImportJobId,
    pub task_id: TaskId,
    pub filename: String,
    pub total_records: u64,
    pub processed_records: u64,
    pub successful_records: u64,
    pub failed_records: u64,
    pub status: ImportStatus,
    pub progress_percentage: u32,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result_summary: Option<serde_json::Value>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ImportJob {
    /// Percentage of successful records over total, 0 when the file was empty.
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        self.successful_records as f64 / self.total_records as f64 * 100.0
    }

    /// Whole seconds between start and completion, when both are known.
    pub fn duration_secs(&self) -> Option<u64> {
        let (started, completed) = (self.started_at?, self.completed_at?);
        Some((completed - started).num_seconds().max(0) as u64)
    }
}

/// Response of the upload endpoint.
///
/// The server returns the freshly created job; only the task id is needed to
/// start tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub task_id: TaskId,
    #[serde(default)]
    pub id: Option<ImportJobId>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub status: Option<ImportStatus>,
}

/// Event types a webhook can subscribe to.
///
/// Unknown names are preserved in [`EventType::Other`] so that webhooks
/// registered with newer event types still round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    ImportCompleted,
    Other(String),
}

impl EventType {
    /// The event types known to this client, in display order.
    pub const KNOWN: [EventType; 4] = [
        EventType::ProductCreated,
        EventType::ProductUpdated,
        EventType::ProductDeleted,
        EventType::ImportCompleted,
    ];

    /// Dotted wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ProductCreated => "product.created",
            Self::ProductUpdated => "product.updated",
            Self::ProductDeleted => "product.deleted",
            Self::ImportCompleted => "import.completed",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "product.created" => Self::ProductCreated,
            "product.updated" => Self::ProductUpdated,
            "product.deleted" => Self::ProductDeleted,
            "import.completed" => Self::ImportCompleted,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured webhook target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: WebhookId,
    pub name: String,
    pub url: String,
    /// Subscribed event types in server order.
    pub event_types: Vec<EventType>,
    pub is_active: bool,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    pub retry_count: u32,
    pub timeout_seconds: u32,
    #[serde(default)]
    pub last_triggered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_response_code: Option<u16>,
    #[serde(default)]
    pub last_response_time_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body used to create or update a webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookDraft {
    pub name: String,
    pub url: String,
    pub event_types: Vec<EventType>,
    pub timeout_seconds: u32,
    pub retry_count: u32,
    pub secret_key: Option<String>,
    pub is_active: bool,
}

impl WebhookDraft {
    /// Allowed retry counts.
    pub const RETRY_RANGE: std::ops::RangeInclusive<u32> = 0..=10;
    /// Allowed timeouts in seconds.
    pub const TIMEOUT_RANGE: std::ops::RangeInclusive<u32> = 1..=300;

    /// Draft with the form defaults: 30s timeout, 3 retries, active.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            event_types: Vec::new(),
            timeout_seconds: 30,
            retry_count: 3,
            secret_key: None,
            is_active: true,
        }
    }

    /// Add a subscribed event type.
    pub fn with_event(mut self, event: impl Into<EventType>) -> Self {
        self.event_types.push(event.into());
        self
    }

    /// Set the shared secret; blank strings clear it.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        let trimmed = secret.trim();
        self.secret_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Prefill a draft from an existing webhook for editing.
    pub fn from_webhook(webhook: &Webhook) -> Self {
        Self {
            name: webhook.name.clone(),
            url: webhook.url.clone(),
            event_types: webhook.event_types.clone(),
            timeout_seconds: webhook.timeout_seconds,
            retry_count: webhook.retry_count,
            secret_key: webhook.secret_key.clone(),
            is_active: webhook.is_active,
        }
    }
}

/// Outcome of a synthetic webhook delivery.
///
/// A `success: false` result is a normal outcome, not a transport error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookTestResult {
    pub success: bool,
    #[serde(default)]
    pub response_code: Option<u16>,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub response_body: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One recorded webhook delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookLog {
    pub id: i64,
    pub webhook_id: WebhookId,
    pub event_type: EventType,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub response_code: Option<u16>,
    #[serde(default)]
    pub response_body: Option<String>,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub retry_attempt: u32,
    #[serde(default)]
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub inventory_count: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body used to create or update a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub inventory_count: i64,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub is_active: bool,
}

impl ProductDraft {
    /// Draft for a new active product with no stock.
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            description: None,
            price: None,
            inventory_count: 0,
            category: None,
            brand: None,
            is_active: true,
        }
    }
}

/// Server-side filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

impl ProductFilter {
    /// Query pairs for the non-empty filters, trimmed.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let text = [
            ("sku", &self.sku),
            ("name", &self.name),
            ("category", &self.category),
            ("brand", &self.brand),
        ];
        for (key, value) in text {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        if let Some(active) = self.is_active {
            pairs.push(("is_active", active.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        pairs
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

/// Body of simple `{ "message": ... }` acknowledgements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    /// Present on bulk deletes.
    #[serde(default)]
    pub deleted_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_import_status_terminal() {
        assert!(ImportStatus::Completed.is_terminal());
        assert!(ImportStatus::Failed.is_terminal());
        assert!(!ImportStatus::Pending.is_terminal());
        assert!(ImportStatus::Processing.is_active());
        assert_eq!("failed".parse::<ImportStatus>().unwrap(), ImportStatus::Failed);
        assert!("cancelled".parse::<ImportStatus>().is_err());
    }

    #[test]
    fn test_import_task_deserializes_progress_shape() {
        let task: ImportTask = serde_json::from_value(serde_json::json!({
            "task_id": "abc-123",
            "status": "processing",
            "progress_percentage": 20,
            "processed_records": 40,
            "total_records": 200,
            "successful_records": 39,
            "failed_records": 1,
            "error_message": null,
            "estimated_time_remaining": 12
        }))
        .unwrap();

        assert_eq!(task.task_id.as_str(), "abc-123");
        assert_eq!(task.status, ImportStatus::Processing);
        assert_eq!(task.progress_percentage, 20);
        assert_eq!(task.estimated_time_remaining, Some(12));
    }

    #[test]
    fn test_event_type_wire_names() {
        let parsed: Vec<EventType> =
            serde_json::from_value(serde_json::json!(["product.created", "inventory.low"])).unwrap();
        assert_eq!(parsed[0], EventType::ProductCreated);
        assert_eq!(parsed[1], EventType::Other("inventory.low".to_string()));

        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json, serde_json::json!(["product.created", "inventory.low"]));
    }

    #[test]
    fn test_job_success_rate_and_duration() {
        let started = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let job = ImportJob {
            id: 1,
            task_id: TaskId::new("t-1"),
            filename: "products.csv".into(),
            total_records: 200,
            processed_records: 200,
            successful_records: 190,
            failed_records: 10,
            status: ImportStatus::Completed,
            progress_percentage: 100,
            error_message: None,
            result_summary: None,
            started_at: Some(started),
            completed_at: Some(started + chrono::Duration::seconds(125)),
            created_at: started,
        };

        assert!((job.success_rate() - 95.0).abs() < f64::EPSILON);
        assert_eq!(job.duration_secs(), Some(125));

        let empty = ImportJob {
            total_records: 0,
            successful_records: 0,
            completed_at: None,
            ..job
        };
        assert_eq!(empty.success_rate(), 0.0);
        assert_eq!(empty.duration_secs(), None);
    }

    #[test]
    fn test_product_filter_skips_blank_values() {
        let filter = ProductFilter {
            sku: Some("  ".into()),
            name: Some(" Lamp ".into()),
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("name", "Lamp".to_string()), ("is_active", "false".to_string())]
        );
    }

    #[test]
    fn test_webhook_draft_secret_blank_is_none() {
        let draft = WebhookDraft::new("crm", "https://example.com/hook").with_secret("   ");
        assert_eq!(draft.secret_key, None);
        assert_eq!(draft.timeout_seconds, 30);
        assert_eq!(draft.retry_count, 3);
    }
}
