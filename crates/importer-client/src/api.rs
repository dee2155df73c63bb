//! The [`ImportApi`] trait and the request types it takes.
//!
//! ## Implementations
//!
//! - [`HttpImportApi`](crate::http::HttpImportApi) - the import service over HTTP (reqwest)
//! - [`MockImportApi`](crate::mock::MockImportApi) - scripted in-memory fake for tests

use async_trait::async_trait;
use importer_core::{
    EventType, ImportJob, ImportJobId, ImportStatus, ImportTask, MessageResponse, Product,
    ProductDraft, ProductFilter, ProductId, ProductPage, TaskId, UploadReceipt, Webhook,
    WebhookDraft, WebhookId, WebhookLog, WebhookTestResult,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A CSV file ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Paging and filtering for the import job listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub skip: u32,
    pub limit: u32,
    pub status: Option<ImportStatus>,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
            status: None,
        }
    }
}

impl JobQuery {
    /// Query pairs in the form the jobs endpoint expects.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("skip", self.skip.to_string()), ("limit", self.limit.to_string())];
        if let Some(status) = self.status {
            pairs.push(("status_filter", status.as_str().to_string()));
        }
        pairs
    }
}

/// Body of a synthetic webhook delivery request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookTestRequest {
    pub event_type: EventType,
    pub test_data: serde_json::Value,
}

/// Operations offered by the import service.
///
/// Every call either returns the decoded body or a [`ClientError`](crate::ClientError);
/// callers decide what a failure means for the user.
#[async_trait]
pub trait ImportApi: Send + Sync {
    /// Upload a CSV and start an import task.
    async fn upload_csv(&self, file: UploadFile) -> Result<UploadReceipt>;

    /// Fetch the live progress of an import task.
    async fn import_progress(&self, task_id: &TaskId) -> Result<ImportTask>;

    /// List historical import jobs, newest first.
    async fn list_import_jobs(&self, query: &JobQuery) -> Result<Vec<ImportJob>>;

    /// Fetch one import job by row id.
    async fn get_import_job(&self, id: ImportJobId) -> Result<ImportJob>;

    /// One page of products.
    async fn list_products(&self, page: u32, size: u32, filter: &ProductFilter)
    -> Result<ProductPage>;

    async fn get_product(&self, id: ProductId) -> Result<Product>;

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product>;

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product>;

    async fn delete_product(&self, id: ProductId) -> Result<()>;

    /// Delete every product. The server's confirmation message is returned.
    async fn delete_all_products(&self) -> Result<MessageResponse>;

    async fn list_webhooks(&self) -> Result<Vec<Webhook>>;

    async fn get_webhook(&self, id: WebhookId) -> Result<Webhook>;

    async fn create_webhook(&self, draft: &WebhookDraft) -> Result<Webhook>;

    async fn update_webhook(&self, id: WebhookId, draft: &WebhookDraft) -> Result<Webhook>;

    async fn delete_webhook(&self, id: WebhookId) -> Result<()>;

    /// Ask the server to deliver a synthetic event to the webhook.
    async fn test_webhook(
        &self,
        id: WebhookId,
        request: &WebhookTestRequest,
    ) -> Result<WebhookTestResult>;

    /// Recorded deliveries for a webhook.
    async fn webhook_logs(&self, id: WebhookId, skip: u32, limit: u32) -> Result<Vec<WebhookLog>>;

    /// Get the implementation name.
    fn name(&self) -> &str;
}
