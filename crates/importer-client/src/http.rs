//! Import API over HTTP using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use importer_config::ServerConfig;
use importer_core::{
    ImportJob, ImportJobId, ImportTask, MessageResponse, Product, ProductDraft, ProductFilter,
    ProductId, ProductPage, TaskId, UploadReceipt, Webhook, WebhookDraft, WebhookId, WebhookLog,
    WebhookTestResult,
};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{ImportApi, JobQuery, UploadFile, WebhookTestRequest};
use crate::error::{ClientError, Result};

/// Content type sent with uploaded files.
const CSV_MIME: &str = "text/csv";

/// HTTP implementation of [`ImportApi`].
#[derive(Debug, Clone)]
pub struct HttpImportApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpImportApi {
    /// Create a client from the server section of the config.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Create a client for a base URL with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = Self::check_status(request.send().await?).await?;
        response.json().await.map_err(ClientError::from)
    }

    /// Send a request whose body is not needed.
    async fn execute_unit(&self, request: RequestBuilder) -> Result<()> {
        Self::check_status(request.send().await?).await?;
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "import API returned an error status");
        Err(ClientError::from_http_status(status.as_u16(), &body))
    }
}

#[async_trait]
impl ImportApi for HttpImportApi {
    async fn upload_csv(&self, file: UploadFile) -> Result<UploadReceipt> {
        debug!(filename = %file.filename, bytes = file.bytes.len(), "uploading CSV");
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(CSV_MIME)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.execute(self.client.post(self.url("/api/v1/import/upload")).multipart(form))
            .await
    }

    async fn import_progress(&self, task_id: &TaskId) -> Result<ImportTask> {
        let url = self.url(&format!("/api/v1/import/progress/{}", task_id));
        self.execute(self.client.get(url)).await
    }

    async fn list_import_jobs(&self, query: &JobQuery) -> Result<Vec<ImportJob>> {
        let request = self
            .client
            .get(self.url("/api/v1/import/jobs"))
            .query(&query.query_pairs());
        self.execute(request).await
    }

    async fn get_import_job(&self, id: ImportJobId) -> Result<ImportJob> {
        let url = self.url(&format!("/api/v1/import/jobs/{}", id));
        self.execute(self.client.get(url)).await
    }

    async fn list_products(
        &self,
        page: u32,
        size: u32,
        filter: &ProductFilter,
    ) -> Result<ProductPage> {
        let mut params = vec![("page", page.to_string()), ("size", size.to_string())];
        params.extend(filter.query_pairs());
        let request = self.client.get(self.url("/api/v1/products")).query(&params);
        self.execute(request).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        let url = self.url(&format!("/api/v1/products/{}", id));
        self.execute(self.client.get(url)).await
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        self.execute(self.client.post(self.url("/api/v1/products/")).json(draft))
            .await
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
        let url = self.url(&format!("/api/v1/products/{}", id));
        self.execute(self.client.put(url).json(draft)).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let url = self.url(&format!("/api/v1/products/{}", id));
        self.execute_unit(self.client.delete(url)).await
    }

    async fn delete_all_products(&self) -> Result<MessageResponse> {
        let request = self
            .client
            .delete(self.url("/api/v1/products/"))
            .query(&[("confirm", "true")]);
        self.execute(request).await
    }

    async fn list_webhooks(&self) -> Result<Vec<Webhook>> {
        self.execute(self.client.get(self.url("/api/v1/webhooks/")))
            .await
    }

    async fn get_webhook(&self, id: WebhookId) -> Result<Webhook> {
        let url = self.url(&format!("/api/v1/webhooks/{}", id));
        self.execute(self.client.get(url)).await
    }

    async fn create_webhook(&self, draft: &WebhookDraft) -> Result<Webhook> {
        self.execute(self.client.post(self.url("/api/v1/webhooks/")).json(draft))
            .await
    }

    async fn update_webhook(&self, id: WebhookId, draft: &WebhookDraft) -> Result<Webhook> {
        let url = self.url(&format!("/api/v1/webhooks/{}", id));
        self.execute(self.client.put(url).json(draft)).await
    }

    async fn delete_webhook(&self, id: WebhookId) -> Result<()> {
        let url = self.url(&format!("/api/v1/webhooks/{}", id));
        self.execute_unit(self.client.delete(url)).await
    }

    async fn test_webhook(
        &self,
        id: WebhookId,
        request: &WebhookTestRequest,
    ) -> Result<WebhookTestResult> {
        debug!(webhook_id = id, event_type = %request.event_type, "testing webhook");
        let url = self.url(&format!("/api/v1/webhooks/{}/test", id));
        self.execute(self.client.post(url).json(request)).await
    }

    async fn webhook_logs(&self, id: WebhookId, skip: u32, limit: u32) -> Result<Vec<WebhookLog>> {
        let url = self.url(&format!("/api/v1/webhooks/{}/logs", id));
        let request = self
            .client
            .get(url)
            .query(&[("skip", skip.to_string()), ("limit", limit.to_string())]);
        self.execute(request).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
