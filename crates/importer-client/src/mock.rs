//! Scripted in-memory [`ImportApi`] for tests.
//!
//! Progress replies and webhook test outcomes are scripted as queues: each
//! call pops the front entry, and the last entry repeats once the queue is
//! down to one. Products and webhooks are kept as simple in-memory tables so
//! CRUD flows behave like the real service. Every call is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use importer_core::{
    ImportJob, ImportJobId, ImportTask, MessageResponse, Product, ProductDraft, ProductFilter,
    ProductId, ProductPage, TaskId, UploadReceipt, Webhook, WebhookDraft, WebhookId, WebhookLog,
    WebhookTestResult,
};

use crate::api::{ImportApi, JobQuery, UploadFile, WebhookTestRequest};
use crate::error::{ClientError, Result};

/// Failure a scripted call should produce.
#[derive(Debug, Clone, PartialEq)]
pub enum MockFailure {
    /// The server could not be reached.
    Connection,
    /// The request timed out.
    Timeout,
    /// The server answered with an error status.
    Status { status: u16, detail: Option<String> },
}

impl MockFailure {
    /// Error status with a `detail` message.
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            status,
            detail: Some(detail.into()),
        }
    }

    fn into_error(self) -> ClientError {
        match self {
            Self::Connection => ClientError::ConnectionFailed("mock connection refused".into()),
            Self::Timeout => ClientError::Timeout("mock timeout".into()),
            Self::Status { status, detail } => ClientError::Api { status, detail },
        }
    }
}

/// One scripted reply.
pub type Scripted<T> = std::result::Result<T, MockFailure>;

/// Operation kinds, used for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Upload,
    Progress,
    ListJobs,
    GetJob,
    ListProducts,
    GetProduct,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    DeleteAllProducts,
    ListWebhooks,
    GetWebhook,
    CreateWebhook,
    UpdateWebhook,
    DeleteWebhook,
    TestWebhook,
    WebhookLogs,
}

/// A recorded call and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Upload { filename: String, size: usize },
    Progress(TaskId),
    ListJobs(JobQuery),
    GetJob(ImportJobId),
    ListProducts { page: u32, size: u32, filter: ProductFilter },
    GetProduct(ProductId),
    CreateProduct(ProductDraft),
    UpdateProduct(ProductId, ProductDraft),
    DeleteProduct(ProductId),
    DeleteAllProducts,
    ListWebhooks,
    GetWebhook(WebhookId),
    CreateWebhook(WebhookDraft),
    UpdateWebhook(WebhookId, WebhookDraft),
    DeleteWebhook(WebhookId),
    TestWebhook { id: WebhookId, request: WebhookTestRequest },
    WebhookLogs { id: WebhookId, skip: u32, limit: u32 },
}

impl MockCall {
    /// The operation kind of this call.
    pub fn op(&self) -> MockOp {
        match self {
            Self::Upload { .. } => MockOp::Upload,
            Self::Progress(_) => MockOp::Progress,
            Self::ListJobs(_) => MockOp::ListJobs,
            Self::GetJob(_) => MockOp::GetJob,
            Self::ListProducts { .. } => MockOp::ListProducts,
            Self::GetProduct(_) => MockOp::GetProduct,
            Self::CreateProduct(_) => MockOp::CreateProduct,
            Self::UpdateProduct(..) => MockOp::UpdateProduct,
            Self::DeleteProduct(_) => MockOp::DeleteProduct,
            Self::DeleteAllProducts => MockOp::DeleteAllProducts,
            Self::ListWebhooks => MockOp::ListWebhooks,
            Self::GetWebhook(_) => MockOp::GetWebhook,
            Self::CreateWebhook(_) => MockOp::CreateWebhook,
            Self::UpdateWebhook(..) => MockOp::UpdateWebhook,
            Self::DeleteWebhook(_) => MockOp::DeleteWebhook,
            Self::TestWebhook { .. } => MockOp::TestWebhook,
            Self::WebhookLogs { .. } => MockOp::WebhookLogs,
        }
    }
}

/// Queue of replies where the last entry sticks.
#[derive(Debug)]
struct Script<T> {
    replies: VecDeque<Scripted<T>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: VecDeque::new(),
        }
    }
}

impl<T: Clone> Script<T> {
    fn next(&mut self) -> Option<Scripted<T>> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    failures: HashMap<MockOp, MockFailure>,
    uploads: Script<UploadReceipt>,
    uploads_seen: u32,
    progress: HashMap<TaskId, Script<ImportTask>>,
    progress_delay: HashMap<TaskId, Duration>,
    jobs: Vec<ImportJob>,
    products: Vec<Product>,
    webhooks: Vec<Webhook>,
    webhook_tests: Script<WebhookTestResult>,
    webhook_logs: Vec<WebhookLog>,
}

/// Scripted fake of the import service.
#[derive(Debug, Default)]
pub struct MockImportApi {
    state: Mutex<MockState>,
    latency: Duration,
}

impl MockImportApi {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Script the replies to successive uploads.
    ///
    /// Without a script each upload gets a fresh `task-N` id.
    pub fn with_upload_replies(self, replies: Vec<Scripted<UploadReceipt>>) -> Self {
        self.lock().uploads.replies = replies.into();
        self
    }

    /// Script the progress replies for a task.
    pub fn with_progress(self, task_id: impl Into<TaskId>, replies: Vec<Scripted<ImportTask>>) -> Self {
        self.set_progress(task_id, replies);
        self
    }

    /// Replace the progress script for a task while tests run.
    pub fn set_progress(&self, task_id: impl Into<TaskId>, replies: Vec<Scripted<ImportTask>>) {
        self.lock().progress.insert(
            task_id.into(),
            Script {
                replies: replies.into(),
            },
        );
    }

    /// Extra delay applied to progress replies for one task.
    pub fn with_progress_delay(self, task_id: impl Into<TaskId>, delay: Duration) -> Self {
        self.lock().progress_delay.insert(task_id.into(), delay);
        self
    }

    pub fn with_jobs(self, jobs: Vec<ImportJob>) -> Self {
        self.lock().jobs = jobs;
        self
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products = products;
        self
    }

    pub fn with_webhooks(self, webhooks: Vec<Webhook>) -> Self {
        self.lock().webhooks = webhooks;
        self
    }

    /// Script the outcomes of successive webhook tests.
    pub fn with_webhook_tests(self, replies: Vec<Scripted<WebhookTestResult>>) -> Self {
        self.lock().webhook_tests.replies = replies.into();
        self
    }

    pub fn with_webhook_logs(self, logs: Vec<WebhookLog>) -> Self {
        self.lock().webhook_logs = logs;
        self
    }

    /// Make every call of `op` fail until cleared.
    pub fn with_failure(self, op: MockOp, failure: MockFailure) -> Self {
        self.fail(op, failure);
        self
    }

    /// Make every call of `op` fail until cleared.
    pub fn fail(&self, op: MockOp, failure: MockFailure) {
        self.lock().failures.insert(op, failure);
    }

    /// Stop failing calls of `op`.
    pub fn clear_failure(&self, op: MockOp) {
        self.lock().failures.remove(&op);
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls of `op`.
    pub fn call_count(&self, op: MockOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    /// Number of progress fetches for one task.
    pub fn progress_calls(&self, task_id: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, MockCall::Progress(id) if id.as_str() == task_id))
            .count()
    }

    /// Webhook test requests in the order they were sent.
    pub fn webhook_test_requests(&self) -> Vec<(WebhookId, WebhookTestRequest)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::TestWebhook { id, request } => Some((*id, request.clone())),
                _ => None,
            })
            .collect()
    }

    /// Current product table.
    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    /// Current webhook table.
    pub fn webhooks(&self) -> Vec<Webhook> {
        self.lock().webhooks.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a call and return the injected failure for its op, if any.
    fn record(&self, call: MockCall) -> Result<()> {
        let mut state = self.lock();
        let op = call.op();
        state.calls.push(call);
        match state.failures.get(&op) {
            Some(failure) => Err(failure.clone().into_error()),
            None => Ok(()),
        }
    }

    async fn pause(&self, extra: Duration) {
        let total = self.latency + extra;
        if !total.is_zero() {
            tokio::time::sleep(total).await;
        }
    }
}

fn not_found(what: &str) -> ClientError {
    ClientError::Api {
        status: 404,
        detail: Some(format!("{} not found", what)),
    }
}

fn product_from_draft(id: ProductId, draft: &ProductDraft) -> Product {
    let now = Utc::now();
    Product {
        id,
        sku: draft.sku.clone(),
        name: draft.name.clone(),
        description: draft.description.clone(),
        price: draft.price,
        category: draft.category.clone(),
        brand: draft.brand.clone(),
        inventory_count: Some(draft.inventory_count),
        is_active: draft.is_active,
        created_at: now,
        updated_at: now,
    }
}

fn webhook_from_draft(id: WebhookId, draft: &WebhookDraft) -> Webhook {
    let now = Utc::now();
    Webhook {
        id,
        name: draft.name.clone(),
        url: draft.url.clone(),
        event_types: draft.event_types.clone(),
        is_active: draft.is_active,
        secret_key: draft.secret_key.clone(),
        headers: None,
        retry_count: draft.retry_count,
        timeout_seconds: draft.timeout_seconds,
        last_triggered_at: None,
        last_response_code: None,
        last_response_time_ms: None,
        created_at: now,
        updated_at: now,
    }
}

fn matches_filter(product: &Product, filter: &ProductFilter) -> bool {
    let contains = |field: &str, needle: &Option<String>| match needle.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => field.to_lowercase().contains(&n.to_lowercase()),
        _ => true,
    };
    contains(&product.sku, &filter.sku)
        && contains(&product.name, &filter.name)
        && filter.is_active.is_none_or(|active| product.is_active == active)
}

#[async_trait]
impl ImportApi for MockImportApi {
    async fn upload_csv(&self, file: UploadFile) -> Result<UploadReceipt> {
        self.record(MockCall::Upload {
            filename: file.filename.clone(),
            size: file.bytes.len(),
        })?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        state.uploads_seen += 1;
        match state.uploads.next() {
            Some(reply) => reply.map_err(MockFailure::into_error),
            None => Ok(UploadReceipt {
                task_id: TaskId::new(format!("task-{}", state.uploads_seen)),
                id: Some(i64::from(state.uploads_seen)),
                filename: Some(file.filename),
                status: None,
            }),
        }
    }

    async fn import_progress(&self, task_id: &TaskId) -> Result<ImportTask> {
        self.record(MockCall::Progress(task_id.clone()))?;
        let delay = self
            .lock()
            .progress_delay
            .get(task_id)
            .copied()
            .unwrap_or_default();
        self.pause(delay).await;

        let mut state = self.lock();
        match state.progress.get_mut(task_id).and_then(Script::next) {
            Some(reply) => reply.map_err(MockFailure::into_error),
            None => Err(not_found("Task")),
        }
    }

    async fn list_import_jobs(&self, query: &JobQuery) -> Result<Vec<ImportJob>> {
        self.record(MockCall::ListJobs(query.clone()))?;
        self.pause(Duration::ZERO).await;

        let state = self.lock();
        Ok(state
            .jobs
            .iter()
            .filter(|j| query.status.is_none_or(|s| j.status == s))
            .skip(query.skip as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_import_job(&self, id: ImportJobId) -> Result<ImportJob> {
        self.record(MockCall::GetJob(id))?;
        self.pause(Duration::ZERO).await;
        let state = self.lock();
        state
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| not_found("Import job"))
    }

    async fn list_products(
        &self,
        page: u32,
        size: u32,
        filter: &ProductFilter,
    ) -> Result<ProductPage> {
        self.record(MockCall::ListProducts {
            page,
            size,
            filter: filter.clone(),
        })?;
        self.pause(Duration::ZERO).await;

        let state = self.lock();
        let matching: Vec<&Product> = state
            .products
            .iter()
            .filter(|p| matches_filter(p, filter))
            .collect();
        let total = matching.len() as u64;
        let size = size.max(1);
        let pages = (total as u32).div_ceil(size);
        let items = matching
            .into_iter()
            .skip((page.saturating_sub(1) * size) as usize)
            .take(size as usize)
            .cloned()
            .collect();
        Ok(ProductPage {
            items,
            total,
            page,
            size,
            pages,
        })
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.record(MockCall::GetProduct(id))?;
        self.pause(Duration::ZERO).await;
        let state = self.lock();
        state
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found("Product"))
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        self.record(MockCall::CreateProduct(draft.clone()))?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        if state.products.iter().any(|p| p.sku.eq_ignore_ascii_case(&draft.sku)) {
            return Err(ClientError::Api {
                status: 400,
                detail: Some("Product with this SKU already exists".into()),
            });
        }
        let id = state.products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let product = product_from_draft(id, draft);
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
        self.record(MockCall::UpdateProduct(id, draft.clone()))?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Product"))?;
        let created_at = slot.created_at;
        *slot = Product {
            created_at,
            ..product_from_draft(id, draft)
        };
        Ok(slot.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.record(MockCall::DeleteProduct(id))?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(not_found("Product"));
        }
        Ok(())
    }

    async fn delete_all_products(&self) -> Result<MessageResponse> {
        self.record(MockCall::DeleteAllProducts)?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        let deleted = state.products.len() as u64;
        state.products.clear();
        let message = if deleted == 0 {
            "No products to delete".to_string()
        } else {
            format!("Successfully deleted {} products", deleted)
        };
        Ok(MessageResponse {
            message,
            deleted_count: Some(deleted),
        })
    }

    async fn list_webhooks(&self) -> Result<Vec<Webhook>> {
        self.record(MockCall::ListWebhooks)?;
        self.pause(Duration::ZERO).await;
        Ok(self.lock().webhooks.clone())
    }

    async fn get_webhook(&self, id: WebhookId) -> Result<Webhook> {
        self.record(MockCall::GetWebhook(id))?;
        self.pause(Duration::ZERO).await;
        let state = self.lock();
        state
            .webhooks
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| not_found("Webhook"))
    }

    async fn create_webhook(&self, draft: &WebhookDraft) -> Result<Webhook> {
        self.record(MockCall::CreateWebhook(draft.clone()))?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        let id = state.webhooks.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        let webhook = webhook_from_draft(id, draft);
        state.webhooks.push(webhook.clone());
        Ok(webhook)
    }

    async fn update_webhook(&self, id: WebhookId, draft: &WebhookDraft) -> Result<Webhook> {
        self.record(MockCall::UpdateWebhook(id, draft.clone()))?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        let slot = state
            .webhooks
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| not_found("Webhook"))?;
        let created_at = slot.created_at;
        *slot = Webhook {
            created_at,
            ..webhook_from_draft(id, draft)
        };
        Ok(slot.clone())
    }

    async fn delete_webhook(&self, id: WebhookId) -> Result<()> {
        self.record(MockCall::DeleteWebhook(id))?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        let before = state.webhooks.len();
        state.webhooks.retain(|w| w.id != id);
        if state.webhooks.len() == before {
            return Err(not_found("Webhook"));
        }
        Ok(())
    }

    async fn test_webhook(
        &self,
        id: WebhookId,
        request: &WebhookTestRequest,
    ) -> Result<WebhookTestResult> {
        self.record(MockCall::TestWebhook {
            id,
            request: request.clone(),
        })?;
        self.pause(Duration::ZERO).await;

        let mut state = self.lock();
        let result = match state.webhook_tests.next() {
            Some(reply) => reply.map_err(MockFailure::into_error)?,
            None => WebhookTestResult {
                success: true,
                response_code: Some(200),
                response_time_ms: Some(42),
                response_body: Some("ok".into()),
                error_message: None,
            },
        };
        if let Some(webhook) = state.webhooks.iter_mut().find(|w| w.id == id) {
            webhook.last_triggered_at = Some(Utc::now());
            webhook.last_response_code = result.response_code;
            webhook.last_response_time_ms = result.response_time_ms;
        }
        Ok(result)
    }

    async fn webhook_logs(&self, id: WebhookId, skip: u32, limit: u32) -> Result<Vec<WebhookLog>> {
        self.record(MockCall::WebhookLogs { id, skip, limit })?;
        self.pause(Duration::ZERO).await;
        let state = self.lock();
        Ok(state
            .webhook_logs
            .iter()
            .filter(|l| l.webhook_id == id)
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
