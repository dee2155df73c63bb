//! Display-ready rows derived from the UI state.

use importer_core::format::{StatusTone, format_count, format_duration, format_rate, title_case};
use importer_core::{ImportJob, ImportStatus, ImportTask, Product, Webhook};

/// Progress panel for the task being tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    /// Server percentage, unmodified
    pub percentage: u32,
    pub status_text: String,
    pub tone: StatusTone,
    pub processed: String,
    pub total: String,
    pub successful: String,
    pub failed: String,
    pub eta: String,
}

impl ProgressView {
    pub fn from_task(task: &ImportTask) -> Self {
        let eta = match task.estimated_time_remaining {
            Some(secs) if secs != 0 => format_duration(secs.max(0) as u64),
            _ if task.status == ImportStatus::Completed => "Completed".to_string(),
            _ => "Calculating...".to_string(),
        };
        Self {
            percentage: task.progress_percentage,
            status_text: title_case(task.status.as_str()),
            tone: StatusTone::for_status(task.status),
            processed: format_count(task.processed_records),
            total: format_count(task.total_records),
            successful: format_count(task.successful_records),
            failed: format_count(task.failed_records),
            eta,
        }
    }
}

/// One row of the import job table.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub filename: String,
    pub status_text: String,
    /// Processing jobs get a spinner
    pub spinning: bool,
    pub percentage: u32,
    pub tone: StatusTone,
    pub total: String,
    pub successful: String,
    pub failed: String,
    pub success_rate: String,
    pub success_tone: StatusTone,
    pub started: String,
    pub duration: String,
}

impl JobRow {
    pub fn from_job(job: &ImportJob) -> Self {
        let rate = job.success_rate();
        let duration = match job.duration_secs() {
            Some(secs) => format_duration(secs),
            None if job.status == ImportStatus::Processing => "Running...".to_string(),
            None => "-".to_string(),
        };
        Self {
            filename: job.filename.clone(),
            status_text: title_case(job.status.as_str()),
            spinning: job.status == ImportStatus::Processing,
            percentage: job.progress_percentage,
            tone: StatusTone::for_status(job.status),
            total: format_count(job.total_records),
            successful: format_count(job.successful_records),
            failed: format_count(job.failed_records),
            success_rate: format!("{}%", format_rate(rate, job.total_records)),
            success_tone: StatusTone::for_success_rate(rate),
            started: job
                .started_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
            duration,
        }
    }
}

/// The import job table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobsTable {
    pub rows: Vec<JobRow>,
    /// Any job still pending or processing
    pub has_active_jobs: bool,
}

impl JobsTable {
    pub fn from_jobs(jobs: &[ImportJob]) -> Self {
        Self {
            rows: jobs.iter().map(JobRow::from_job).collect(),
            has_active_jobs: jobs.iter().any(|j| j.status.is_active()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One row of the webhook table.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookRow {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub events: String,
    pub active: bool,
    /// `"200"` and its tone, or `"Never tested"` with a neutral tone
    pub last_response: String,
    pub last_response_tone: StatusTone,
    pub last_latency: Option<String>,
}

impl WebhookRow {
    pub fn from_webhook(webhook: &Webhook) -> Self {
        let (last_response, last_response_tone) = match webhook.last_response_code {
            Some(code) => (code.to_string(), StatusTone::for_response_code(code)),
            None => ("Never tested".to_string(), StatusTone::Neutral),
        };
        Self {
            id: webhook.id,
            name: webhook.name.clone(),
            url: webhook.url.clone(),
            events: format!("{} events", webhook.event_types.len()),
            active: webhook.is_active,
            last_response,
            last_response_tone,
            last_latency: webhook
                .last_response_code
                .and(webhook.last_response_time_ms)
                .map(|ms| format!("{}ms", ms)),
        }
    }
}

/// One row of the product table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub price: String,
    pub category: String,
    pub inventory: String,
    pub active: bool,
}

impl ProductRow {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            price: product
                .price
                .filter(|p| *p != 0.0)
                .map(|p| format!("${:.2}", p))
                .unwrap_or_else(|| "-".to_string()),
            category: product.category.clone().unwrap_or_else(|| "-".to_string()),
            inventory: product
                .inventory_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "0".to_string()),
            active: product.is_active,
        }
    }
}
