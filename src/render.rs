//! Plain-text tables for stdout.

use importer_core::WebhookLog;
use importer_tracker::{JobsTable, ProductRow, ProgressView, WebhookRow};

pub fn progress_line(view: &ProgressView) -> String {
    format!(
        "[{:>3}%] {:<10} {}/{} processed, {} ok, {} failed, ETA {}",
        view.percentage,
        view.status_text,
        view.processed,
        view.total,
        view.successful,
        view.failed,
        view.eta
    )
}

pub fn print_jobs(table: &JobsTable) {
    if table.is_empty() {
        println!("No import jobs found");
        return;
    }
    println!(
        "{:<28} {:<11} {:>5} {:>8} {:>8} {:>8} {:>8}  {:<19} {}",
        "FILE", "STATUS", "PCT", "TOTAL", "OK", "FAILED", "RATE", "STARTED", "DURATION"
    );
    for row in &table.rows {
        let status = if row.spinning {
            format!("{}*", row.status_text)
        } else {
            row.status_text.clone()
        };
        println!(
            "{:<28} {:<11} {:>4}% {:>8} {:>8} {:>8} {:>8}  {:<19} {}",
            truncate(&row.filename, 28),
            status,
            row.percentage,
            row.total,
            row.successful,
            row.failed,
            row.success_rate,
            row.started,
            row.duration
        );
    }
    if table.has_active_jobs {
        println!("* still running");
    }
}

pub fn print_products(rows: &[ProductRow], page: u32, pages: u32, total: u64) {
    if rows.is_empty() {
        println!("No products found");
        return;
    }
    println!(
        "{:>6}  {:<16} {:<30} {:>10} {:<16} {:>6} {}",
        "ID", "SKU", "NAME", "PRICE", "CATEGORY", "STOCK", "ACTIVE"
    );
    for row in rows {
        println!(
            "{:>6}  {:<16} {:<30} {:>10} {:<16} {:>6} {}",
            row.id,
            truncate(&row.sku, 16),
            truncate(&row.name, 30),
            row.price,
            truncate(&row.category, 16),
            row.inventory,
            if row.active { "yes" } else { "no" }
        );
    }
    println!("Page {} of {} ({} products)", page, pages.max(1), total);
}

pub fn print_webhooks(rows: &[WebhookRow]) {
    if rows.is_empty() {
        println!("No webhooks configured");
        return;
    }
    println!(
        "{:>4}  {:<20} {:<40} {:<10} {:<6} {}",
        "ID", "NAME", "URL", "EVENTS", "ACTIVE", "LAST RESPONSE"
    );
    for row in rows {
        let last = match &row.last_latency {
            Some(latency) => format!("{} ({})", row.last_response, latency),
            None => row.last_response.clone(),
        };
        println!(
            "{:>4}  {:<20} {:<40} {:<10} {:<6} {}",
            row.id,
            truncate(&row.name, 20),
            truncate(&row.url, 40),
            row.events,
            if row.active { "yes" } else { "no" },
            last
        );
    }
}

pub fn print_webhook_logs(logs: &[WebhookLog]) {
    if logs.is_empty() {
        println!("No deliveries recorded");
        return;
    }
    for log in logs {
        let code = log
            .response_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let latency = log
            .response_time_ms
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<18} {:<4} {:>7}  {}{}",
            log.created_at.format("%Y-%m-%d %H:%M:%S"),
            log.event_type.as_str(),
            code,
            latency,
            if log.success { "delivered" } else { "failed" },
            log.error_message
                .as_deref()
                .map(|e| format!(": {}", e))
                .unwrap_or_default()
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
