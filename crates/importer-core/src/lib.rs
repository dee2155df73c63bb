//! # importer-core
//!
//! Core types, errors, and utilities shared by the importer crates.
//!
//! This crate provides:
//! - [`ImporterError`] - Error type for local (non-transport) failures
//! - [`logging`] - Tracing setup and log paths
//! - [`types`] - Wire types for import tasks, jobs, webhooks and products
//! - [`format`] - Duration, count and status formatting for views
//!
//! ## Example
//!
//! ```no_run
//! use importer_core::{format::format_duration, logging};
//!
//! fn main() -> importer_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!     tracing::info!(eta = %format_duration(125), "import running");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod format;
pub mod logging;
pub mod types;

pub use error::{ImporterError, Result};
pub use logging::{LogGuard, init_logging};
pub use types::{
    EventType, ImportJob, ImportJobId, ImportStatus, ImportTask, MessageResponse, Product,
    ProductDraft, ProductFilter, ProductId, ProductPage, TaskId, UploadReceipt, Webhook,
    WebhookDraft, WebhookId, WebhookLog, WebhookTestResult,
};
