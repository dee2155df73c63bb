//! # importer-tracker
//!
//! Tracks running imports and drives the parts of the importer that depend
//! on timing:
//!
//! - [`ProgressPoller`] - polls the active import task until it completes or fails
//! - [`JobsRefresher`] - reloads the job table while the jobs view is selected
//! - webhook tests - synthetic deliveries with a timed button reset
//! - [`Notifier`] - auto-dismissing status messages
//!
//! Everything is reached through [`ImportCoordinator`].
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use importer_client::HttpImportApi;
//! use importer_config::ImporterConfig;
//! use importer_tracker::{ImportCoordinator, TrackerSettings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ImporterConfig::load(None)?;
//! let api = Arc::new(HttpImportApi::from_config(&config.server)?);
//! let coordinator = ImportCoordinator::new(api, TrackerSettings::from_config(&config));
//!
//! let task_id = coordinator.upload(Some(Path::new("products.csv"))).await?;
//! println!("tracking {task_id}");
//! # Ok(())
//! # }
//! ```

pub mod confirm;
pub mod coordinator;
pub mod error;
pub mod jobs;
pub mod notify;
pub mod payload;
pub mod poller;
pub mod products;
pub mod refresher;
pub mod state;
mod timer;
pub mod upload;
pub mod view;
pub mod viewmodel;
pub mod webhooks;

pub use confirm::{
    AutoConfirm, ConfirmationAnswer, ConfirmationKind, ConfirmationLevel, ConfirmationProvider,
    ConfirmationRequest, DELETE_ALL_PHRASE,
};
pub use coordinator::ImportCoordinator;
pub use error::{Result, TrackerError};
pub use notify::{Notification, Notifier, Severity};
pub use payload::{TestPayload, build_test_request};
pub use poller::ProgressPoller;
pub use refresher::JobsRefresher;
pub use state::{TestButton, TrackerSettings, UiState, UploadControl};
pub use view::View;
pub use viewmodel::{JobRow, JobsTable, ProductRow, ProgressView, WebhookRow};
