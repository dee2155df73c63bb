//! # importer-client
//!
//! Client for the product import service.
//!
//! The [`ImportApi`] trait is the seam between the tracking logic and the
//! network: [`HttpImportApi`] talks to the real service, [`MockImportApi`]
//! replays scripted answers in tests.
//!
//! ## Example
//!
//! ```no_run
//! use importer_client::{HttpImportApi, ImportApi};
//! use importer_config::ServerConfig;
//! use importer_core::TaskId;
//!
//! # async fn example() -> Result<(), importer_client::ClientError> {
//! let api = HttpImportApi::from_config(&ServerConfig::default())?;
//! let task = api.import_progress(&TaskId::new("abc-123")).await?;
//! println!("{}% ({})", task.progress_percentage, task.status);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod mock;

pub use api::{ImportApi, JobQuery, UploadFile, WebhookTestRequest};
pub use error::{ClientError, Result};
pub use http::HttpImportApi;
pub use mock::{MockCall, MockFailure, MockImportApi, MockOp, Scripted};
