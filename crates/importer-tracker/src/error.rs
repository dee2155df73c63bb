//! Error types for tracker operations.

use importer_client::ClientError;
use importer_core::WebhookId;
use thiserror::Error;

/// Errors returned by [`ImportCoordinator`](crate::ImportCoordinator) operations.
///
/// By the time one of these reaches the caller the user has already been
/// told through a notification; the value is returned for inspection only.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Upload requested without a file
    #[error("Please select a file")]
    NoFileSelected,

    /// Upload of something that is not a CSV file
    #[error("Please select a CSV file (got {filename})")]
    InvalidFileType { filename: String },

    /// Webhook missing from the loaded list, or subscribed to nothing
    #[error("Webhook not found or has no event types (id {id})")]
    WebhookUnavailable { id: WebhookId },

    /// Webhook draft without event types
    #[error("Please select at least one event type")]
    NoEventTypes,

    /// Draft failed client-side validation
    #[error("{0}")]
    InvalidDraft(String),

    /// The user did not confirm a destructive action
    #[error("Action was not confirmed")]
    ConfirmationDeclined,

    /// The import service call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Reading the upload failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TrackerError {
    /// Returns true for failures caught before any network call.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            TrackerError::NoFileSelected
                | TrackerError::InvalidFileType { .. }
                | TrackerError::WebhookUnavailable { .. }
                | TrackerError::NoEventTypes
                | TrackerError::InvalidDraft(_)
        )
    }

    /// The underlying client error, if the failure came from the network.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            TrackerError::Client(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
