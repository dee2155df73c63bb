//! Webhook management.
//!
//! The loaded list doubles as the lookup table for webhook tests, so every
//! mutation reloads it.

use importer_client::ClientError;
use importer_core::{Webhook, WebhookDraft, WebhookId, WebhookLog};
use tracing::{info, warn};

use crate::confirm::ConfirmationRequest;
use crate::coordinator::ImportCoordinator;
use crate::error::{Result, TrackerError};
use crate::state::Shared;

impl Shared {
    /// Fetch the webhook list and replace the cached copy.
    pub(crate) async fn load_webhooks(&self) -> std::result::Result<Vec<Webhook>, ClientError> {
        match self.api.list_webhooks().await {
            Ok(webhooks) => {
                self.update(|ui| ui.webhooks = webhooks.clone());
                Ok(webhooks)
            }
            Err(e) => {
                warn!(error = %e, "failed to load webhooks");
                self.notifier.error("Failed to load webhooks");
                Err(e)
            }
        }
    }
}

/// Check a draft before it is sent, trimming text fields.
pub fn validate_webhook_draft(draft: &WebhookDraft) -> Result<WebhookDraft> {
    if draft.event_types.is_empty() {
        return Err(TrackerError::NoEventTypes);
    }

    let mut clean = draft.clone();
    clean.name = draft.name.trim().to_string();
    clean.url = draft.url.trim().to_string();
    clean.secret_key = draft
        .secret_key
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if clean.name.is_empty() {
        return Err(TrackerError::InvalidDraft("Webhook name is required".into()));
    }
    if !(clean.url.starts_with("http://") || clean.url.starts_with("https://")) {
        return Err(TrackerError::InvalidDraft(
            "Webhook URL must start with http:// or https://".into(),
        ));
    }
    if !WebhookDraft::TIMEOUT_RANGE.contains(&clean.timeout_seconds) {
        return Err(TrackerError::InvalidDraft(format!(
            "Timeout must be between {} and {} seconds",
            WebhookDraft::TIMEOUT_RANGE.start(),
            WebhookDraft::TIMEOUT_RANGE.end()
        )));
    }
    if !WebhookDraft::RETRY_RANGE.contains(&clean.retry_count) {
        return Err(TrackerError::InvalidDraft(format!(
            "Retry count must be between {} and {}",
            WebhookDraft::RETRY_RANGE.start(),
            WebhookDraft::RETRY_RANGE.end()
        )));
    }
    Ok(clean)
}

impl ImportCoordinator {
    /// Reload the webhook list.
    pub async fn load_webhooks(&self) -> Result<Vec<Webhook>> {
        Ok(self.shared.load_webhooks().await?)
    }

    /// Fetch one webhook, e.g. to prefill an edit form.
    pub async fn webhook(&self, id: WebhookId) -> Result<Webhook> {
        self.shared.api.get_webhook(id).await.map_err(|e| {
            warn!(webhook_id = id, error = %e, "failed to load webhook");
            self.shared.notifier.error("Failed to load webhook details");
            e.into()
        })
    }

    /// Create a webhook, or update it when `id` is given.
    pub async fn save_webhook(&self, id: Option<WebhookId>, draft: &WebhookDraft) -> Result<Webhook> {
        let draft = match validate_webhook_draft(draft) {
            Ok(draft) => draft,
            Err(e) => {
                self.shared.notifier.error(e.to_string());
                return Err(e);
            }
        };

        let saved = match id {
            Some(id) => self.shared.api.update_webhook(id, &draft).await,
            None => self.shared.api.create_webhook(&draft).await,
        };
        match saved {
            Ok(webhook) => {
                info!(webhook_id = webhook.id, name = %webhook.name, "webhook saved");
                let _ = self.shared.load_webhooks().await;
                let verb = if id.is_some() { "updated" } else { "created" };
                self.shared
                    .notifier
                    .success(format!("Webhook {} successfully!", verb));
                Ok(webhook)
            }
            Err(e) => {
                warn!(error = %e, "failed to save webhook");
                self.shared.notifier.error(e.detail_or("Failed to save webhook"));
                Err(e.into())
            }
        }
    }

    /// Delete a webhook after a yes/no confirmation.
    pub async fn delete_webhook(&self, id: WebhookId) -> Result<()> {
        self.confirm(&ConfirmationRequest::delete_one("webhook")).await?;

        match self.shared.api.delete_webhook(id).await {
            Ok(()) => {
                info!(webhook_id = id, "webhook deleted");
                let _ = self.shared.load_webhooks().await;
                self.shared.notifier.success("Webhook deleted successfully!");
                Ok(())
            }
            Err(e) => {
                warn!(webhook_id = id, error = %e, "failed to delete webhook");
                self.shared.notifier.error("Failed to delete webhook");
                Err(e.into())
            }
        }
    }

    /// Recorded deliveries of a webhook, newest first.
    pub async fn webhook_logs(&self, id: WebhookId, skip: u32, limit: u32) -> Result<Vec<WebhookLog>> {
        self.shared
            .api
            .webhook_logs(id, skip, limit)
            .await
            .map_err(|e| {
                warn!(webhook_id = id, error = %e, "failed to load webhook logs");
                self.shared.notifier.error("Failed to load webhook logs");
                e.into()
            })
    }
}
