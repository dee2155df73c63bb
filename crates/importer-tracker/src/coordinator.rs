//! The coordinator that owns the tracker state and both timer loops.

use std::sync::Arc;

use importer_client::ImportApi;
use tracing::{debug, info};

use crate::confirm::{AutoConfirm, ConfirmationProvider, ConfirmationRequest};
use crate::error::{Result, TrackerError};
use crate::notify::Notifier;
use crate::poller::ProgressPoller;
use crate::refresher::JobsRefresher;
use crate::state::{Shared, TrackerSettings, UiState};
use crate::view::View;
use crate::viewmodel::{JobsTable, ProductRow, ProgressView, WebhookRow};

/// Entry point for every user action.
///
/// Owns the shared state, the progress poller and the jobs refresher. Timer
/// tasks hold a reference to the same state and read it at tick time.
pub struct ImportCoordinator {
    pub(crate) shared: Arc<Shared>,
    pub(crate) poller: ProgressPoller,
    pub(crate) refresher: JobsRefresher,
    confirmer: Arc<dyn ConfirmationProvider>,
}

impl ImportCoordinator {
    /// Create a coordinator. Destructive actions are declined until a
    /// confirmation provider is set.
    pub fn new(api: Arc<dyn ImportApi>, settings: TrackerSettings) -> Self {
        let shared = Arc::new(Shared::new(api, settings));
        Self {
            poller: ProgressPoller::new(Arc::clone(&shared)),
            refresher: JobsRefresher::new(Arc::clone(&shared)),
            shared,
            confirmer: Arc::new(AutoConfirm::decline_all()),
        }
    }

    /// Use `provider` to confirm deletions.
    pub fn with_confirmation(mut self, provider: Arc<dyn ConfirmationProvider>) -> Self {
        self.confirmer = provider;
        self
    }

    /// Select a view and load its data.
    ///
    /// The jobs refresher is always disarmed first, so selecting the jobs
    /// view again leaves exactly one refresh loop.
    pub async fn switch_view(&self, view: View) {
        self.refresher.disarm();
        let previous = self.shared.update(|ui| std::mem::replace(&mut ui.view, view));
        debug!(from = %previous, to = %view, "switching view");

        match view {
            View::Upload => {}
            View::Products => {
                let _ = self.shared.load_products().await;
            }
            View::Webhooks => {
                let _ = self.shared.load_webhooks().await;
            }
            View::Jobs => {
                let _ = self.shared.load_jobs().await;
                // The load above awaited; only arm if the user is still here.
                if self.shared.current_view() == View::Jobs {
                    self.refresher.arm();
                }
            }
        }
    }

    /// Ask the confirmation provider; declines are reported and returned as errors.
    pub(crate) async fn confirm(&self, request: &ConfirmationRequest) -> Result<()> {
        let answer = self.confirmer.confirm(request).await;
        if request.is_confirmed_by(&answer) {
            return Ok(());
        }
        info!(action = %request.title, "action not confirmed");
        self.shared.notifier.info(format!("{} cancelled", request.title));
        Err(TrackerError::ConfirmationDeclined)
    }

    /// Copy of the current UI state.
    pub fn snapshot(&self) -> UiState {
        self.shared.ui().clone()
    }

    /// Selected view.
    pub fn view(&self) -> View {
        self.shared.current_view()
    }

    /// Progress panel, when an upload has been made.
    pub fn progress_view(&self) -> Option<ProgressView> {
        let ui = self.shared.ui();
        if !ui.progress_visible {
            return None;
        }
        ui.progress.as_ref().map(ProgressView::from_task)
    }

    pub fn jobs_table(&self) -> JobsTable {
        JobsTable::from_jobs(&self.shared.ui().jobs)
    }

    pub fn webhook_rows(&self) -> Vec<WebhookRow> {
        self.shared
            .ui()
            .webhooks
            .iter()
            .map(WebhookRow::from_webhook)
            .collect()
    }

    pub fn product_rows(&self) -> Vec<ProductRow> {
        self.shared
            .ui()
            .products
            .as_ref()
            .map(|page| page.items.iter().map(ProductRow::from_product).collect())
            .unwrap_or_default()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.shared.notifier
    }

    pub fn poller(&self) -> &ProgressPoller {
        &self.poller
    }

    pub fn refresher(&self) -> &JobsRefresher {
        &self.refresher
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.shared.settings
    }

    /// Stop both timer loops.
    pub fn shutdown(&self) {
        self.poller.disarm();
        self.refresher.disarm();
    }
}

impl Drop for ImportCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
