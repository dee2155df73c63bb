//! State shared between the coordinator and its timer tasks.

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use importer_client::{ImportApi, JobQuery};
use importer_config::ImporterConfig;
use importer_core::{ImportJob, ImportTask, ProductFilter, ProductPage, Webhook, WebhookId};

use crate::notify::Notifier;
use crate::view::View;

/// Timing and paging settings for the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSettings {
    pub poll_interval: Duration,
    pub jobs_refresh_interval: Duration,
    /// Delay between a webhook test response and the list reload
    pub webhook_reload_delay: Duration,
    /// Delay between a webhook test starting and its button resetting
    pub webhook_restore_delay: Duration,
    /// Consecutive poll failures before tracking gives up; `None` never gives up
    pub max_poll_failures: Option<u32>,
    pub page_size: u32,
    pub dismiss_after: Duration,
    pub history_limit: usize,
}

impl TrackerSettings {
    /// Settings from a loaded configuration.
    pub fn from_config(config: &ImporterConfig) -> Self {
        Self {
            poll_interval: config.tracking.poll_interval(),
            jobs_refresh_interval: config.tracking.jobs_refresh_interval(),
            webhook_reload_delay: config.tracking.webhook_reload_delay(),
            webhook_restore_delay: config.tracking.webhook_restore_delay(),
            max_poll_failures: config.tracking.max_poll_failures,
            page_size: config.products.page_size,
            dismiss_after: config.notifications.dismiss_after(),
            history_limit: config.notifications.history_limit,
        }
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self::from_config(&ImporterConfig::default())
    }
}

/// State of the upload control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadControl {
    #[default]
    Ready,
    Uploading,
}

/// Visual state of a webhook's test button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestButton {
    #[default]
    Idle,
    /// Test request in flight
    Busy,
    /// Delivery succeeded; shown until the restore timer fires
    Succeeded,
    /// Delivery failed; shown until the restore timer fires
    Failed,
}

/// Everything a front end renders.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub view: View,
    pub upload: UploadControl,
    pub progress_visible: bool,
    /// Last progress response, replaced wholesale on each poll
    pub progress: Option<ImportTask>,
    pub jobs: Vec<ImportJob>,
    /// Paging and status filter used by every jobs load
    pub jobs_query: JobQuery,
    /// Shown while the jobs auto-refresh is armed
    pub jobs_auto_refresh: bool,
    /// Last loaded webhook list; the test invoker looks webhooks up here
    pub webhooks: Vec<Webhook>,
    pub test_buttons: HashMap<WebhookId, TestButton>,
    pub products: Option<ProductPage>,
    pub product_page: u32,
    pub product_filter: ProductFilter,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            view: View::default(),
            upload: UploadControl::default(),
            progress_visible: false,
            progress: None,
            jobs: Vec::new(),
            jobs_query: JobQuery::default(),
            jobs_auto_refresh: false,
            webhooks: Vec::new(),
            test_buttons: HashMap::new(),
            products: None,
            product_page: 1,
            product_filter: ProductFilter::default(),
        }
    }
}

impl UiState {
    /// Button state for a webhook; idle when never tested.
    pub fn test_button(&self, id: WebhookId) -> TestButton {
        self.test_buttons.get(&id).copied().unwrap_or_default()
    }
}

/// Owned by the coordinator and handed to every timer task.
pub(crate) struct Shared {
    pub(crate) api: Arc<dyn ImportApi>,
    pub(crate) notifier: Notifier,
    pub(crate) settings: TrackerSettings,
    /// Webhook test buttons waiting for their restore timer
    pub(crate) pending_restores: AtomicUsize,
    ui: Mutex<UiState>,
}

impl Shared {
    pub(crate) fn new(api: Arc<dyn ImportApi>, settings: TrackerSettings) -> Self {
        Self {
            api,
            notifier: Notifier::new(settings.dismiss_after, settings.history_limit),
            settings,
            pending_restores: AtomicUsize::new(0),
            ui: Mutex::new(UiState::default()),
        }
    }

    /// Lock the UI state. Never hold the guard across an `.await`.
    pub(crate) fn ui(&self) -> MutexGuard<'_, UiState> {
        self.ui.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply a change to the UI state.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut UiState) -> R) -> R {
        f(&mut self.ui())
    }

    /// The currently selected view, read fresh.
    pub(crate) fn current_view(&self) -> View {
        self.ui().view
    }
}
