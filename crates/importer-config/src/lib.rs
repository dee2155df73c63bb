//! # importer-config
//!
//! Configuration for the importer, read from `~/.importer/config.yaml`.
//!
//! Every section is optional; missing fields fall back to the defaults
//! (2s progress polling, 5s job refresh, 5s notifications).
//!
//! ```yaml
//! server:
//!   base_url: http://localhost:8000
//!   timeout_secs: 30
//! tracking:
//!   poll_interval_ms: 2000
//!   jobs_refresh_interval_ms: 5000
//!   webhook_reload_delay_ms: 1000
//!   webhook_restore_delay_ms: 2000
//!   max_poll_failures: null
//! notifications:
//!   dismiss_after_ms: 5000
//!   history_limit: 100
//! products:
//!   page_size: 50
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use importer_core::{ImporterError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable that overrides `server.base_url`.
pub const BASE_URL_ENV: &str = "IMPORTER_BASE_URL";

/// Minimum accepted interval for any timer, in milliseconds.
pub const MIN_INTERVAL_MS: u64 = 100;

/// Default config file path (`~/.importer/config.yaml`).
pub fn config_path() -> Option<PathBuf> {
    importer_core::logging::importer_home()
        .ok()
        .map(|home| home.join("config.yaml"))
}

/// Top-level importer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImporterConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub products: ProductsConfig,
}

impl ImporterConfig {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// path is used when present and defaults otherwise. The
    /// `IMPORTER_BASE_URL` override is applied last, then the result is
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match config_path().filter(|p| p.exists()) {
                Some(default_path) => Self::load_from(&default_path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ImporterError::ConfigNotFound {
                    path: path.to_path_buf(),
                    source: Some(e),
                }
            } else {
                ImporterError::io("reading config", path, e)
            }
        })?;

        Self::parse(&content).map_err(|message| ImporterError::ConfigInvalid {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str::<ImporterConfig>(content).map_err(|e| e.to_string())
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(base_url = %url, "base URL overridden from environment");
            self.server.base_url = url.trim().to_string();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let url = &self.server.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ImporterError::config_validation(format!(
                "server.base_url must start with http:// or https://, got '{url}'"
            )));
        }

        if self.server.timeout_secs == 0 {
            return Err(ImporterError::config_validation(
                "server.timeout_secs must be greater than 0",
            ));
        }

        let intervals = [
            ("tracking.poll_interval_ms", self.tracking.poll_interval_ms),
            ("tracking.jobs_refresh_interval_ms", self.tracking.jobs_refresh_interval_ms),
            ("tracking.webhook_reload_delay_ms", self.tracking.webhook_reload_delay_ms),
            ("tracking.webhook_restore_delay_ms", self.tracking.webhook_restore_delay_ms),
            ("notifications.dismiss_after_ms", self.notifications.dismiss_after_ms),
        ];
        for (field, value) in intervals {
            if value < MIN_INTERVAL_MS {
                return Err(ImporterError::config_validation(format!(
                    "{field} must be >= {MIN_INTERVAL_MS}, got {value}"
                )));
            }
        }

        if self.tracking.max_poll_failures == Some(0) {
            return Err(ImporterError::config_validation(
                "tracking.max_poll_failures must be at least 1 when set",
            ));
        }

        if !(1..=100).contains(&self.products.page_size) {
            return Err(ImporterError::config_validation(format!(
                "products.page_size must be between 1 and 100, got {}",
                self.products.page_size
            )));
        }

        Ok(())
    }

    /// Set the server base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.server.base_url = url.into();
        self
    }
}

/// Import API server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Base URL of the import API, without the `/api/v1` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Timer settings for progress polling, job refresh and webhook tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingConfig {
    /// Interval between progress polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Interval between job list refreshes while the jobs view is selected.
    #[serde(default = "default_jobs_refresh_interval")]
    pub jobs_refresh_interval_ms: u64,

    /// Delay before the webhook list is reloaded after a test.
    #[serde(default = "default_webhook_reload_delay")]
    pub webhook_reload_delay_ms: u64,

    /// Delay, from the start of a test, before the test control is reset.
    #[serde(default = "default_webhook_restore_delay")]
    pub webhook_restore_delay_ms: u64,

    /// Consecutive transport failures after which polling gives up.
    /// `None` keeps polling indefinitely.
    #[serde(default)]
    pub max_poll_failures: Option<u32>,
}

impl TrackingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn jobs_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.jobs_refresh_interval_ms)
    }

    pub fn webhook_reload_delay(&self) -> Duration {
        Duration::from_millis(self.webhook_reload_delay_ms)
    }

    pub fn webhook_restore_delay(&self) -> Duration {
        Duration::from_millis(self.webhook_restore_delay_ms)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            jobs_refresh_interval_ms: default_jobs_refresh_interval(),
            webhook_reload_delay_ms: default_webhook_reload_delay(),
            webhook_restore_delay_ms: default_webhook_restore_delay(),
            max_poll_failures: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_jobs_refresh_interval() -> u64 {
    5000
}

fn default_webhook_reload_delay() -> u64 {
    1000
}

fn default_webhook_restore_delay() -> u64 {
    2000
}

/// Notification display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    /// How long a notification stays visible.
    #[serde(default = "default_dismiss_after")]
    pub dismiss_after_ms: u64,

    /// How many past notifications are kept for inspection.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl NotificationConfig {
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_dismiss_after() -> u64 {
    5000
}

fn default_history_limit() -> usize {
    100
}

/// Product listing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductsConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    50
}
