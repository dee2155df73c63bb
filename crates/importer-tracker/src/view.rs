//! Selectable views.

use std::fmt;

/// The four views of the importer.
///
/// Only one is selected at a time; the jobs auto-refresh is tied to
/// [`View::Jobs`] being the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    /// CSV upload form and live progress
    #[default]
    Upload,
    /// Product catalog
    Products,
    /// Webhook targets
    Webhooks,
    /// Import job history
    Jobs,
}

impl View {
    /// All views in tab order.
    pub const ALL: [View; 4] = [View::Upload, View::Products, View::Webhooks, View::Jobs];

    /// Returns the display title for this view.
    pub fn title(&self) -> &'static str {
        match self {
            View::Upload => "Upload",
            View::Products => "Products",
            View::Webhooks => "Webhooks",
            View::Jobs => "Import Jobs",
        }
    }

    /// Returns the next view in tab order, wrapping around.
    pub fn next(&self) -> View {
        match self {
            View::Upload => View::Products,
            View::Products => View::Webhooks,
            View::Webhooks => View::Jobs,
            View::Jobs => View::Upload,
        }
    }

    /// Returns true if selecting this view keeps the job table refreshing.
    pub fn auto_refreshes(&self) -> bool {
        matches!(self, View::Jobs)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
