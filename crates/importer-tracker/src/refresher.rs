//! Auto-refresh of the import job table.
//!
//! Armed when the jobs view is selected and disarmed on every view switch.
//! Each tick reads the selected view at tick time: if the user has moved away
//! the tick does nothing.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::state::Shared;
use crate::timer::{Ticket, TimerSlot};
use crate::view::View;

/// Repeating reload of the job list.
pub struct JobsRefresher {
    shared: Arc<Shared>,
    slot: Arc<TimerSlot<()>>,
}

impl JobsRefresher {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            slot: Arc::new(TimerSlot::new()),
        }
    }

    /// Start refreshing, replacing any loop already running.
    pub fn arm(&self) -> JoinHandle<()> {
        let (replaced, ticket) = self.slot.arm(());
        if replaced.is_some() {
            debug!("replacing jobs auto-refresh loop");
        }
        self.shared.update(|ui| ui.jobs_auto_refresh = true);

        let shared = Arc::clone(&self.shared);
        let slot = Arc::clone(&self.slot);
        tokio::spawn(run(shared, slot, ticket))
    }

    /// Stop refreshing and hide the indicator.
    pub fn disarm(&self) {
        if self.slot.disarm().is_some() {
            debug!("jobs auto-refresh disarmed");
        }
        self.shared.update(|ui| ui.jobs_auto_refresh = false);
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_armed()
    }

    /// Refresh loops still running, including ones winding down after a cancel.
    pub fn live_loops(&self) -> usize {
        self.slot.live_loops()
    }
}

async fn run(shared: Arc<Shared>, slot: Arc<TimerSlot<()>>, ticket: Ticket) {
    let period = shared.settings.jobs_refresh_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticket.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if shared.current_view() != View::Jobs {
            debug!("jobs view not selected, skipping refresh");
            continue;
        }

        let result = shared.fetch_jobs().await;
        let applied = slot.if_current(&ticket, || match result {
            Ok(jobs) => shared.store_jobs(jobs),
            Err(e) => shared.report_jobs_error(&e),
        });
        if applied.is_none() {
            debug!("dropping job list from a cancelled refresh");
            break;
        }
    }
}
