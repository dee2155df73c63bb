//! Progress polling for the active import task.
//!
//! At most one task is polled at a time. Arming the poller for a new task
//! cancels the previous loop first. Each tick fetches the task's progress and
//! replaces the progress state wholesale; a terminal status disarms the loop
//! and emits the final notification. Transport failures are logged and the
//! loop keeps going, unless `max_poll_failures` consecutive failures are hit.

use std::sync::Arc;

use importer_core::{ImportStatus, ImportTask, TaskId};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::Shared;
use crate::timer::{Ticket, TimerSlot};

/// Repeating progress fetch bound to one task id.
pub struct ProgressPoller {
    shared: Arc<Shared>,
    slot: Arc<TimerSlot<TaskId>>,
}

impl ProgressPoller {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            slot: Arc::new(TimerSlot::new()),
        }
    }

    /// Start polling `task_id`, replacing any task polled so far.
    ///
    /// The first fetch happens one interval after arming.
    pub fn arm(&self, task_id: TaskId) -> JoinHandle<()> {
        let (replaced, ticket) = self.slot.arm(task_id.clone());
        if let Some(old) = replaced {
            info!(old_task = %old, new_task = %task_id, "superseding progress tracking");
        }
        importer_core::log_task_event!(task_id.as_str(), "progress tracking armed");

        let shared = Arc::clone(&self.shared);
        let slot = Arc::clone(&self.slot);
        tokio::spawn(run(shared, slot, task_id, ticket))
    }

    /// Stop polling. Returns the task that was being polled.
    pub fn disarm(&self) -> Option<TaskId> {
        let task = self.slot.disarm();
        if let Some(task) = &task {
            debug!(task_id = %task, "progress tracking disarmed");
        }
        task
    }

    /// Task currently being polled.
    pub fn active_task(&self) -> Option<TaskId> {
        self.slot.current()
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_armed()
    }

    /// Poll loops still running, including ones winding down after a cancel.
    pub fn live_loops(&self) -> usize {
        self.slot.live_loops()
    }
}

/// What a tick decided.
enum Step {
    Continue,
    Stop,
}

async fn run(shared: Arc<Shared>, slot: Arc<TimerSlot<TaskId>>, task_id: TaskId, ticket: Ticket) {
    let period = shared.settings.poll_interval;
    let max_failures = shared.settings.max_poll_failures;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            _ = ticket.cancel.cancelled() => {
                debug!(task_id = %task_id, "progress loop cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        let result = shared.api.import_progress(&task_id).await;

        let step = match result {
            Ok(task) => {
                failures = 0;
                match slot.if_current(&ticket, || apply_progress(&shared, task)) {
                    Some(Some(finished)) => {
                        finish(&shared, &slot, &ticket, finished);
                        Step::Stop
                    }
                    Some(None) => Step::Continue,
                    None => {
                        debug!(task_id = %task_id, "dropping progress response for superseded task");
                        Step::Stop
                    }
                }
            }
            Err(e) => {
                failures += 1;
                warn!(
                    task_id = %task_id,
                    error = %e,
                    consecutive_failures = failures,
                    "progress poll failed"
                );
                if max_failures.is_some_and(|max| failures >= max) {
                    give_up(&shared, &slot, &ticket, &task_id, failures);
                    Step::Stop
                } else {
                    Step::Continue
                }
            }
        };

        if matches!(step, Step::Stop) {
            break;
        }
    }
}

/// Terminal outcome observed by a poll.
struct Finished {
    task_id: TaskId,
    status: ImportStatus,
    error_message: Option<String>,
}

/// Replace the progress state. Runs under the slot lock.
fn apply_progress(shared: &Shared, task: ImportTask) -> Option<Finished> {
    let finished = task.status.is_terminal().then(|| Finished {
        task_id: task.task_id.clone(),
        status: task.status,
        error_message: task.error_message.clone(),
    });
    shared.update(|ui| ui.progress = Some(task));
    finished
}

fn finish(shared: &Shared, slot: &TimerSlot<TaskId>, ticket: &Ticket, finished: Finished) {
    if !slot.release(ticket) {
        return;
    }
    importer_core::log_task_event!(
        finished.task_id.as_str(),
        "import reached terminal status",
        status = %finished.status
    );
    match finished.status {
        ImportStatus::Completed => shared.notifier.success("Import completed successfully!"),
        _ => shared.notifier.error(format!(
            "Import failed: {}",
            finished.error_message.as_deref().unwrap_or("Unknown error")
        )),
    };
}

fn give_up(
    shared: &Shared,
    slot: &TimerSlot<TaskId>,
    ticket: &Ticket,
    task_id: &TaskId,
    failures: u32,
) {
    if slot.release(ticket) {
        shared.notifier.error(format!(
            "Lost track of import {} after {} failed progress checks",
            task_id, failures
        ));
    }
}
