//! Single-occupancy slot for a cancellable timer loop.
//!
//! Arming a slot cancels whatever loop held it before and installs a fresh
//! [`CancellationToken`] under the same lock, so replacing a loop is atomic.
//! A loop checks its [`Ticket`] before applying any side effect; a response
//! that arrives after the loop was replaced is dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct Armed<K> {
    generation: u64,
    key: K,
    cancel: CancellationToken,
}

#[derive(Debug)]
struct SlotState<K> {
    generation: u64,
    armed: Option<Armed<K>>,
}

/// Holds at most one armed loop.
#[derive(Debug)]
pub(crate) struct TimerSlot<K> {
    state: Mutex<SlotState<K>>,
    live: Arc<AtomicUsize>,
}

/// Handed to the loop task when a slot is armed.
#[derive(Debug)]
pub(crate) struct Ticket {
    generation: u64,
    pub(crate) cancel: CancellationToken,
    _live: LiveGuard,
}

/// Counts a loop task as running until dropped.
#[derive(Debug)]
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<K: Clone> TimerSlot<K> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                generation: 0,
                armed: None,
            }),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Cancel the current occupant, if any, and install a new one.
    ///
    /// Returns the key of the replaced occupant along with the new ticket.
    pub(crate) fn arm(&self, key: K) -> (Option<K>, Ticket) {
        let mut state = self.lock();
        let replaced = state.armed.take().map(|old| {
            old.cancel.cancel();
            old.key
        });
        state.generation += 1;
        let cancel = CancellationToken::new();
        state.armed = Some(Armed {
            generation: state.generation,
            key,
            cancel: cancel.clone(),
        });
        let ticket = Ticket {
            generation: state.generation,
            cancel,
            _live: LiveGuard::enter(&self.live),
        };
        (replaced, ticket)
    }

    /// Cancel the current occupant. Returns its key if one was armed.
    pub(crate) fn disarm(&self) -> Option<K> {
        self.lock().armed.take().map(|old| {
            old.cancel.cancel();
            old.key
        })
    }

    /// Run `f` only if `ticket` still owns the slot.
    ///
    /// The slot lock is held while `f` runs, so the slot cannot be re-armed
    /// in between the check and the side effect.
    pub(crate) fn if_current<R>(&self, ticket: &Ticket, f: impl FnOnce() -> R) -> Option<R> {
        let state = self.lock();
        let current = state
            .armed
            .as_ref()
            .is_some_and(|a| a.generation == ticket.generation);
        (current && !ticket.cancel.is_cancelled()).then(f)
    }

    /// Give up the slot from inside the loop. No-op if it was re-armed.
    pub(crate) fn release(&self, ticket: &Ticket) -> bool {
        let mut state = self.lock();
        let current = state
            .armed
            .as_ref()
            .is_some_and(|a| a.generation == ticket.generation);
        if let Some(armed) = state.armed.take_if(|_| current) {
            armed.cancel.cancel();
        }
        current
    }

    /// Key of the current occupant.
    pub(crate) fn current(&self) -> Option<K> {
        self.lock().armed.as_ref().map(|a| a.key.clone())
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.lock().armed.is_some()
    }

    /// Loop tasks that have been armed and not yet finished.
    pub(crate) fn live_loops(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<K>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
