//! Schedule queue — the shared, time-ordered set of pending transitions.
//!
//! Every operation takes the queue lock for its own duration only; callers
//! never hold it across an `.await`. Firing happens outside the queue: the
//! scheduler loop drains due events first and runs them afterwards, so a
//! firing may insert or cancel events without deadlocking.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use duskhub_domain::schedule::{Action, ScheduledEvent};
use duskhub_domain::time::Timestamp;

/// Sort key: trigger instant, then OFF before ON, then insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueKey {
    at: Timestamp,
    action: Action,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    events: BTreeMap<QueueKey, ScheduledEvent>,
    next_seq: u64,
}

/// Mutex-guarded queue of [`ScheduledEvent`]s ordered by trigger instant.
#[derive(Debug, Default)]
pub struct ScheduleQueue {
    inner: Mutex<Inner>,
}

impl ScheduleQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an event.
    pub fn insert(&self, event: ScheduledEvent) {
        let mut inner = self.lock();
        let key = QueueKey {
            at: event.at,
            action: event.action,
            seq: inner.next_seq,
        };
        inner.next_seq += 1;
        inner.events.insert(key, event);
    }

    /// Remove every pending event owned by `group`, returning how many were removed.
    pub fn cancel_all_for(&self, group: &str) -> usize {
        let mut inner = self.lock();
        let before = inner.events.len();
        inner.events.retain(|_, event| event.group != group);
        before - inner.events.len()
    }

    /// The earliest event if it is due at `now`, without removing it.
    #[must_use]
    pub fn next_due(&self, now: Timestamp) -> Option<ScheduledEvent> {
        self.lock()
            .events
            .values()
            .next()
            .filter(|event| event.is_due(now))
            .cloned()
    }

    /// Remove and return every event due at `now`, in firing order.
    pub fn drain_due(&self, now: Timestamp) -> Vec<ScheduledEvent> {
        let mut inner = self.lock();
        let mut due = Vec::new();
        while let Some(entry) = inner.events.first_entry() {
            if !entry.get().is_due(now) {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    /// Trigger instant of the earliest pending event.
    #[must_use]
    pub fn next_instant(&self) -> Option<Timestamp> {
        self.lock().events.keys().next().map(|key| key.at)
    }

    /// Pending events owned by `group`, in firing order.
    #[must_use]
    pub fn pending_for(&self, group: &str) -> Vec<ScheduledEvent> {
        self.lock()
            .events
            .values()
            .filter(|event| event.group == group)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }
}
