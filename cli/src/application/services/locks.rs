//! Per-service mutual exclusion for lifecycle actions.
//!
//! Locks are non-blocking: a second action on a service that is already busy
//! is rejected immediately instead of queueing behind the first one.

use std::sync::Arc;

use dashmap::DashMap;
use dockyard_common::ActionKind;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::domain::{ActionPhase, ServiceKey};

/// Lock per service plus the action each lock holder is running.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: Arc<DashMap<ServiceKey, Arc<Mutex<()>>>>,
    in_flight: Arc<DashMap<ServiceKey, ActionKind>>,
}

impl LockTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `key` without waiting.
    ///
    /// Returns `None` when another action holds it. The returned lease
    /// releases the lock when dropped, including when the owning future is
    /// cancelled.
    pub fn try_acquire(&self, key: &ServiceKey, kind: ActionKind) -> Option<ActionLease> {
        let lock = Arc::clone(
            self.locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let guard = lock.try_lock_owned().ok()?;
        self.in_flight.insert(key.clone(), kind);
        debug!(
            service = %key.name,
            action = %kind,
            phase = %ActionPhase::LockAcquired,
            "lock acquired"
        );
        Some(ActionLease {
            key: key.clone(),
            kind,
            locks: Arc::clone(&self.locks),
            in_flight: Arc::clone(&self.in_flight),
            _guard: guard,
        })
    }

    /// Action currently running against `key`, if any.
    #[must_use]
    pub fn in_flight(&self, key: &ServiceKey) -> Option<ActionKind> {
        self.in_flight.get(key).map(|entry| *entry.value())
    }
}

/// Proof that the holder owns a service's lock.
#[derive(Debug)]
pub struct ActionLease {
    key: ServiceKey,
    kind: ActionKind,
    locks: Arc<DashMap<ServiceKey, Arc<Mutex<()>>>>,
    in_flight: Arc<DashMap<ServiceKey, ActionKind>>,
    // Dropped after `drop` runs, so the marker is cleared before the lock opens.
    _guard: OwnedMutexGuard<()>,
}

impl ActionLease {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

impl Drop for ActionLease {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
        // The table and this lease's guard hold the only references: nobody
        // else is contending, so the entry can go.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 2);
        debug!(
            service = %self.key.name,
            action = %self.kind,
            phase = %ActionPhase::LockReleased,
            "lock released"
        );
    }
}
