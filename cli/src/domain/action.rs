//! Lifecycle action requests and the phases an action passes through.

use std::fmt;
use std::time::{Duration, Instant};

use dockyard_common::ActionKind;

/// Deadline used when `now + budget` is not representable (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A request to run one lifecycle action. Ephemeral: built per call.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub service: String,
    pub kind: ActionKind,
    /// Instant by which the action must have finished, slot wait included.
    pub deadline: Instant,
}

impl ActionRequest {
    /// Request whose deadline is `budget` from now, saturating for budgets
    /// too large to add to the clock.
    #[must_use]
    pub fn within(service: impl Into<String>, kind: ActionKind, budget: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(budget)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self {
            service: service.into(),
            kind,
            deadline,
        }
    }

    /// Time left before the deadline; zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Phases of one action invocation.
///
/// `LockAcquired → Spawned → {Succeeded | Failed | TimedOut} → LockReleased`,
/// or `LockAcquired → CrashedOnSpawn → LockReleased` when the runtime cannot
/// be launched. `Busy` is terminal and never holds the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Busy,
    LockAcquired,
    Spawned,
    Succeeded,
    Failed,
    TimedOut,
    CrashedOnSpawn,
    LockReleased,
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionPhase::Busy => "busy",
            ActionPhase::LockAcquired => "lock_acquired",
            ActionPhase::Spawned => "spawned",
            ActionPhase::Succeeded => "succeeded",
            ActionPhase::Failed => "failed",
            ActionPhase::TimedOut => "timed_out",
            ActionPhase::CrashedOnSpawn => "crashed_on_spawn",
            ActionPhase::LockReleased => "lock_released",
        })
    }
}
