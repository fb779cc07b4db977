//! Domain types and validators for orchestrator configuration.
//!
//! Pure functions only. No I/O.

use std::time::Duration;

use dockyard_common::ActionKind;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.dockyard/config.yaml`.
///
/// Every value is a tunable constant; the defaults are starting points, not
/// measured optima.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub runtime: RuntimeConfig,
    pub timeouts: TimeoutConfig,
    pub limits: LimitsConfig,
    pub logs: LogsConfig,
}

/// Container runtime invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Program that provides the `compose` subcommand.
    pub program: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }
}

/// Per-action time budgets, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    pub start_secs: u64,
    pub stop_secs: u64,
    pub restart_secs: u64,
    /// Builds pull base images and compile; they get a much longer budget.
    pub build_secs: u64,
    pub probe_secs: u64,
    pub logs_secs: u64,
    /// Time between the graceful termination signal and the forced kill.
    pub grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            start_secs: 180,
            stop_secs: 90,
            restart_secs: 180,
            build_secs: 1200,
            probe_secs: 15,
            logs_secs: 15,
            grace_secs: 10,
        }
    }
}

impl TimeoutConfig {
    /// Budget for one lifecycle action.
    #[must_use]
    pub fn for_action(&self, kind: ActionKind) -> Duration {
        Duration::from_secs(match kind {
            ActionKind::Start => self.start_secs,
            ActionKind::Stop => self.stop_secs,
            ActionKind::Restart => self.restart_secs,
            ActionKind::Build => self.build_secs,
        })
    }

    #[must_use]
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    #[must_use]
    pub fn logs(&self) -> Duration {
        Duration::from_secs(self.logs_secs)
    }

    #[must_use]
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}

/// Resource bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Lifecycle processes allowed to run at once across all services.
    pub max_concurrent_processes: usize,
    /// Probes in flight at once during multi-service aggregation.
    pub probe_parallelism: usize,
    /// Bytes of stdout and of stderr retained per process.
    pub output_cap_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_processes: 4,
            probe_parallelism: 4,
            output_cap_bytes: 256 * 1024,
        }
    }
}

/// Log tail sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogsConfig {
    /// Used when the caller does not ask for a line count.
    pub default_lines: usize,
    pub max_lines: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            default_lines: 100,
            max_lines: 1000,
        }
    }
}

impl LogsConfig {
    /// Clamp a caller-supplied line count into `[1, max_lines]`.
    ///
    /// A missing count uses `default_lines`; zero and negative counts behave
    /// as a request for a single line.
    #[must_use]
    pub fn clamp(&self, requested: Option<i64>) -> usize {
        let max = self.max_lines.max(1);
        match requested {
            None => self.default_lines.clamp(1, max),
            Some(n) if n < 1 => 1,
            Some(n) => usize::try_from(n).map_or(max, |n| n.min(max)),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Upper bound for any configured timeout: one week.
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Smallest capture cap that still holds a `compose ps` listing.
pub const MIN_OUTPUT_CAP_BYTES: usize = 4 * 1024;

impl OrchestratorConfig {
    /// Reject configurations that would deadlock or disable a bound.
    ///
    /// # Errors
    ///
    /// Returns the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        let nonzero: [(&'static str, u64); 10] = [
            ("timeouts.start_secs", self.timeouts.start_secs),
            ("timeouts.stop_secs", self.timeouts.stop_secs),
            ("timeouts.restart_secs", self.timeouts.restart_secs),
            ("timeouts.build_secs", self.timeouts.build_secs),
            ("timeouts.probe_secs", self.timeouts.probe_secs),
            ("timeouts.logs_secs", self.timeouts.logs_secs),
            (
                "limits.max_concurrent_processes",
                self.limits.max_concurrent_processes as u64,
            ),
            ("limits.probe_parallelism", self.limits.probe_parallelism as u64),
            ("limits.output_cap_bytes", self.limits.output_cap_bytes as u64),
            ("logs.max_lines", self.logs.max_lines as u64),
        ];
        if let Some((key, _)) = nonzero.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero { key: *key });
        }
        let timeouts = [
            ("timeouts.start_secs", self.timeouts.start_secs),
            ("timeouts.stop_secs", self.timeouts.stop_secs),
            ("timeouts.restart_secs", self.timeouts.restart_secs),
            ("timeouts.build_secs", self.timeouts.build_secs),
            ("timeouts.probe_secs", self.timeouts.probe_secs),
            ("timeouts.logs_secs", self.timeouts.logs_secs),
            ("timeouts.grace_secs", self.timeouts.grace_secs),
        ];
        if let Some((key, _)) = timeouts.iter().find(|(_, v)| *v > MAX_TIMEOUT_SECS) {
            return Err(ConfigError::TooLarge {
                key: *key,
                max: MAX_TIMEOUT_SECS,
            });
        }
        if self.limits.output_cap_bytes < MIN_OUTPUT_CAP_BYTES {
            return Err(ConfigError::TooSmall {
                key: "limits.output_cap_bytes",
                min: MIN_OUTPUT_CAP_BYTES as u64,
            });
        }
        if self.logs.default_lines > self.logs.max_lines {
            return Err(ConfigError::DefaultExceedsMax {
                default: self.logs.default_lines,
                max: self.logs.max_lines,
            });
        }
        Ok(())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
