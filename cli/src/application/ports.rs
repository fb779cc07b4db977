//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::domain::capture::tail_lines;
use crate::domain::{OrchestratorConfig, ResolvedService, ServiceError};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Supervision bounds for one external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    /// Wall-clock budget before graceful termination starts.
    pub timeout: Duration,
    /// Wait between the termination signal and the forced kill.
    pub grace: Duration,
    /// Bytes retained per stream; older bytes are dropped.
    pub output_cap: usize,
}

/// How a supervised process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exited on its own. `None` when terminated by a signal.
    Exited(Option<i32>),
    /// Exceeded `RunLimits::timeout` and was terminated.
    TimedOut,
}

/// Bounded capture of a finished (or terminated) process.
#[derive(Debug, Clone)]
pub struct CapturedRun {
    pub outcome: RunOutcome,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `true` when either stream exceeded the capture cap.
    pub truncated: bool,
    pub elapsed: Duration,
}

impl CapturedRun {
    /// `true` only for a clean exit with code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcome == RunOutcome::Exited(Some(0))
    }

    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            RunOutcome::Exited(code) => code,
            RunOutcome::TimedOut => None,
        }
    }

    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Last `lines` lines of stderr, joined, for use as a diagnostic.
    #[must_use]
    pub fn stderr_tail(&self, lines: usize) -> String {
        tail_lines(&self.stderr_lossy(), lines, self.truncated).join("\n")
    }
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run `program` with an argument vector in `cwd`, capturing bounded output.
    ///
    /// Arguments are passed to the process verbatim; no shell is involved.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned. Timeouts and
    /// nonzero exits are reported through `CapturedRun::outcome`. On timeout
    /// the process must be terminated (not left orphaned).
    async fn run_supervised(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        limits: &RunLimits,
    ) -> Result<CapturedRun>;
}

// ── Service Registry Port ─────────────────────────────────────────────────────

/// Maps project roots and service names onto service directories.
pub trait ServiceRegistry {
    /// Resolve and validate one service of a project.
    ///
    /// # Errors
    ///
    /// `ServiceError::Security` for unsafe names or path escapes,
    /// `ServiceError::NotFound` when no service directory with a descriptor exists.
    fn resolve(&self, project_root: &Path, name: &str) -> Result<ResolvedService, ServiceError>;

    /// Names of every service the project contains, sorted.
    ///
    /// # Errors
    ///
    /// `ServiceError::NotFound` when the project root does not exist.
    fn discover(&self, project_root: &Path) -> Result<Vec<String>, ServiceError>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts where orchestrator configuration is loaded from.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored configuration cannot be read or parsed.
    fn load(&self) -> Result<OrchestratorConfig>;

    /// Location of the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
