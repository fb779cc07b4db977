//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::time::Duration;

use dockyard_common::{ActionKind, ErrorKind};
use thiserror::Error;

// ── Service errors ────────────────────────────────────────────────────────────

/// Errors surfaced by the orchestration facade.
///
/// None of these are retried internally: every operation executes at most once.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Rejected service '{name}': {reason}")]
    Security { name: String, reason: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Service '{0}' already has a lifecycle action in progress.")]
    Busy(String),

    #[error("{action} of '{service}' timed out after {}s", .after.as_secs())]
    Timeout {
        service: String,
        action: ActionKind,
        after: Duration,
    },

    #[error("{action} of '{service}' failed (exit code {})\n{diagnostic}", exit_code_display(.exit_code))]
    Failed {
        service: String,
        action: ActionKind,
        exit_code: Option<i32>,
        diagnostic: String,
    },

    #[error("Container runtime unavailable: {0}")]
    RuntimeUnavailable(String),
}

#[allow(clippy::ref_option)]
fn exit_code_display(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl ServiceError {
    pub fn security(name: &str, reason: impl Into<String>) -> Self {
        Self::Security {
            name: name.escape_debug().to_string(),
            reason: reason.into(),
        }
    }

    /// Transport-level classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Security { .. } => ErrorKind::SecurityError,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Busy(_) => ErrorKind::Busy,
            ServiceError::Timeout { .. } => ErrorKind::Timeout,
            ServiceError::Failed { .. } => ErrorKind::Failed,
            ServiceError::RuntimeUnavailable(_) => ErrorKind::RuntimeUnavailable,
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to orchestrator configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: must be greater than zero")]
    Zero { key: &'static str },

    #[error("Invalid value for {key}: must be at most {max}")]
    TooLarge { key: &'static str, max: u64 },

    #[error("Invalid value for {key}: must be at least {min}")]
    TooSmall { key: &'static str, min: u64 },

    #[error("Invalid value for logs.default_lines: {default} exceeds logs.max_lines ({max})")]
    DefaultExceedsMax { default: usize, max: usize },

    #[error("Invalid value for runtime.program: must not be empty")]
    EmptyProgram,
}
