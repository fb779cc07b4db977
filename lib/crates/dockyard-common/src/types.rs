use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized lifecycle state of a service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    #[default]
    Unknown,
    Stopped,
    Building,
    Starting,
    Running,
    Restarting,
    Error,
}

impl ServiceState {
    /// Lowercase wire name, identical to the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceState::Unknown => "unknown",
            ServiceState::Stopped => "stopped",
            ServiceState::Building => "building",
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Restarting => "restarting",
            ServiceState::Error => "error",
        }
    }

    /// `true` for states that only exist while an action is in flight.
    #[must_use]
    pub fn is_transitional(self) -> bool {
        matches!(
            self,
            ServiceState::Building | ServiceState::Starting | ServiceState::Restarting
        )
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names neither a known state nor a known action.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized value '{0}'")]
pub struct ParseEnumError(pub String);

impl FromStr for ServiceState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" => Ok(ServiceState::Unknown),
            "stopped" => Ok(ServiceState::Stopped),
            "building" => Ok(ServiceState::Building),
            "starting" => Ok(ServiceState::Starting),
            "running" => Ok(ServiceState::Running),
            "restarting" => Ok(ServiceState::Restarting),
            "error" => Ok(ServiceState::Error),
            _ => Err(ParseEnumError(s.to_string())),
        }
    }
}

/// Lifecycle action that mutates a service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Start,
    Stop,
    Build,
    Restart,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Start,
        ActionKind::Stop,
        ActionKind::Build,
        ActionKind::Restart,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Start => "start",
            ActionKind::Stop => "stop",
            ActionKind::Build => "build",
            ActionKind::Restart => "restart",
        }
    }

    /// State the service is expected to settle in after the action exits 0.
    ///
    /// Advisory until confirmed by a status probe.
    #[must_use]
    pub fn settled_state(self) -> ServiceState {
        match self {
            ActionKind::Start | ActionKind::Restart => ServiceState::Running,
            ActionKind::Stop | ActionKind::Build => ServiceState::Stopped,
        }
    }

    /// State reported while the action is still running, if any.
    #[must_use]
    pub fn transitional_state(self) -> Option<ServiceState> {
        match self {
            ActionKind::Start => Some(ServiceState::Starting),
            ActionKind::Build => Some(ServiceState::Building),
            ActionKind::Restart => Some(ServiceState::Restarting),
            ActionKind::Stop => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError(s.to_string()))
    }
}

/// Error taxonomy exposed to the transport layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SecurityError,
    NotFound,
    Busy,
    Timeout,
    Failed,
    RuntimeUnavailable,
}

impl ErrorKind {
    /// HTTP status code the transport layer should answer with.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::SecurityError => 403,
            ErrorKind::Busy => 409,
            ErrorKind::Timeout => 504,
            ErrorKind::Failed => 500,
            ErrorKind::RuntimeUnavailable => 503,
        }
    }

    /// Stable machine-readable code, identical to the serde representation.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::SecurityError => "security_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Busy => "busy",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Failed => "failed",
            ErrorKind::RuntimeUnavailable => "runtime_unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One runtime container belonging to a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    /// Container name as reported by the runtime.
    pub name: String,
    /// Compose service the container was created for.
    #[serde(default)]
    pub service: String,
    /// Raw runtime state (`running`, `exited`, ...).
    pub raw_state: String,
    /// Health check result, when the container defines one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    /// Human status text (`Up 5 minutes`, `Exited (0) 2 hours ago`).
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Normalized state of this container.
    pub state: ServiceState,
}

/// Point-in-time view of a service, recomputed on every query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,
    pub state: ServiceState,
    #[serde(default)]
    pub containers: Vec<ContainerInfo>,
    pub last_checked: DateTime<Utc>,
    /// Diagnostic explaining an `unknown` state or a per-service failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set when the entry stands in for a per-service failure during aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl ServiceStatus {
    /// An `unknown` entry carrying a diagnostic.
    #[must_use]
    pub fn unknown(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ServiceState::Unknown,
            containers: Vec::new(),
            last_checked: Utc::now(),
            message: Some(message.into()),
            error: None,
        }
    }
}

/// Outcome of a single lifecycle action. Lives for one request/response cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub service: String,
    pub action: ActionKind,
    pub success: bool,
    pub state: ServiceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    /// `true` when the capture cap dropped older output.
    #[serde(default)]
    pub truncated: bool,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of the logs endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogsResponse {
    pub success: bool,
    pub lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LogsResponse {
    #[must_use]
    pub fn ok(lines: Vec<String>) -> Self {
        Self {
            success: true,
            lines,
            error: None,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            lines: Vec::new(),
            error: Some(kind),
            message: Some(message.into()),
        }
    }
}
