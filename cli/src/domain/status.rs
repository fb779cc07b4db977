//! Normalization of runtime container states into `ServiceState`.
//!
//! The runtime's native vocabulary is mapped through the constant tables
//! below; tune them here rather than in the probe logic.

use dockyard_common::{ContainerInfo, ServiceState};
use serde::Deserialize;

/// Raw states that count as a cleanly stopped container.
pub const STOPPED_STATES: &[&str] = &["created", "exited", "paused", "removing"];

/// Raw states that indicate a broken container.
pub const ERROR_STATES: &[&str] = &["dead"];

/// Fragments of runtime stderr that mean the daemon itself is unreachable.
pub const UNREACHABLE_MARKERS: &[&str] = &[
    "cannot connect to the docker daemon",
    "is the docker daemon running",
    "error during connect",
    "permission denied while trying to connect",
];

/// One row of `compose ps --format json`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ComposeContainer {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Service")]
    pub service: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Health")]
    pub health: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "ExitCode")]
    pub exit_code: Option<i32>,
}

impl ComposeContainer {
    /// Convert into the wire type, normalizing the state.
    #[must_use]
    pub fn into_info(self) -> ContainerInfo {
        let state = map_container_state(&self.state, &self.health);
        ContainerInfo {
            name: self.name,
            service: self.service,
            raw_state: self.state,
            health: (!self.health.is_empty()).then_some(self.health),
            status: self.status,
            exit_code: self.exit_code,
            state,
        }
    }
}

/// Map a runtime state plus health into the internal enum.
#[must_use]
pub fn map_container_state(raw_state: &str, health: &str) -> ServiceState {
    let state = raw_state.trim().to_ascii_lowercase();
    let health = health.trim().to_ascii_lowercase();
    match state.as_str() {
        "running" => match health.as_str() {
            "starting" => ServiceState::Starting,
            "unhealthy" => ServiceState::Error,
            _ => ServiceState::Running,
        },
        "restarting" => ServiceState::Restarting,
        s if STOPPED_STATES.contains(&s) => ServiceState::Stopped,
        s if ERROR_STATES.contains(&s) => ServiceState::Error,
        _ => ServiceState::Unknown,
    }
}

fn precedence(state: ServiceState) -> u8 {
    match state {
        ServiceState::Error => 6,
        ServiceState::Restarting => 5,
        ServiceState::Building | ServiceState::Starting => 4,
        ServiceState::Running => 3,
        ServiceState::Stopped => 2,
        ServiceState::Unknown => 1,
    }
}

/// Fold the states of a service's containers into a single state.
///
/// No containers means the service was never started (or was removed), which
/// reports as `Stopped`.
#[must_use]
pub fn aggregate_state(containers: &[ContainerInfo]) -> ServiceState {
    containers
        .iter()
        .map(|c| c.state)
        .max_by_key(|s| precedence(*s))
        .unwrap_or(ServiceState::Stopped)
}

/// Parse the output of `compose ps --format json`.
///
/// Older runtimes print a single JSON array; newer ones print one object per
/// line. Both are accepted.
///
/// # Errors
///
/// Returns the serde error for the first malformed document.
pub fn parse_ps_output(stdout: &str) -> Result<Vec<ComposeContainer>, serde_json::Error> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(serde_json::from_str)
        .collect()
}

/// Returns `true` when runtime stderr says the daemon cannot be reached.
#[must_use]
pub fn indicates_runtime_unreachable(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    UNREACHABLE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Overlay the state of an in-flight action on top of what the runtime reports.
///
/// The runtime has no notion of "being built"; while a lifecycle action runs
/// its transitional state wins, except over a hard runtime error.
#[must_use]
pub fn overlay_in_flight(runtime: ServiceState, in_flight: Option<ServiceState>) -> ServiceState {
    match in_flight {
        Some(transitional) if runtime != ServiceState::Error => transitional,
        _ => runtime,
    }
}
