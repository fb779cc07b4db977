//! Application service: tail a service's combined container logs.

use tracing::debug;

use crate::application::ports::{CommandRunner, RunLimits, RunOutcome};
use crate::domain::capture::tail_lines;
use crate::domain::compose::logs_argv;
use crate::domain::{OrchestratorConfig, ResolvedService, ServiceError};

use super::executor::DIAGNOSTIC_LINES;

/// Fetch at most `requested` recent log lines, oldest first.
///
/// The count is clamped by `LogsConfig::clamp`. A service with no output
/// yields an empty list.
///
/// # Errors
///
/// `ServiceError::RuntimeUnavailable` when the runtime cannot be launched,
/// times out, or exits nonzero.
pub async fn collect(
    runner: &impl CommandRunner,
    config: &OrchestratorConfig,
    service: &ResolvedService,
    requested: Option<i64>,
) -> Result<Vec<String>, ServiceError> {
    let lines = config.logs.clamp(requested);
    let argv = logs_argv(&service.descriptor, lines);
    let args: Vec<&str> = argv.iter().map(String::as_str).collect();
    let limits = RunLimits {
        timeout: config.timeouts.logs(),
        grace: config.timeouts.grace(),
        output_cap: config.limits.output_cap_bytes,
    };

    debug!(service = %service.name, lines, "fetching logs");
    let run = runner
        .run_supervised(&config.runtime.program, &args, &service.directory, &limits)
        .await
        .map_err(|e| {
            ServiceError::RuntimeUnavailable(format!(
                "failed to launch '{}': {e:#}",
                config.runtime.program
            ))
        })?;

    match run.outcome {
        RunOutcome::Exited(Some(0)) => Ok(tail_lines(&run.stdout_lossy(), lines, run.truncated)),
        RunOutcome::TimedOut => Err(ServiceError::RuntimeUnavailable(format!(
            "log query timed out after {}s",
            config.timeouts.logs().as_secs()
        ))),
        RunOutcome::Exited(_) => Err(ServiceError::RuntimeUnavailable(
            run.stderr_tail(DIAGNOSTIC_LINES),
        )),
    }
}
