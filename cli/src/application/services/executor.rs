//! Application service: run one lifecycle action against the runtime.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! The caller must already hold the service lock.

use std::time::Duration;

use dockyard_common::{ActionKind, ActionResult, ServiceState};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::application::ports::{CapturedRun, CommandRunner, RunLimits, RunOutcome};
use crate::domain::compose::{action_args, compose_argv};
use crate::domain::status::indicates_runtime_unreachable;
use crate::domain::{ActionPhase, ActionRequest, OrchestratorConfig, ResolvedService, ServiceError};

/// Stderr lines kept in a failure diagnostic.
pub const DIAGNOSTIC_LINES: usize = 20;

/// Execute `request` against `service`.
///
/// Waits for a process slot until the request deadline, then runs the
/// runtime command with whatever budget is left.
///
/// # Errors
///
/// Only for failures before a process ran: `ServiceError::Timeout` when no
/// slot frees up in time, `ServiceError::RuntimeUnavailable` when the runtime
/// cannot be launched. Failed and timed-out runs are reported in the
/// returned `ActionResult`.
pub async fn execute(
    runner: &impl CommandRunner,
    slots: &Semaphore,
    config: &OrchestratorConfig,
    service: &ResolvedService,
    request: &ActionRequest,
) -> Result<ActionResult, ServiceError> {
    let kind = request.kind;
    let budget = config.timeouts.for_action(kind);

    let Ok(Ok(_permit)) = tokio::time::timeout(request.remaining(), slots.acquire()).await else {
        warn!(service = %service.name, action = %kind, "no process slot before deadline");
        return Err(ServiceError::Timeout {
            service: service.name.clone(),
            action: kind,
            after: budget,
        });
    };

    let argv = compose_argv(&service.descriptor, action_args(kind));
    let args: Vec<&str> = argv.iter().map(String::as_str).collect();
    let limits = RunLimits {
        timeout: request.remaining(),
        grace: config.timeouts.grace(),
        output_cap: config.limits.output_cap_bytes,
    };

    debug!(
        service = %service.name,
        action = %kind,
        phase = %ActionPhase::Spawned,
        ?args,
        "spawning runtime"
    );
    let run = match runner
        .run_supervised(&config.runtime.program, &args, &service.directory, &limits)
        .await
    {
        Ok(run) => run,
        Err(e) => {
            warn!(
                service = %service.name,
                action = %kind,
                phase = %ActionPhase::CrashedOnSpawn,
                "{e:#}"
            );
            return Err(ServiceError::RuntimeUnavailable(format!(
                "failed to launch '{}': {e:#}",
                config.runtime.program
            )));
        }
    };

    Ok(into_result(service, kind, budget, run))
}

/// Fold a finished run into the action's outcome.
fn into_result(
    service: &ResolvedService,
    kind: ActionKind,
    budget: Duration,
    run: CapturedRun,
) -> ActionResult {
    let duration_ms = u64::try_from(run.elapsed.as_millis()).unwrap_or(u64::MAX);
    let (success, state, error, message) = match run.outcome {
        RunOutcome::Exited(Some(0)) => {
            info!(
                service = %service.name,
                action = %kind,
                phase = %ActionPhase::Succeeded,
                duration_ms,
                "action succeeded"
            );
            (true, kind.settled_state(), None, None)
        }
        RunOutcome::TimedOut => {
            warn!(
                service = %service.name,
                action = %kind,
                phase = %ActionPhase::TimedOut,
                duration_ms,
                "action timed out"
            );
            let err = ServiceError::Timeout {
                service: service.name.clone(),
                action: kind,
                after: budget,
            };
            (false, ServiceState::Unknown, Some(err.kind()), Some(err.to_string()))
        }
        RunOutcome::Exited(code) => {
            warn!(
                service = %service.name,
                action = %kind,
                phase = %ActionPhase::Failed,
                exit_code = ?code,
                duration_ms,
                "action failed"
            );
            let err = failure(service, kind, code, &run);
            (false, ServiceState::Unknown, Some(err.kind()), Some(err.to_string()))
        }
    };

    ActionResult {
        service: service.name.clone(),
        action: kind,
        success,
        state,
        exit_code: run.exit_code(),
        stdout: run.stdout_lossy(),
        stderr: run.stderr_lossy(),
        truncated: run.truncated,
        duration_ms,
        error,
        message,
    }
}

fn failure(
    service: &ResolvedService,
    kind: ActionKind,
    exit_code: Option<i32>,
    run: &CapturedRun,
) -> ServiceError {
    let diagnostic = run.stderr_tail(DIAGNOSTIC_LINES);
    if indicates_runtime_unreachable(&diagnostic) {
        return ServiceError::RuntimeUnavailable(diagnostic);
    }
    ServiceError::Failed {
        service: service.name.clone(),
        action: kind,
        exit_code,
        diagnostic,
    }
}
