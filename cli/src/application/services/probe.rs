//! Application service: query the runtime for a service's current state.
//!
//! A probe never fails: every problem is folded into an `unknown` status
//! that carries a diagnostic message.

use chrono::Utc;
use dockyard_common::{ContainerInfo, ErrorKind, ServiceStatus};
use tracing::debug;

use crate::application::ports::{CommandRunner, RunLimits, RunOutcome};
use crate::domain::compose::{PS_ARGS, compose_argv};
use crate::domain::status::{ComposeContainer, aggregate_state, parse_ps_output};
use crate::domain::{OrchestratorConfig, ResolvedService};

use super::executor::DIAGNOSTIC_LINES;

/// Probe the runtime for `service` and normalize what it reports.
pub async fn probe(
    runner: &impl CommandRunner,
    config: &OrchestratorConfig,
    service: &ResolvedService,
) -> ServiceStatus {
    let argv = compose_argv(&service.descriptor, PS_ARGS);
    let args: Vec<&str> = argv.iter().map(String::as_str).collect();
    let limits = RunLimits {
        timeout: config.timeouts.probe(),
        grace: config.timeouts.grace(),
        output_cap: config.limits.output_cap_bytes,
    };

    let run = match runner
        .run_supervised(&config.runtime.program, &args, &service.directory, &limits)
        .await
    {
        Ok(run) => run,
        Err(e) => {
            return unreachable(service, format!("failed to launch runtime: {e:#}"));
        }
    };

    match run.outcome {
        RunOutcome::Exited(Some(0)) => {}
        RunOutcome::TimedOut => {
            return unreachable(
                service,
                format!(
                    "status query timed out after {}s",
                    config.timeouts.probe().as_secs()
                ),
            );
        }
        RunOutcome::Exited(_) => {
            let diagnostic = run.stderr_tail(DIAGNOSTIC_LINES);
            return unreachable(service, diagnostic);
        }
    }

    let rows = match parse_ps_output(&run.stdout_lossy()) {
        Ok(rows) => rows,
        Err(e) => {
            debug!(service = %service.name, "unparsable ps output: {e}");
            return ServiceStatus::unknown(&service.name, format!("unparsable runtime output: {e}"));
        }
    };

    let containers: Vec<ContainerInfo> = rows.into_iter().map(ComposeContainer::into_info).collect();
    let state = aggregate_state(&containers);
    debug!(service = %service.name, %state, containers = containers.len(), "probed");

    ServiceStatus {
        name: service.name.clone(),
        state,
        containers,
        last_checked: Utc::now(),
        message: None,
        error: None,
    }
}

fn unreachable(service: &ResolvedService, message: String) -> ServiceStatus {
    debug!(service = %service.name, "probe failed: {message}");
    ServiceStatus {
        error: Some(ErrorKind::RuntimeUnavailable),
        ..ServiceStatus::unknown(&service.name, message)
    }
}
