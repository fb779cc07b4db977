//! `dockyard start|stop|build|restart <service>`

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use dockyard_common::ActionKind;

use crate::app::AppContext;
use crate::output::progress;

/// Arguments shared by the lifecycle commands.
#[derive(Args)]
pub struct ServiceArgs {
    /// Service name (a directory of the project holding a compose file)
    pub service: String,
}

/// Run one lifecycle action and render its outcome.
///
/// # Errors
///
/// Returns an error when the action could not run at all (invalid name,
/// unknown service, busy service, no process slot, runtime missing).
pub async fn run(app: &AppContext, kind: ActionKind, args: &ServiceArgs) -> Result<ExitCode> {
    let spinner = (app.output.show_progress() && !app.is_json())
        .then(|| progress::spinner(&format!("{} {}", progress_verb(kind), args.service)));

    let outcome = app
        .orchestrator
        .perform(&app.project, &args.service, kind)
        .await;
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let result = outcome?;
    app.renderer().render_action(&result)?;
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn progress_verb(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Start => "Starting",
        ActionKind::Stop => "Stopping",
        ActionKind::Build => "Building",
        ActionKind::Restart => "Restarting",
    }
}
