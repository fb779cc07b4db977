//! `dockyard status [service]`

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Only report this service
    pub service: Option<String>,
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the project root or the named service cannot be
/// resolved. Runtime problems are reported as an `unknown` state instead.
pub async fn run(app: &AppContext, args: &StatusArgs) -> Result<ExitCode> {
    match &args.service {
        Some(name) => {
            let status = app
                .orchestrator
                .get_service_status(&app.project, name)
                .await?;
            app.renderer().render_status(&status)?;
        }
        None => {
            let statuses = app
                .orchestrator
                .get_all_services_status(&app.project)
                .await?;
            app.renderer().render_statuses(&app.project, &statuses)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
