//! `dockyard logs <service>`

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::logs_response;

/// Arguments for the logs command.
#[derive(Args)]
pub struct LogsArgs {
    /// Service name
    pub service: String,

    /// Number of recent lines (values below 1 mean 1; capped by `logs.max_lines`)
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub lines: Option<i64>,
}

/// Run the logs command.
///
/// # Errors
///
/// Returns an error only if rendering fails; lookup and runtime failures
/// are rendered and reported through the exit code.
pub async fn run(app: &AppContext, args: &LogsArgs) -> Result<ExitCode> {
    let response = logs_response(
        app.orchestrator
            .get_service_logs(&app.project, &args.service, args.lines)
            .await,
    );

    if !response.success && !app.is_json() {
        let message = response.message.as_deref().unwrap_or("cannot read logs");
        app.output.error(message);
        return Ok(ExitCode::FAILURE);
    }

    app.renderer().render_logs(&response)?;
    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
