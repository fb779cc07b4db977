//! `dockyard config`: show the effective configuration.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ConfigStore;

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the configuration path cannot be determined.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let path = app.config_store.path()?;
    app.renderer()
        .render_config(app.orchestrator.config(), &path)?;
    Ok(ExitCode::SUCCESS)
}
