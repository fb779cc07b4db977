//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dockyard_common::ActionKind;

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Lifecycle control for docker compose services
#[derive(Parser)]
#[command(
    name = "dockyard",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file
    #[arg(long, global = true, env = "DOCKYARD_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root holding one directory per service [default: current directory]
    #[arg(short, long, global = true, env = "DOCKYARD_PROJECT", value_name = "DIR")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start a service (compose up -d)
    Start(commands::action::ServiceArgs),

    /// Stop a service's containers
    Stop(commands::action::ServiceArgs),

    /// Build a service's images
    Build(commands::action::ServiceArgs),

    /// Recreate and start a service's containers
    Restart(commands::action::ServiceArgs),

    /// Show the status of one service or of the whole project
    Status(commands::status::StatusArgs),

    /// Show recent log lines of a service
    Logs(commands::logs::LogsArgs),

    /// Show the effective configuration
    Config,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be carried out at all.
    /// Actions that ran but failed are rendered and reported through the
    /// returned exit code.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            config,
            project,
            command,
        } = self;

        if let Command::Version = command {
            let output = OutputContext::new(no_color, quiet);
            let renderer = if json {
                Renderer::Json(JsonRenderer)
            } else {
                Renderer::Human(HumanRenderer::new(&output))
            };
            return commands::version::run(&renderer);
        }

        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            config,
            project,
        })?;

        match command {
            Command::Start(args) => commands::action::run(&app, ActionKind::Start, &args).await,
            Command::Stop(args) => commands::action::run(&app, ActionKind::Stop, &args).await,
            Command::Build(args) => commands::action::run(&app, ActionKind::Build, &args).await,
            Command::Restart(args) => commands::action::run(&app, ActionKind::Restart, &args).await,
            Command::Status(args) => commands::status::run(&app, &args).await,
            Command::Logs(args) => commands::logs::run(&app, &args).await,
            Command::Config => commands::config::run(&app),
            Command::Version => commands::version::run(&app.renderer()),
        }
    }
}
