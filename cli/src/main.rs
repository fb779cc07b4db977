//! Dockyard CLI - lifecycle control for docker compose services

use std::process::ExitCode;

use clap::Parser;
use dockyard_cli::cli::Cli;
use dockyard_cli::domain::ServiceError;
use dockyard_cli::output::json::format_error;
use tracing_subscriber::EnvFilter;

/// Filter variable checked before `RUST_LOG`.
const LOG_ENV: &str = "DOCKYARD_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            report(&e, json);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(e: &anyhow::Error, json: bool) {
    if !json {
        eprintln!("Error: {e:#}");
        return;
    }
    let code = e
        .downcast_ref::<ServiceError>()
        .map_or("error", |err| err.kind().code());
    match format_error(&format!("{e:#}"), code) {
        Ok(obj) => println!("{obj}"),
        Err(_) => eprintln!("Error: {e:#}"),
    }
}
