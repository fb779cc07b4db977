//! Human-readable terminal renderer.

use std::path::Path;

use dockyard_common::{ActionKind, ActionResult, LogsResponse, ServiceStatus};
use owo_colors::OwoColorize as _;

use crate::domain::OrchestratorConfig;
use crate::output::{OutputContext, Styles};

/// Renders orchestrator results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.info(&format!("dockyard v{version}"));
    }

    /// Render the outcome of a lifecycle action.
    pub fn render_action(&self, result: &ActionResult) {
        if result.success {
            self.ctx.success(&action_summary(result));
            return;
        }
        let message = result
            .message
            .as_deref()
            .unwrap_or("action failed without a diagnostic");
        self.ctx.error(message);
        if result.truncated {
            self.ctx.warn("Output exceeded the capture limit; older lines were dropped.");
        }
    }

    /// Render the detailed status of one service.
    pub fn render_status(&self, status: &ServiceStatus) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header(&status.name);
        self.ctx.kv(
            "State:  ",
            &status.state.style(self.ctx.styles.for_state(status.state)).to_string(),
        );
        self.ctx.kv(
            "Checked:",
            &status.last_checked.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        if let Some(message) = &status.message {
            self.ctx.kv("Note:   ", message);
        }
        if status.containers.is_empty() {
            return;
        }
        println!();
        for container in &status.containers {
            let health = container
                .health
                .as_deref()
                .map(|h| format!(" [{h}]"))
                .unwrap_or_default();
            println!(
                "    {:<32} {:<11} {}{health}",
                container.name,
                container
                    .state
                    .style(self.ctx.styles.for_state(container.state))
                    .to_string(),
                container.status.style(self.ctx.styles.dim),
            );
        }
    }

    /// Render a one-line-per-service overview of a project.
    pub fn render_statuses(&self, project: &Path, statuses: &[ServiceStatus]) {
        if self.ctx.quiet {
            return;
        }
        if statuses.is_empty() {
            println!("No services found in {}.", project.display());
            return;
        }
        for status in statuses {
            println!("{}", status_row(&self.ctx.styles, status));
        }
    }

    /// Print log lines verbatim.
    pub fn render_logs(&self, response: &LogsResponse) {
        if response.lines.is_empty() {
            self.ctx.info("No log output.");
            return;
        }
        for line in &response.lines {
            println!("{line}");
        }
    }

    /// Render the effective configuration.
    pub fn render_config(&self, config: &OrchestratorConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<34} {}", "runtime.program:", config.runtime.program);
        let t = &config.timeouts;
        for (key, secs) in [
            ("timeouts.start_secs:", t.start_secs),
            ("timeouts.stop_secs:", t.stop_secs),
            ("timeouts.restart_secs:", t.restart_secs),
            ("timeouts.build_secs:", t.build_secs),
            ("timeouts.probe_secs:", t.probe_secs),
            ("timeouts.logs_secs:", t.logs_secs),
            ("timeouts.grace_secs:", t.grace_secs),
        ] {
            println!("  {key:<34} {secs}");
        }
        let l = &config.limits;
        for (key, value) in [
            ("limits.max_concurrent_processes:", l.max_concurrent_processes),
            ("limits.probe_parallelism:", l.probe_parallelism),
            ("limits.output_cap_bytes:", l.output_cap_bytes),
            ("logs.default_lines:", config.logs.default_lines),
            ("logs.max_lines:", config.logs.max_lines),
        ] {
            println!("  {key:<34} {value}");
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["DOCKYARD_CONFIG", "DOCKYARD_PROJECT", "DOCKYARD_LOG", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}

// ── Display helpers (used by tests and output layer) ─────────────────────────

/// `Started api (running) in 4.2s`
#[must_use]
pub fn action_summary(result: &ActionResult) -> String {
    format!(
        "{} {} ({}) in {}",
        past_tense(result.action),
        result.service,
        result.state,
        format_duration_ms(result.duration_ms)
    )
}

/// One overview line: name, styled state, container count, first line of any note.
#[must_use]
pub fn status_row(styles: &Styles, status: &ServiceStatus) -> String {
    let note = status.message.as_deref().unwrap_or_default();
    format!(
        "  {:<24} {:<11} {:<14} {}",
        status.name,
        status.state.style(styles.for_state(status.state)).to_string(),
        container_summary(status.containers.len()),
        first_line(note).style(styles.dim),
    )
}

#[must_use]
pub fn past_tense(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Start => "Started",
        ActionKind::Stop => "Stopped",
        ActionKind::Build => "Built",
        ActionKind::Restart => "Restarted",
    }
}

/// Compact duration: `850ms`, `4.2s`, `3m 07s`.
#[must_use]
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1_000 {
        return format!("{ms}ms");
    }
    if ms < 60_000 {
        return format!("{}.{}s", ms / 1_000, (ms % 1_000) / 100);
    }
    let secs = ms / 1_000;
    format!("{}m {:02}s", secs / 60, secs % 60)
}

#[must_use]
pub fn container_summary(count: usize) -> String {
    match count {
        0 => "no containers".to_string(),
        1 => "1 container".to_string(),
        n => format!("{n} containers"),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
