//! Argument vectors for the compose runtime.
//!
//! Commands are always built as argv elements; nothing here is ever joined
//! into a shell string. The service name never appears in an argument; the
//! runtime derives the project from the descriptor path.

use std::path::Path;

use dockyard_common::ActionKind;

/// Subcommand arguments for a lifecycle action, after `compose -f <file>`.
#[must_use]
pub fn action_args(kind: ActionKind) -> &'static [&'static str] {
    match kind {
        ActionKind::Start => &["up", "-d"],
        ActionKind::Stop => &["stop"],
        ActionKind::Build => &["build"],
        ActionKind::Restart => &["up", "-d", "--force-recreate"],
    }
}

/// Subcommand arguments listing every container of the project, stopped ones included.
pub const PS_ARGS: &[&str] = &["ps", "--all", "--format", "json"];

/// Full argv for `compose -f <descriptor> <subcommand...>`.
#[must_use]
pub fn compose_argv(descriptor: &Path, subcommand: &[&str]) -> Vec<String> {
    let mut argv = vec![
        "compose".to_string(),
        "-f".to_string(),
        descriptor.to_string_lossy().into_owned(),
    ];
    argv.extend(subcommand.iter().map(|s| (*s).to_string()));
    argv
}

/// Full argv for tailing the combined logs of a project.
#[must_use]
pub fn logs_argv(descriptor: &Path, lines: usize) -> Vec<String> {
    let tail = lines.to_string();
    compose_argv(descriptor, &["logs", "--no-color", "--tail", &tail])
}
