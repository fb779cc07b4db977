//! Shared test helpers: a scripted `CommandRunner` and project fixtures.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use dockyard_cli::application::{CapturedRun, CommandRunner, Orchestrator, RunLimits, RunOutcome};
use dockyard_cli::domain::OrchestratorConfig;
use dockyard_cli::infra::FsServiceRegistry;
use tempfile::TempDir;

// ── Scripted responses ───────────────────────────────────────────────────────

/// What the fake runtime does for one invocation.
#[derive(Debug, Clone)]
pub enum Script {
    /// Exit with `code` after `delay`, unless the delay exceeds the timeout.
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
        delay: Duration,
    },
    /// The runtime binary cannot be spawned.
    SpawnError(String),
}

impl Script {
    pub fn ok(stdout: &str) -> Self {
        Self::Exit {
            code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        Self::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self::Exit {
            code: 0,
            stdout: String::new(),
            stderr: String::new(),
            delay,
        }
    }
}

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub limits: RunLimits,
}

impl Call {
    /// Compose subcommand (`up`, `stop`, `build`, `ps`, `logs`).
    pub fn subcommand(&self) -> &str {
        self.args.get(3).map_or("", String::as_str)
    }

    /// Name of the directory the command ran in.
    pub fn service_dir(&self) -> String {
        dir_name(&self.cwd)
    }
}

#[derive(Default)]
struct State {
    calls: Mutex<Vec<Call>>,
    scripts: Mutex<HashMap<(Option<String>, String), Script>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

/// `CommandRunner` that answers from a script table and records every call.
///
/// Scripts are keyed by compose subcommand, optionally narrowed to one
/// service directory. Unscripted calls exit 0 with no output. Clones share
/// state, so a test can keep a handle after moving one into the orchestrator.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    state: Arc<State>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, subcommand: &str, script: Script) -> &Self {
        self.state
            .scripts
            .lock()
            .unwrap()
            .insert((None, subcommand.to_string()), script);
        self
    }

    pub fn on_service(&self, service: &str, subcommand: &str, script: Script) -> &Self {
        self.state
            .scripts
            .lock()
            .unwrap()
            .insert((Some(service.to_string()), subcommand.to_string()), script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, subcommand: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.subcommand() == subcommand)
            .collect()
    }

    /// Highest number of invocations that were running at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.state.max_active.load(Ordering::SeqCst)
    }

    fn script_for(&self, service: &str, subcommand: &str) -> Script {
        let scripts = self.state.scripts.lock().unwrap();
        scripts
            .get(&(Some(service.to_string()), subcommand.to_string()))
            .or_else(|| scripts.get(&(None, subcommand.to_string())))
            .cloned()
            .unwrap_or_else(|| Script::ok(""))
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run_supervised(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        limits: &RunLimits,
    ) -> Result<CapturedRun> {
        let call = Call {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            cwd: cwd.to_path_buf(),
            limits: *limits,
        };
        let script = self.script_for(&call.service_dir(), call.subcommand());
        self.state.calls.lock().unwrap().push(call);

        let (code, stdout, stderr, delay) = match script {
            Script::SpawnError(msg) => anyhow::bail!("failed to spawn {program}: {msg}"),
            Script::Exit {
                code,
                stdout,
                stderr,
                delay,
            } => (code, stdout, stderr, delay),
        };

        let now = self.state.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_active.fetch_max(now, Ordering::SeqCst);
        let _active = ActiveGuard(&self.state.active);

        let started = Instant::now();
        let outcome = if delay > limits.timeout {
            tokio::time::sleep(limits.timeout).await;
            RunOutcome::TimedOut
        } else {
            tokio::time::sleep(delay).await;
            RunOutcome::Exited(Some(code))
        };

        Ok(CapturedRun {
            outcome,
            stdout: stdout.into_bytes(),
            stderr: stderr.into_bytes(),
            truncated: false,
            elapsed: started.elapsed(),
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Temporary project with one compose service directory per name.
pub fn project(services: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in services {
        let svc = dir.path().join(name);
        std::fs::create_dir_all(&svc).unwrap();
        std::fs::write(svc.join("compose.yaml"), "services: {}\n").unwrap();
    }
    dir
}

pub type TestOrchestrator = Orchestrator<FsServiceRegistry, ScriptedRunner>;

pub fn orchestrator(runner: &ScriptedRunner) -> TestOrchestrator {
    orchestrator_with(runner, OrchestratorConfig::default())
}

pub fn orchestrator_with(runner: &ScriptedRunner, config: OrchestratorConfig) -> TestOrchestrator {
    Orchestrator::new(FsServiceRegistry::new(), runner.clone(), config)
}

/// One `compose ps --format json` row.
pub fn ps_row(service: &str, state: &str, health: &str) -> String {
    format!(
        r#"{{"Name":"{service}-1","Service":"{service}","State":"{state}","Health":"{health}","Status":"","ExitCode":0}}"#
    )
}

pub fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub const DAEMON_DOWN: &str =
    "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?";
