//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` runs each command in its own process group so that a
//! timeout can terminate the runtime CLI together with anything it forked.

use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::{debug, warn};

use crate::application::ports::{CapturedRun, CommandRunner, RunLimits, RunOutcome};
use crate::domain::capture::BoundedBuffer;

/// How long to keep draining pipes after the process itself has ended.
const DRAIN_WAIT: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 8 * 1024;

/// Production `CommandRunner`.
///
/// On timeout the process group receives SIGTERM, then SIGKILL once the grace
/// period has elapsed. Children are spawned with `kill_on_drop`, so dropping
/// the returned future also kills the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run_supervised(
        &self,
        program: &str,
        args: &[&str],
        cwd: &std::path::Path,
        limits: &RunLimits,
    ) -> Result<CapturedRun> {
        let started = Instant::now();
        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        let mut group = GroupGuard::new(&child);
        debug!(program, pid = child.id(), dir = %cwd.display(), "spawned");

        let stdout = Arc::new(Mutex::new(BoundedBuffer::new(limits.output_cap)));
        let stderr = Arc::new(Mutex::new(BoundedBuffer::new(limits.output_cap)));
        let mut stdout_task = child
            .stdout
            .take()
            .map(|pipe| tokio::spawn(drain(pipe, Arc::clone(&stdout))));
        let mut stderr_task = child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(drain(pipe, Arc::clone(&stderr))));

        let outcome = tokio::select! {
            status = child.wait() => {
                RunOutcome::Exited(status.with_context(|| format!("waiting for {program}"))?.code())
            }
            () = tokio::time::sleep(limits.timeout) => {
                warn!(program, timeout_secs = limits.timeout.as_secs(), "timed out, terminating");
                terminate(&mut child, limits.grace).await;
                RunOutcome::TimedOut
            }
        };
        group.disarm();

        // Grandchildren can keep a pipe open after the leader is gone.
        let drained = async {
            if let Some(task) = stdout_task.as_mut() {
                let _ = task.await;
            }
            if let Some(task) = stderr_task.as_mut() {
                let _ = task.await;
            }
        };
        if tokio::time::timeout(DRAIN_WAIT, drained).await.is_err() {
            for task in [stdout_task, stderr_task].into_iter().flatten() {
                task.abort();
            }
        }

        let stdout = take(&stdout);
        let stderr = take(&stderr);
        let elapsed = started.elapsed();
        debug!(program, ?outcome, elapsed_ms = elapsed.as_millis(), "finished");

        Ok(CapturedRun {
            outcome,
            truncated: stdout.is_truncated() || stderr.is_truncated(),
            stdout: stdout.into_bytes(),
            stderr: stderr.into_bytes(),
            elapsed,
        })
    }
}

/// Kills the child's whole process group if dropped while still armed.
///
/// `kill_on_drop` only reaches the group leader; this covers whatever the
/// runtime CLI forked when the owning future is cancelled mid-run.
struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    fn new(child: &Child) -> Self {
        Self { pgid: child.id() }
    }

    /// The leader has been reaped or the group already terminated.
    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        #[cfg(unix)]
        if let Ok(raw) = i32::try_from(pgid) {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            debug!(pgid, "cancelled, killing process group");
            let _ = killpg(Pid::from_raw(raw), Signal::SIGKILL);
        }
        #[cfg(not(unix))]
        debug!(pgid, "cancelled, leader killed on drop");
    }
}

async fn drain<R: AsyncRead + Unpin>(mut pipe: R, sink: Arc<Mutex<BoundedBuffer>>) {
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => lock(&sink).extend(&chunk[..n]),
        }
    }
}

fn lock(sink: &Mutex<BoundedBuffer>) -> MutexGuard<'_, BoundedBuffer> {
    sink.lock().unwrap_or_else(PoisonError::into_inner)
}

fn take(sink: &Mutex<BoundedBuffer>) -> BoundedBuffer {
    std::mem::replace(&mut *lock(sink), BoundedBuffer::new(0))
}

/// SIGTERM the process group, wait up to `grace`, then SIGKILL.
async fn terminate(child: &mut Child, grace: Duration) {
    #[cfg(unix)]
    if let Some(pgid) = child.id().and_then(|id| i32::try_from(id).ok()) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let group = Pid::from_raw(pgid);
        if let Err(e) = killpg(group, Signal::SIGTERM) {
            debug!(pgid, "SIGTERM failed: {e}");
        }
        if tokio::time::timeout(grace, child.wait()).await.is_ok() {
            return;
        }
        warn!(pgid, "grace period elapsed, killing process group");
        let _ = killpg(group, Signal::SIGKILL);
    }
    let _ = child.kill().await;
}
