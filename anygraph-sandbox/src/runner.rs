//! Sandbox runner - one isolated process per execution.
//!
//! The process strategy: materialize the snippet into a private scratch
//! directory, run the interpreter there as the leader of its own process
//! group with rlimits in place, and wait under a hard deadline. On timeout
//! the whole group is killed, so children spawned by the snippet die with
//! it. The scratch directory is removed on every path via `TempDir` drop.

use crate::limits::ResourceLimits;
use crate::types::RawOutcome;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Name of the materialized source file inside the scratch directory.
const SCRIPT_FILE: &str = "analysis.py";

/// Faults in the execution environment, as opposed to faults in the code.
/// The normalizer maps these to `FailureKind::InfrastructureUnavailable`.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to prepare scratch directory: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("failed to launch interpreter '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for interpreter: {0}")]
    Wait(#[source] std::io::Error),
}

/// Runner abstraction for executing one snippet in isolation.
///
/// One call is one execution attempt: no retries, exactly one outcome, and
/// the sandbox instance fully torn down before the call returns. The
/// timeout parameter is the only cancellation mechanism; an on-demand
/// cancel would be an additional parameter with the same `timed_out`
/// outcome, not a contract change.
#[async_trait]
pub trait SandboxRunner: Send + Sync {
    async fn run(&self, source_code: &str, timeout: Duration) -> Result<RawOutcome, RunnerError>;

    /// Runner name for log fields and diagnostics
    fn name(&self) -> &str;
}

/// Process-based runner - executes snippets with a local interpreter.
pub struct ProcessRunner {
    interpreter: String,
    limits: ResourceLimits,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            interpreter: "python3".to_string(),
            limits: ResourceLimits::default(),
        }
    }

    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            limits: ResourceLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SandboxRunner for ProcessRunner {
    async fn run(&self, source_code: &str, timeout: Duration) -> Result<RawOutcome, RunnerError> {
        let started = Instant::now();

        // Preparing: a uniquely-named scratch directory owned by this
        // execution alone. Dropping it removes the tree, so cleanup is
        // reached on every return path below.
        let scratch = tempfile::Builder::new()
            .prefix("anygraph-exec-")
            .tempdir()
            .map_err(RunnerError::Workspace)?;
        let script_path = scratch.path().join(SCRIPT_FILE);
        tokio::fs::write(&script_path, source_code)
            .await
            .map_err(RunnerError::Workspace)?;

        let mut command = Command::new(&self.interpreter);
        command
            .arg(&script_path)
            .current_dir(scratch.path())
            .env("TMPDIR", scratch.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            // Child leads its own process group, so a timeout kill reaches
            // every descendant, not just the interpreter.
            command.process_group(0);

            let limits = self.limits.clone();
            // SAFETY: apply_to_current_process only issues setrlimit,
            // which is async-signal-safe.
            unsafe {
                command.pre_exec(move || limits.apply_to_current_process());
            }
        }

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            interpreter: self.interpreter.clone(),
            source,
        })?;

        // pid doubles as the pgid because of process_group(0); captured
        // before wait() consumes it.
        let group = child.id().map(|pid| pid as i32);

        // Drain both streams concurrently while waiting, so a snippet that
        // fills a pipe buffer cannot deadlock the wait, and partial output
        // survives a kill.
        let stdout_task = drain_pipe(child.stdout.take());
        let stderr_task = drain_pipe(child.stderr.take());

        let mut timed_out = false;
        let exit_code = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => status.code(),
            Ok(Err(err)) => {
                kill_group(group);
                let _ = child.kill().await;
                return Err(RunnerError::Wait(err));
            }
            Err(_) => {
                tracing::warn!(
                    interpreter = %self.interpreter,
                    timeout_secs = timeout.as_secs(),
                    "Execution deadline elapsed, killing process group"
                );
                timed_out = true;
                kill_group(group);
                let _ = child.kill().await;
                None
            }
        };

        // Sweep the group on the natural-exit path too: a background child
        // left behind by the snippet would outlive the run and hold the
        // output pipes open.
        kill_group(group);

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        Ok(RawOutcome {
            exit_code,
            stdout,
            stderr,
            elapsed: started.elapsed(),
            timed_out,
        })
    }

    fn name(&self) -> &str {
        "process"
    }
}

/// Collect a pipe to EOF on a background task. The task ends once every
/// write end is closed, which the group kill guarantees on timeout.
fn drain_pipe<R>(pipe: Option<R>) -> tokio::task::JoinHandle<String>
where
    R: AsyncReadExt + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// SIGKILL an entire process group. A plain `child.kill()` would stop only
/// the interpreter and leave grandchildren running.
#[cfg(unix)]
fn kill_group(group: Option<i32>) {
    let Some(pid) = group else { return };
    // SAFETY: signalling a group we created; negative pid targets the group.
    let rc = unsafe { libc::kill(-pid, libc::SIGKILL) };
    if rc == -1 {
        let errno = std::io::Error::last_os_error();
        // ESRCH means every member already exited
        if errno.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pid, error = %errno, "SIGKILL to process group failed");
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_group: Option<i32>) {}
