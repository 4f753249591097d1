//! Tracked child processes
//!
//! Runs external commands one at a time, capturing their output, while
//! keeping a registry of in-flight children so the cancellation path can
//! kill them. The registry is shared between the sequential build loop and
//! the signal task, hence the mutex.

use std::collections::HashSet;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio_util::sync::CancellationToken;

use crate::error::BuildToolError;

/// Captured result of a finished child process
#[derive(Debug)]
pub struct CapturedOutput {
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Exit code; `None` when the child was killed by a signal
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    /// Whether the child exited cleanly
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Registry of in-flight child process ids
///
/// Insertion and removal happen on the build path; the cancellation path
/// reads it for diagnostics. Safe to touch from both.
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    pids: Arc<Mutex<HashSet<u32>>>,
}

impl ProcessRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, pid: u32) {
        if let Ok(mut pids) = self.pids.lock() {
            pids.insert(pid);
        }
    }

    fn remove(&self, pid: u32) {
        if let Ok(mut pids) = self.pids.lock() {
            pids.remove(&pid);
        }
    }

    /// Ids of currently tracked children
    pub fn tracked(&self) -> Vec<u32> {
        self.pids.lock().map(|pids| pids.iter().copied().collect()).unwrap_or_default()
    }
}

async fn slurp_stdout(pipe: Option<ChildStdout>) -> String {
    let mut text = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut text).await;
    }
    text
}

async fn slurp_stderr(pipe: Option<ChildStderr>) -> String {
    let mut text = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut text).await;
    }
    text
}

/// Run `command` to completion, tracking it in `registry`.
///
/// `env` entries are bound on the child's environment only. When `cancel`
/// fires the child is killed, the registry entry removed, and
/// [`BuildToolError::Cancelled`] returned.
pub async fn run_tracked(
    command: &[String],
    env: &[(String, String)],
    registry: &ProcessRegistry,
    cancel: &CancellationToken,
) -> Result<CapturedOutput, BuildToolError> {
    let (program, args) = command.split_first().ok_or_else(|| BuildToolError::Spawn {
        program: String::new(),
        error: "empty command".to_string(),
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null());
    for (key, value) in env {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().map_err(|error| BuildToolError::Spawn {
        program: program.clone(),
        error: error.to_string(),
    })?;

    let pid = child.id().unwrap_or_default();
    registry.insert(pid);

    // Drain both pipes concurrently with the wait so a chatty child cannot
    // fill a pipe buffer and deadlock.
    let stdout_task = tokio::spawn(slurp_stdout(child.stdout.take()));
    let stderr_task = tokio::spawn(slurp_stderr(child.stderr.take()));

    let status = tokio::select! {
        status = child.wait() => status,
        () = cancel.cancelled() => {
            tracing::error!("Killing build child pid={pid} due to termination signal");
            let _ = child.start_kill();
            let _ = child.wait().await;
            registry.remove(pid);
            return Err(BuildToolError::Cancelled);
        }
    };
    registry.remove(pid);

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();
    let status = status.map_err(|error| BuildToolError::Spawn {
        program: program.clone(),
        error: error.to_string(),
    })?;

    Ok(CapturedOutput {
        stdout,
        stderr,
        exit_code: status.code(),
    })
}
