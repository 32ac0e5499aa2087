//! Timed execution of remediation commands.
//!
//! [`run`] starts one command line under `/bin/sh -c` and enforces its
//! wall-clock timeout. A command still running when the timeout fires is
//! killed together with its process group and reaped. The outcome is
//! logged here and returned for the dispatcher's sink; nothing in the
//! watch loop waits for it.

use std::fmt;
use std::process::Stdio;
use std::time::{Duration, Instant};

use eir_core::Command;

/// Shell used to interpret command lines.
const SHELL: &str = "/bin/sh";

/// How a command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Dry run: nothing was executed.
    DryRun,
    /// Exited with status 0.
    Succeeded { elapsed_ms: u64 },
    /// Exited with a non-zero status (`-1` if killed by a signal).
    Failed { exit_code: i32, elapsed_ms: u64 },
    /// Still running when the timeout fired; killed.
    TimedOut { timeout: Duration },
    /// The process could not be started.
    SpawnFailed(String),
    /// The process started but waiting for it failed.
    WaitFailed(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::DryRun | Self::Succeeded { .. })
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => write!(f, "dry run"),
            Self::Succeeded { elapsed_ms } => write!(f, "succeeded after {elapsed_ms}ms"),
            Self::Failed {
                exit_code,
                elapsed_ms,
            } => write!(f, "failed with exit code {exit_code} after {elapsed_ms}ms"),
            Self::TimedOut { timeout } => {
                write!(f, "killed after exceeding {}s timeout", timeout.as_secs())
            }
            Self::SpawnFailed(e) => write!(f, "could not be started: {e}"),
            Self::WaitFailed(e) => write!(f, "could not be waited on: {e}"),
        }
    }
}

/// Execute `command`, killing it if it outlives its timeout.
///
/// With `dry_run` the intent is logged and nothing runs.
pub async fn run(command: &Command, dry_run: bool) -> CommandOutcome {
    let timeout = command.timeout();
    let line = command.command_line.as_str();

    if dry_run {
        tracing::debug!(
            command = line,
            timeout_secs = timeout.as_secs(),
            "Would have executed command (dry run)"
        );
        return CommandOutcome::DryRun;
    }

    tracing::debug!(command = line, timeout_secs = timeout.as_secs(), "Executing command");

    let mut cmd = tokio::process::Command::new(SHELL);
    cmd.arg("-c")
        .arg(line)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    // Own process group, so a timeout also reaches whatever the shell started.
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(command = line, error = %e, "Could not start command");
            return CommandOutcome::SpawnFailed(e.to_string());
        }
    };

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            if status.success() {
                tracing::info!(command = line, elapsed_ms, "Command succeeded");
                CommandOutcome::Succeeded { elapsed_ms }
            } else {
                let exit_code = status.code().unwrap_or(-1);
                tracing::error!(command = line, exit_code, elapsed_ms, "Command failed");
                CommandOutcome::Failed {
                    exit_code,
                    elapsed_ms,
                }
            }
        }
        Ok(Err(e)) => {
            tracing::error!(command = line, error = %e, "Could not wait for command");
            CommandOutcome::WaitFailed(e.to_string())
        }
        Err(_elapsed) => {
            kill_process_group(&child);
            if let Err(e) = child.kill().await {
                tracing::error!(command = line, error = %e, "Could not kill timed out command");
            }
            tracing::warn!(
                command = line,
                timeout_secs = timeout.as_secs(),
                "Killed command because timeout exceeded"
            );
            CommandOutcome::TimedOut { timeout }
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &tokio::process::Child) {}

/// SIGKILL the child's process group (the child is its leader).
#[cfg(unix)]
fn kill_process_group(child: &tokio::process::Child) {
    if let Some(pid) = child.id() {
        // Safety: killpg has no memory-safety preconditions; a stale pgid
        // only makes it fail with ESRCH.
        let ret = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if ret != 0 {
            tracing::debug!(pid, "Process group already gone");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
