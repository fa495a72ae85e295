//! Command capture
//!
//! Runs a fixed introspection command and collects what it printed.
//!
//! Commands are described by [`CommandSpec`], which only holds `&'static`
//! data: the program and its argv are compile-time constants and are spawned
//! directly, never through a shell. Nothing derived from a request can reach
//! a command line.
//!
//! Every capture is bounded by [`CaptureLimits::timeout`]. Children are
//! spawned with `kill_on_drop`, so dropping an in-flight capture (deadline
//! elapsed, client went away, server shutting down) kills the process.

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;
const MIN_OUTPUT_BYTES: usize = 1024;

/// Process listing, as the page has always shown it.
pub const PROCESSES: CommandSpec = CommandSpec {
    id: "processes",
    label: "Processes",
    program: "ps",
    args: &["-ef"],
};

/// Filesystem space usage.
pub const DISK_USAGE: CommandSpec = CommandSpec {
    id: "disk-usage",
    label: "Disk usage",
    program: "df",
    args: &["-h"],
};

/// The commands captured for every snapshot, in display order.
pub fn default_commands() -> Vec<CommandSpec> {
    vec![PROCESSES, DISK_USAGE]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// Slot identifier, used as the HTML section id.
    pub id: &'static str,
    pub label: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl CommandSpec {
    /// The literal command line, for display and logging.
    pub fn command_line(&self) -> String {
        let mut line = self.program.to_string();
        for arg in self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl CaptureLimits {
    pub fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout: timeout.max(Duration::from_millis(1)),
            max_output_bytes: max_output_bytes.max(MIN_OUTPUT_BYTES),
        }
    }
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
            DEFAULT_MAX_OUTPUT_BYTES,
        )
    }
}

/// Output and status of one command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub command: String,
    pub output: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_status: Option<i32>,
    pub truncated: bool,
    pub elapsed_ms: u64,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("failed to run `{command}`: {reason}")]
    Execution { command: String, reason: String },
    #[error("`{command}` did not finish within {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },
}

impl CaptureError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Execution { .. } => "execution",
            Self::Timeout { .. } => "timeout",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Effectful seam between the snapshot handler and the operating system.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `spec` to completion. Deadlines are enforced by the caller, which
    /// drops this future once they elapse.
    async fn run(
        &self,
        spec: &CommandSpec,
        max_output_bytes: usize,
    ) -> Result<CommandResult, CaptureError>;
}

/// Spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        max_output_bytes: usize,
    ) -> Result<CommandResult, CaptureError> {
        let command = spec.command_line();
        let started = Instant::now();

        let mut child = Command::new(spec.program)
            .args(spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| CaptureError::Execution {
                command: command.clone(),
                reason: err.to_string(),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr, status) = tokio::join!(
            read_capped(stdout, max_output_bytes),
            read_capped(stderr, max_output_bytes),
            child.wait(),
        );

        let pipe_error = |err: std::io::Error| CaptureError::Execution {
            command: command.clone(),
            reason: err.to_string(),
        };
        let (stdout, stdout_truncated) = stdout.map_err(pipe_error)?;
        let (stderr, _) = stderr.map_err(pipe_error)?;
        let status = status.map_err(pipe_error)?;

        Ok(CommandResult {
            command,
            output: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_status: status.code(),
            truncated: stdout_truncated,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Reads up to `limit` bytes and drains the rest so the child never blocks
/// on a full pipe. The flag reports whether anything was discarded.
async fn read_capped<R>(reader: Option<R>, limit: usize) -> std::io::Result<(Vec<u8>, bool)>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok((Vec::new(), false));
    };

    let mut buf = Vec::new();
    (&mut reader).take(limit as u64).read_to_end(&mut buf).await?;
    let discarded = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok((buf, discarded > 0))
}

/// Runs one command under `limits`.
///
/// On timeout the runner future is dropped, which kills a real child.
pub async fn capture_command(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    limits: &CaptureLimits,
) -> Result<CommandResult, CaptureError> {
    let command = spec.command_line();
    match tokio::time::timeout(limits.timeout, runner.run(spec, limits.max_output_bytes)).await {
        Ok(Ok(result)) => {
            debug!(
                "[capture] `{}` exited with {:?} in {} ms ({} bytes)",
                command,
                result.exit_status,
                result.elapsed_ms,
                result.output.len()
            );
            if result.truncated {
                warn!(
                    "[capture] `{}` output truncated at {} bytes",
                    command, limits.max_output_bytes
                );
            }
            Ok(result)
        }
        Ok(Err(err)) => Err(err),
        Err(_) => Err(CaptureError::Timeout {
            command,
            timeout_ms: limits.timeout.as_millis() as u64,
        }),
    }
}
