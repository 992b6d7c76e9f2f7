//! External command execution.
//!
//! Defines the [`PlanRunner`] seam the controller talks through and the
//! production implementation that spawns the terraform binary. Every
//! invocation is bounded by a timeout; an expired timeout kills the
//! child and is reported as a failure, never retried.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, RunnerError, TfApplyError};

/// Default timeout for a terraform invocation in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Captured output of one external command invocation.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, if the process was not killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl RunOutput {
    /// Returns true if the command exited zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for running terraform command lines.
///
/// Implementations must resolve only after the command has finished;
/// the controller sequences every invocation on the previous one.
#[async_trait]
pub trait PlanRunner: Send + Sync {
    /// Runs a command line to completion and captures its output.
    ///
    /// A non-zero exit is an error carrying the captured streams.
    async fn run(&self, command: &str) -> Result<RunOutput>;
}

/// Runner that spawns the terraform binary as a child process.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    /// Working directory for invocations, when set.
    working_dir: Option<PathBuf>,
    /// Per-invocation timeout in seconds.
    timeout_secs: u64,
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TerraformCli {
    /// Creates a runner with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            working_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the working directory for invocations.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the per-invocation timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[async_trait]
impl PlanRunner for TerraformCli {
    async fn run(&self, command: &str) -> Result<RunOutput> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| TfApplyError::internal("empty command line"))?;

        let mut cmd = Command::new(program);
        cmd.args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        debug!("Running: {command}");

        let output = match tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            cmd.output(),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(TfApplyError::Runner(RunnerError::SpawnFailed {
                    command: command.to_string(),
                    message: e.to_string(),
                }));
            }
            Err(_) => {
                return Err(TfApplyError::Runner(RunnerError::TimedOut {
                    command: command.to_string(),
                    timeout_secs: self.timeout_secs,
                }));
            }
        };

        let stdout = String::from_utf8(output.stdout).map_err(|_| {
            TfApplyError::Runner(RunnerError::InvalidOutput {
                command: command.to_string(),
            })
        })?;
        let stderr = String::from_utf8(output.stderr).map_err(|_| {
            TfApplyError::Runner(RunnerError::InvalidOutput {
                command: command.to_string(),
            })
        })?;

        let run = RunOutput {
            exit_code: output.status.code(),
            stdout,
            stderr,
        };

        if run.success() {
            Ok(run)
        } else {
            Err(TfApplyError::Runner(RunnerError::CommandFailed {
                command: command.to_string(),
                exit_code: run.exit_code,
                stdout: run.stdout,
                stderr: run.stderr,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command_captures_stdout() {
        let runner = TerraformCli::new();
        let output = runner.run("echo hello").await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_surfaces_streams() {
        let runner = TerraformCli::new();
        let err = runner.run("false").await.unwrap_err();
        assert!(matches!(
            err,
            TfApplyError::Runner(RunnerError::CommandFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_failure() {
        let runner = TerraformCli::new();
        let err = runner
            .run("definitely-not-a-real-binary plan")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TfApplyError::Runner(RunnerError::SpawnFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_kills_the_command() {
        let runner = TerraformCli::new().with_timeout_secs(1);
        let err = runner.run("sleep 30").await.unwrap_err();
        assert!(matches!(
            err,
            TfApplyError::Runner(RunnerError::TimedOut { .. })
        ));
    }
}
