//! Error types for the tfapply tool.
//!
//! This module provides the error hierarchy for all stages of a
//! reconciliation run: rule-set loading, plan parsing, external command
//! execution, and target confirmation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tfapply.
#[derive(Debug, Error)]
pub enum TfApplyError {
    /// Rule-set configuration errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan parsing errors.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// External command execution errors.
    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    /// Target reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rule-set configuration errors.
///
/// All of these are raised before any external command is run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The rules file was not found.
    #[error("Rules file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The rules file could not be parsed.
    #[error("Failed to parse rules: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// A rule contains an invalid regular expression.
    #[error("Invalid pattern for {field} in rule #{rule}: {pattern} ({message})")]
    InvalidPattern {
        /// Index of the rule in the rules file.
        rule: usize,
        /// Field the pattern belongs to (path, name, new, old).
        field: &'static str,
        /// The offending pattern.
        pattern: String,
        /// Regex compiler diagnostic.
        message: String,
    },

    /// The rule set approves nothing.
    #[error("Rules file declares no changedResources entries")]
    EmptyRuleSet,
}

/// Plan parsing errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The input does not look like `terraform plan` output.
    #[error("Input is not recognizable terraform plan output: {message}")]
    UnrecognizedInput {
        /// Description of what was expected.
        message: String,
    },

    /// A line inside the action section could not be interpreted.
    #[error("Malformed plan line {line}: {content}")]
    MalformedLine {
        /// 1-based line number in the plan text.
        line: usize,
        /// The offending line content.
        content: String,
    },
}

/// External command execution errors.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The command could not be spawned at all.
    #[error("Failed to spawn command '{command}': {message}")]
    SpawnFailed {
        /// The command line that failed to start.
        command: String,
        /// OS-level diagnostic.
        message: String,
    },

    /// The command ran but exited non-zero.
    #[error("Command '{command}' exited with status {exit_code:?}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        exit_code: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The command did not finish within the configured timeout.
    #[error("Command '{command}' timed out after {timeout_secs}s")]
    TimedOut {
        /// The command line that was killed.
        command: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },

    /// The command produced output that is not valid UTF-8.
    #[error("Command '{command}' produced non-UTF-8 output")]
    InvalidOutput {
        /// The command line that was run.
        command: String,
    },
}

/// Target reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The confirmation re-plan selected a different target set.
    #[error("Targets did not match!\n\t{initial}\n\t{confirmed}")]
    TargetsDrifted {
        /// Target fragment from the initial selection.
        initial: String,
        /// Target fragment from the confirmation re-plan.
        confirmed: String,
    },
}

/// Result type alias for tfapply operations.
pub type Result<T> = std::result::Result<T, TfApplyError>;

impl TfApplyError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error means the planned targets drifted.
    #[must_use]
    pub const fn is_drift(&self) -> bool {
        matches!(self, Self::Reconcile(ReconcileError::TargetsDrifted { .. }))
    }
}

impl ConfigError {
    /// Creates a parse error without a source location.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: None,
        }
    }
}

impl PlanError {
    /// Creates an unrecognized-input error.
    #[must_use]
    pub fn unrecognized(message: impl Into<String>) -> Self {
        Self::UnrecognizedInput {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_error_message_contains_both_fragments() {
        let err = TfApplyError::Reconcile(ReconcileError::TargetsDrifted {
            initial: "-target a -target b".to_string(),
            confirmed: "-target a".to_string(),
        });
        let rendered = err.to_string();
        assert!(rendered.contains("-target a -target b"));
        assert!(rendered.contains("-target a"));
        assert!(err.is_drift());
    }

    #[test]
    fn test_runner_failure_surfaces_streams() {
        let err = RunnerError::CommandFailed {
            command: "terraform plan".to_string(),
            exit_code: Some(1),
            stdout: "partial output".to_string(),
            stderr: "Error: backend locked".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("partial output"));
        assert!(rendered.contains("backend locked"));
    }
}
