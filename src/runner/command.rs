//! Terraform command-line construction.
//!
//! Builds the `-target` scoping fragment from a selected target list and
//! the full plan/apply command lines around it. The fragment string
//! doubles as the value compared during drift detection, so its layout
//! must stay deterministic: one `-target <path>` per target, plan order,
//! single spaces.

use crate::plan::ResourceChange;

/// Binary invoked when none is configured.
pub const DEFAULT_BINARY: &str = "terraform";

/// Builder for terraform command lines.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    /// Binary to invoke.
    binary: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBuilder {
    /// Creates a builder for the default `terraform` binary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
        }
    }

    /// Overrides the binary to invoke.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Builds the `-target` fragment for the given targets.
    ///
    /// Empty input yields an empty string; callers treat that as
    /// "nothing to do" before any command is assembled.
    #[must_use]
    pub fn target_args(targets: &[ResourceChange]) -> String {
        targets
            .iter()
            .map(|target| format!("-target {}", target.path))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builds a plan command scoped to the given fragment.
    #[must_use]
    pub fn plan_command(&self, fragment: &str) -> String {
        if fragment.is_empty() {
            format!("{} plan", self.binary)
        } else {
            format!("{} plan {fragment}", self.binary)
        }
    }

    /// Builds an unscoped plan command, for obtaining the initial plan.
    #[must_use]
    pub fn full_plan_command(&self) -> String {
        format!("{} plan", self.binary)
    }

    /// Builds an auto-approving apply command scoped to the fragment.
    #[must_use]
    pub fn apply_command(&self, fragment: &str) -> String {
        format!("{} apply {fragment} -auto-approve", self.binary)
    }
}
