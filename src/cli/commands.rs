//! CLI argument definitions.
//!
//! This module defines the command-line arguments using clap. The tool
//! has a single purpose, so everything hangs off one flat argument set:
//!
//! ```text
//! $ terraform plan | tfapply -a apply.yml
//! $ tfapply -a apply.yml -p terraform-plan.stdout --apply
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::runner::{DEFAULT_BINARY, DEFAULT_TIMEOUT_SECS};

/// tfapply - selective approval and targeted apply for terraform plans.
#[derive(Parser, Debug)]
#[command(name = "tfapply")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML rules file describing which changes are approved.
    #[arg(short = 'a', long = "approve", env = "TFAPPLY_RULES")]
    pub approve: PathBuf,

    /// File containing `terraform plan` output; reads stdin when omitted.
    #[arg(short, long)]
    pub plan: Option<PathBuf>,

    /// Obtain the plan by invoking the binary instead of reading input.
    #[arg(long, conflicts_with = "plan")]
    pub run_plan: bool,

    /// Execute the apply step after target confirmation.
    #[arg(long)]
    pub apply: bool,

    /// Terraform binary to invoke.
    #[arg(long, default_value = DEFAULT_BINARY, env = "TFAPPLY_BIN")]
    pub binary: String,

    /// Working directory for terraform invocations.
    #[arg(long)]
    pub chdir: Option<PathBuf>,

    /// Timeout for each terraform invocation, in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["tfapply", "-a", "apply.yml"]);
        assert_eq!(cli.approve, PathBuf::from("apply.yml"));
        assert!(cli.plan.is_none());
        assert!(!cli.apply);
        assert_eq!(cli.binary, "terraform");
        assert_eq!(cli.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_run_plan_conflicts_with_plan_file() {
        let result = Cli::try_parse_from(["tfapply", "-a", "apply.yml", "-p", "x", "--run-plan"]);
        assert!(result.is_err());
    }
}
