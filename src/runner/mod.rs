//! Runner module for external terraform invocations.
//!
//! This module owns everything between the controller and the terraform
//! binary:
//! - Building the targeted plan and apply command lines
//! - The [`PlanRunner`] execution seam and its CLI implementation

mod command;
mod exec;

pub use command::{CommandBuilder, DEFAULT_BINARY};
pub use exec::{DEFAULT_TIMEOUT_SECS, PlanRunner, RunOutput, TerraformCli};
