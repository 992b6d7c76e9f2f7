//! CLI module for the tfapply tool.
//!
//! This module provides the command-line interface for filtering and
//! applying terraform plans.

mod commands;
mod output;

pub use commands::{Cli, OutputFormat};
pub use output::OutputFormatter;
