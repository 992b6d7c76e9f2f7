//! Output formatting for the CLI.
//!
//! This module renders the reconciliation outcome for the operator,
//! either as colored text with a target table or as JSON for scripting.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::plan::ResourceChange;
use crate::reconciler::ReconcileOutcome;

use super::commands::OutputFormat;

/// Output formatter for CLI results.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Target row for table display.
#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Changed attributes")]
    attributes: usize,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a reconciliation outcome for display.
    #[must_use]
    pub fn format_outcome(&self, outcome: &ReconcileOutcome) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(outcome).unwrap_or_default(),
            OutputFormat::Text => Self::format_outcome_text(outcome),
        }
    }

    /// Formats an outcome as text.
    fn format_outcome_text(outcome: &ReconcileOutcome) -> String {
        match outcome {
            ReconcileOutcome::NoOp => {
                format!("{} No changes to apply or nothing matched.\n", "✓".green())
            }
            ReconcileOutcome::SkippedApply { targets, fragment } => {
                let mut output = String::new();
                let _ = writeln!(
                    output,
                    "{} {} target(s) confirmed in the targeted plan.\n",
                    "✓".green(),
                    targets.len()
                );
                output.push_str(&Self::target_table(targets));
                let _ = writeln!(
                    output,
                    "\n{} --apply was omitted so skipping apply.",
                    "⚠".yellow()
                );
                let _ = writeln!(output, "  Confirmed targets: {fragment}");
                output
            }
            ReconcileOutcome::Applied { targets, output: apply_output } => {
                let mut output = String::new();
                let _ = writeln!(
                    output,
                    "{} Applied {} target(s).\n",
                    "✓".green(),
                    targets.len()
                );
                output.push_str(&Self::target_table(targets));
                output.push('\n');
                output.push_str(apply_output);
                output
            }
        }
    }

    /// Renders the confirmed targets as a table.
    fn target_table(targets: &[ResourceChange]) -> String {
        let rows: Vec<TargetRow> = targets
            .iter()
            .map(|t| TargetRow {
                resource: t.path.clone(),
                action: t.action.to_string(),
                attributes: t.changed_attributes.len(),
            })
            .collect();

        if rows.is_empty() {
            String::new()
        } else {
            Table::new(rows).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::plan::ChangeAction;

    use super::*;

    fn outcome() -> ReconcileOutcome {
        ReconcileOutcome::SkippedApply {
            targets: vec![ResourceChange::new(
                "aws_instance.web".to_string(),
                ChangeAction::Update,
            )],
            fragment: "-target aws_instance.web".to_string(),
        }
    }

    #[test]
    fn test_text_output_mentions_targets_and_skip() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let text = formatter.format_outcome(&outcome());
        assert!(text.contains("aws_instance.web"));
        assert!(text.contains("skipping apply"));
    }

    #[test]
    fn test_json_output_is_tagged() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let json = formatter.format_outcome(&outcome());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "skipped_apply");
        assert_eq!(value["targets"][0]["path"], "aws_instance.web");
    }
}
