//! Reconciliation controller for the confirm-then-apply sequence.
//!
//! This module implements the core protocol: parse the plan, select the
//! approved targets, re-plan scoped to exactly those targets, re-select
//! against the same rules, and only when both selections agree proceed to
//! an auto-approved targeted apply.
//!
//! The re-plan step is a correctness safeguard: infrastructure may change
//! between the initial plan and the moment the operator acts on it, and a
//! targeted apply against a drifted plan could do more (or other) than
//! what was approved.

use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{ReconcileError, Result, TfApplyError};
use crate::plan::{PlanParser, ResourceChange};
use crate::rules::CompiledRuleSet;
use crate::runner::{CommandBuilder, PlanRunner, RunOutput};
use crate::selector::TargetSelector;

/// Controller for one reconciliation run.
pub struct ReconciliationController<'a, R: PlanRunner> {
    /// Compiled approval rules.
    rules: &'a CompiledRuleSet,
    /// External command runner.
    runner: &'a R,
    /// Command-line builder.
    builder: CommandBuilder,
    /// Whether the apply step executes or is skipped after confirmation.
    apply_enabled: bool,
}

/// Successful terminal state of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Nothing in the plan matched the rules; no command was run.
    NoOp,
    /// Targets were confirmed but apply was disabled.
    SkippedApply {
        /// Confirmed targets, in plan order.
        targets: Vec<ResourceChange>,
        /// Target fragment that would have scoped the apply.
        fragment: String,
    },
    /// Targets were confirmed and applied.
    Applied {
        /// Applied targets, in plan order.
        targets: Vec<ResourceChange>,
        /// Captured apply stdout.
        output: String,
    },
}

impl<'a, R: PlanRunner> ReconciliationController<'a, R> {
    /// Creates a controller with apply disabled (dry-run).
    #[must_use]
    pub fn new(rules: &'a CompiledRuleSet, runner: &'a R) -> Self {
        Self {
            rules,
            runner,
            builder: CommandBuilder::new(),
            apply_enabled: false,
        }
    }

    /// Sets the command-line builder.
    #[must_use]
    pub fn with_builder(mut self, builder: CommandBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Enables or disables the apply step.
    #[must_use]
    pub const fn with_apply_enabled(mut self, apply_enabled: bool) -> Self {
        self.apply_enabled = apply_enabled;
        self
    }

    /// Runs the full select, confirm, apply sequence on raw plan text.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan text (or re-plan output) cannot be
    /// parsed, a terraform invocation fails or times out, or the
    /// confirmation re-plan selects a different target set.
    pub async fn run(&self, plan_text: &str) -> Result<ReconcileOutcome> {
        let plan = PlanParser::parse_stdout(plan_text)?;

        let targets = TargetSelector::select(&plan, self.rules);
        if targets.is_empty() {
            info!("No changes to apply or nothing matched.");
            return Ok(ReconcileOutcome::NoOp);
        }

        let fragment = CommandBuilder::target_args(&targets);
        debug!("MATCHING TARGETS: {fragment}");

        let plan_cmd = self.builder.plan_command(&fragment);
        info!(
            "Rerunning plan with matching targets ({}) to confirm targets...",
            targets.len()
        );
        info!("$ {plan_cmd}");
        let confirmation = self.exec(&plan_cmd).await?;

        let replan = PlanParser::parse_stdout(&confirmation.stdout)?;
        let confirmed_targets = TargetSelector::select(&replan, self.rules);
        let confirmed_fragment = CommandBuilder::target_args(&confirmed_targets);

        if fragment != confirmed_fragment {
            return Err(TfApplyError::Reconcile(ReconcileError::TargetsDrifted {
                initial: fragment,
                confirmed: confirmed_fragment,
            }));
        }
        info!(
            "The same {} targets confirmed in the targeted plan.",
            confirmed_targets.len()
        );

        if !self.apply_enabled {
            info!("Apply was omitted so skipping apply.");
            return Ok(ReconcileOutcome::SkippedApply { targets, fragment });
        }

        let apply_cmd = self.builder.apply_command(&fragment);
        info!("Running apply with matching targets...");
        info!("$ {apply_cmd}");
        let applied = self.exec(&apply_cmd).await?;

        Ok(ReconcileOutcome::Applied {
            targets,
            output: applied.stdout,
        })
    }

    /// Runs one command, logging the manual-recovery hint on failure.
    async fn exec(&self, command: &str) -> Result<RunOutput> {
        match self.runner.run(command).await {
            Ok(output) => Ok(output),
            Err(err) => {
                error!("Please run this manually\n\n\t{command}");
                Err(err)
            }
        }
    }
}

impl ReconcileOutcome {
    /// Returns the confirmed targets, empty for a no-op.
    #[must_use]
    pub fn targets(&self) -> &[ResourceChange] {
        match self {
            Self::NoOp => &[],
            Self::SkippedApply { targets, .. } | Self::Applied { targets, .. } => targets,
        }
    }

    /// Returns true if an apply was executed.
    #[must_use]
    pub const fn was_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
