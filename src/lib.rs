// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tfapply
//!
//! Selective approval and targeted auto-apply for Terraform plans.
//!
//! ## Overview
//!
//! tfapply reads the output of `terraform plan`, filters the proposed
//! resource changes through a declarative YAML rule set, and applies only
//! the changes the rules approve:
//!
//! - Describe approved changes as path + attribute regex rules
//! - Derive the minimal `-target` list from the plan
//! - Re-plan scoped to those targets to confirm nothing drifted
//! - Optionally run an auto-approved, targeted `terraform apply`
//!
//! ## Architecture
//!
//! The pipeline is a strict sequence with a confirmation step in the
//! middle:
//!
//! 1. **Parse**: `terraform plan` stdout becomes a [`plan::PlanModel`]
//! 2. **Select**: the rules approve an ordered subset of the changes
//! 3. **Confirm**: a targeted re-plan must select the same targets
//! 4. **Apply**: only a confirmed, unchanged target set is applied
//!
//! ## Modules
//!
//! - [`plan`]: plan data model and stdout parsing
//! - [`rules`]: approval rule types, loading, and regex compilation
//! - [`selector`]: target selection against the rules
//! - [`runner`]: command construction and terraform execution
//! - [`reconciler`]: the confirm-then-apply controller
//! - [`cli`]: command-line interface
//!
//! ## Example
//!
//! ```yaml
//! changedResources:
//!   - path: aws_instance\.web
//!     attributes:
//!       - name: instance_type
//!         new: ^t2\.
//!   - path: aws_route53_record\..*
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod error;
pub mod plan;
pub mod reconciler;
pub mod rules;
pub mod runner;
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, OutputFormat, OutputFormatter};
pub use error::{Result, TfApplyError};
pub use plan::{AttributeChange, AttributeValue, ChangeAction, PlanModel, PlanParser, ResourceChange};
pub use reconciler::{ReconcileOutcome, ReconciliationController};
pub use rules::{AttributeRule, CompiledRuleSet, ResourceRule, RuleSet, RulesParser};
pub use runner::{CommandBuilder, PlanRunner, RunOutput, TerraformCli};
pub use selector::{TargetSelector, validate_attribute};
