//! Rules module for the approval criteria.
//!
//! This module handles all rule-set functionality:
//! - Deserializing the approval YAML document
//! - Eagerly compiling every rule pattern to a regex
//! - Surfacing configuration problems before any plan is processed

mod compile;
mod parser;
mod spec;

pub use compile::{CompiledAttributeRule, CompiledResourceRule, CompiledRuleSet};
pub use parser::RulesParser;
pub use spec::{AttributeRule, ResourceRule, RuleSet};
