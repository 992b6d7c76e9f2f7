//! Rule-set specification types.
//!
//! These structs map to the approval YAML document. Field names on the
//! wire are camelCase to stay compatible with existing rule files:
//!
//! ```yaml
//! changedResources:
//!   - path: aws_instance\.web
//!     attributes:
//!       - name: instance_type
//!         new: ^t2\.
//! ```
//!
//! Every `path`, `name`, `new`, and `old` value is a regular expression,
//! matched as a substring search against the corresponding plan value.

use serde::{Deserialize, Serialize};

/// The root structure of an approval rules file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSet {
    /// Approval rules, tried in order against every changed resource.
    #[serde(rename = "changedResources")]
    pub changed_resources: Vec<ResourceRule>,
}

/// Approval rule for resources whose address matches `path`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceRule {
    /// Pattern matched against the resource address.
    pub path: String,
    /// Per-attribute constraints. Absent means the path match alone
    /// approves the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeRule>>,
}

/// Constraint on one attribute's planned transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeRule {
    /// Pattern matched against the attribute name.
    pub name: String,
    /// Pattern the planned new value must match.
    pub new: String,
    /// Pattern the prior value must match, when given. A rule with
    /// `old` never matches an attribute that has no prior value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
}

impl RuleSet {
    /// Returns true if the rule set contains no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_resources.is_empty()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changed_resources.len()
    }
}

impl ResourceRule {
    /// Returns true if a path match alone approves a resource.
    #[must_use]
    pub const fn is_unconditional(&self) -> bool {
        self.attributes.is_none()
    }
}
