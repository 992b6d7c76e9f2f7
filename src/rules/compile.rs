//! Eager compilation of rule patterns.
//!
//! Every pattern in the rule set is compiled exactly once, at load time,
//! so an invalid regex surfaces as a [`ConfigError`] before any plan is
//! parsed or any command is run. The compiled forms keep their source
//! pattern strings for decision logging.

use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, Result, TfApplyError};

use super::spec::{AttributeRule, ResourceRule, RuleSet};

/// A rule set with all patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    /// Compiled rules, in file order.
    pub rules: Vec<CompiledResourceRule>,
}

/// A resource rule with compiled patterns.
#[derive(Debug, Clone)]
pub struct CompiledResourceRule {
    /// Compiled path pattern.
    pub path: Regex,
    /// Source path pattern, for diagnostics.
    pub path_pattern: String,
    /// Compiled attribute constraints, when present.
    pub attributes: Option<Vec<CompiledAttributeRule>>,
}

/// An attribute rule with compiled patterns.
#[derive(Debug, Clone)]
pub struct CompiledAttributeRule {
    /// Compiled attribute-name pattern.
    pub name: Regex,
    /// Compiled new-value pattern.
    pub new: Regex,
    /// Compiled prior-value pattern, when the rule constrains it.
    pub old: Option<Regex>,
}

impl CompiledRuleSet {
    /// Compiles every pattern in the given rule set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the rule set is empty or any pattern
    /// fails to compile; the error names the rule index, the field, and
    /// the offending pattern.
    pub fn compile(rules: &RuleSet) -> Result<Self> {
        if rules.is_empty() {
            return Err(TfApplyError::Config(ConfigError::EmptyRuleSet));
        }

        let compiled = rules
            .changed_resources
            .iter()
            .enumerate()
            .map(|(idx, rule)| CompiledResourceRule::compile(idx, rule))
            .collect::<Result<Vec<_>>>()?;

        debug!("Compiled {} approval rules", compiled.len());
        Ok(Self { rules: compiled })
    }
}

impl CompiledResourceRule {
    /// Compiles one resource rule.
    fn compile(idx: usize, rule: &ResourceRule) -> Result<Self> {
        let path = compile_pattern(idx, "path", &rule.path)?;

        let attributes = rule
            .attributes
            .as_ref()
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|attr| CompiledAttributeRule::compile(idx, attr))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            path,
            path_pattern: rule.path.clone(),
            attributes,
        })
    }
}

impl CompiledAttributeRule {
    /// Compiles one attribute rule.
    fn compile(idx: usize, rule: &AttributeRule) -> Result<Self> {
        Ok(Self {
            name: compile_pattern(idx, "name", &rule.name)?,
            new: compile_pattern(idx, "new", &rule.new)?,
            old: rule
                .old
                .as_deref()
                .map(|old| compile_pattern(idx, "old", old))
                .transpose()?,
        })
    }
}

/// Compiles a single pattern, mapping failures to a [`ConfigError`].
fn compile_pattern(rule: usize, field: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        TfApplyError::Config(ConfigError::InvalidPattern {
            rule,
            field,
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_set(yaml: &str) -> RuleSet {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_compile_valid_rules() {
        let rules = rule_set(
            r"
changedResources:
  - path: aws_instance\.web
    attributes:
      - name: instance_type
        new: ^t2\.
        old: ^t2\.
  - path: aws_route53_record\..*
",
        );
        let compiled = CompiledRuleSet::compile(&rules).unwrap();
        assert_eq!(compiled.rules.len(), 2);
        assert!(compiled.rules[0].path.is_match("aws_instance.web"));
        assert!(compiled.rules[1].attributes.is_none());
    }

    #[test]
    fn test_invalid_pattern_names_the_field() {
        let rules = rule_set(
            r"
changedResources:
  - path: aws_instance\.web
    attributes:
      - name: instance_type
        new: '[unclosed'
",
        );
        let err = CompiledRuleSet::compile(&rules).unwrap_err();
        match err {
            TfApplyError::Config(ConfigError::InvalidPattern {
                rule,
                field,
                pattern,
                ..
            }) => {
                assert_eq!(rule, 0);
                assert_eq!(field, "new");
                assert_eq!(pattern, "[unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_rule_set_is_rejected() {
        let rules = rule_set("changedResources: []");
        let err = CompiledRuleSet::compile(&rules).unwrap_err();
        assert!(matches!(
            err,
            TfApplyError::Config(ConfigError::EmptyRuleSet)
        ));
    }
}
