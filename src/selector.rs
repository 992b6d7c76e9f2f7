//! Target selection against the approval rules.
//!
//! This module decides, for every changed resource in a plan, whether the
//! rule set approves acting on it. Selection is a pure filter over its
//! inputs: no mutation, no IO, and the output preserves plan order.
//!
//! A resource is approved when **any** rule accepts it. A rule accepts a
//! resource when its path pattern matches the resource address and none
//! of its attribute constraints reject an attribute that actually changed
//! value. A rule without attribute constraints accepts on the path match
//! alone.

use tracing::{debug, info};

use crate::plan::{AttributeChange, PlanModel, ResourceChange};
use crate::rules::{CompiledAttributeRule, CompiledResourceRule, CompiledRuleSet};

/// Validates one attribute transition against one attribute rule.
///
/// The new value must match the rule's `new` pattern. When the rule also
/// constrains `old`, the attribute must have a prior value and that value
/// must match; an attribute without a prior value never satisfies a rule
/// that constrains `old`.
#[must_use]
pub fn validate_attribute(rule: &CompiledAttributeRule, change: &AttributeChange) -> bool {
    if !rule.new.is_match(&change.new.value) {
        return false;
    }
    match (&rule.old, &change.old) {
        (Some(old_rule), Some(old)) => old_rule.is_match(&old.value),
        (Some(_), None) => false,
        (None, _) => true,
    }
}

/// Selector deriving the approved target list from a plan.
#[derive(Debug, Default, Clone, Copy)]
pub struct TargetSelector;

impl TargetSelector {
    /// Returns the approved subset of the plan's changed resources, in
    /// plan order.
    #[must_use]
    pub fn select(plan: &PlanModel, rules: &CompiledRuleSet) -> Vec<ResourceChange> {
        info!(
            "Filtering {} potential changed resources...",
            plan.changed_resources.len()
        );

        plan.changed_resources
            .iter()
            .filter(|resource| Self::accepts(resource, rules))
            .cloned()
            .collect()
    }

    /// Returns true if any rule accepts the resource.
    fn accepts(resource: &ResourceChange, rules: &CompiledRuleSet) -> bool {
        let accepted = rules
            .rules
            .iter()
            .any(|rule| Self::rule_accepts(resource, rule));
        if accepted {
            debug!("Target {} was accepted.", resource.path);
        } else {
            debug!("Target {} was rejected by every rule.", resource.path);
        }
        accepted
    }

    /// Evaluates a single rule against a single resource.
    fn rule_accepts(resource: &ResourceChange, rule: &CompiledResourceRule) -> bool {
        if !rule.path.is_match(&resource.path) {
            return false;
        }
        debug!(
            "plan path {} matches validation regex {}",
            resource.path, rule.path_pattern
        );

        let Some(attr_rules) = &rule.attributes else {
            debug!("no attributes");
            return true;
        };

        for (key, change) in &resource.changed_attributes {
            for attr_rule in attr_rules {
                if attr_rule.name.is_match(key)
                    && change.is_changed()
                    && !validate_attribute(attr_rule, change)
                {
                    debug!(
                        "attribute {} ({}) fails constraint {} under rule {}",
                        key, change, attr_rule.new, rule.path_pattern
                    );
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::plan::{AttributeValue, ChangeAction};
    use crate::rules::RuleSet;

    use super::*;

    fn compile(yaml: &str) -> CompiledRuleSet {
        let rules: RuleSet = serde_yaml::from_str(yaml).unwrap();
        CompiledRuleSet::compile(&rules).unwrap()
    }

    fn attribute(old: Option<&str>, new: &str) -> AttributeChange {
        AttributeChange {
            old: old.map(AttributeValue::new),
            new: AttributeValue::new(new),
        }
    }

    fn resource(path: &str, attrs: &[(&str, Option<&str>, &str)]) -> ResourceChange {
        let changed_attributes: BTreeMap<String, AttributeChange> = attrs
            .iter()
            .map(|(name, old, new)| ((*name).to_string(), attribute(*old, new)))
            .collect();
        ResourceChange {
            path: path.to_string(),
            action: ChangeAction::Update,
            changed_attributes,
        }
    }

    fn plan_of(resources: Vec<ResourceChange>) -> PlanModel {
        PlanModel {
            changed_resources: resources,
            changed_data_sources: vec![],
        }
    }

    #[test]
    fn test_non_matching_path_is_never_selected() {
        let rules = compile("changedResources:\n  - path: aws_instance\\.web\n");
        let plan = plan_of(vec![resource("aws_eip.lb", &[])]);
        assert!(TargetSelector::select(&plan, &rules).is_empty());
    }

    #[test]
    fn test_path_match_is_a_substring_search() {
        let rules = compile("changedResources:\n  - path: instance\n");
        let plan = plan_of(vec![resource("aws_instance.web", &[])]);
        assert_eq!(TargetSelector::select(&plan, &rules).len(), 1);
    }

    #[test]
    fn test_unconditional_rule_ignores_attributes() {
        let rules = compile("changedResources:\n  - path: aws_instance\\.web\n");
        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("instance_type", Some("t2.micro"), "m5.24xlarge")],
        )]);
        assert_eq!(TargetSelector::select(&plan, &rules).len(), 1);
    }

    #[test]
    fn test_changed_attribute_failing_rule_rejects_resource() {
        let rules = compile(
            "changedResources:\n  - path: aws_instance\\.web\n    attributes:\n      - name: instance_type\n        new: ^t2\\.\n",
        );

        // New value within the approved family: selected.
        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("instance_type", Some("t2.micro"), "t2.large")],
        )]);
        assert_eq!(TargetSelector::select(&plan, &rules).len(), 1);

        // New value outside the approved family: excluded.
        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("instance_type", Some("t2.micro"), "m5.large")],
        )]);
        assert!(TargetSelector::select(&plan, &rules).is_empty());
    }

    #[test]
    fn test_unchanged_attribute_never_rejects() {
        let rules = compile(
            "changedResources:\n  - path: aws_instance\\.web\n    attributes:\n      - name: instance_type\n        new: ^t2\\.\n",
        );
        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("instance_type", Some("m5.large"), "m5.large")],
        )]);
        assert_eq!(TargetSelector::select(&plan, &rules).len(), 1);
    }

    #[test]
    fn test_newly_created_attribute_counts_as_changed() {
        let rules = compile(
            "changedResources:\n  - path: aws_instance\\.web\n    attributes:\n      - name: instance_type\n        new: ^t2\\.\n",
        );
        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("instance_type", None, "m5.large")],
        )]);
        assert!(TargetSelector::select(&plan, &rules).is_empty());
    }

    #[test]
    fn test_old_rule_never_matches_created_attribute() {
        let rules = compile(
            "changedResources:\n  - path: aws_instance\\.web\n    attributes:\n      - name: instance_type\n        new: ^t2\\.\n        old: ^t2\\.\n",
        );
        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("instance_type", None, "t2.large")],
        )]);
        assert!(TargetSelector::select(&plan, &rules).is_empty());
    }

    #[test]
    fn test_old_rule_gates_on_prior_value() {
        let rules = compile(
            "changedResources:\n  - path: aws_instance\\.web\n    attributes:\n      - name: instance_type\n        new: ^t2\\.\n        old: ^t2\\.\n",
        );

        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("instance_type", Some("t2.micro"), "t2.large")],
        )]);
        assert_eq!(TargetSelector::select(&plan, &rules).len(), 1);

        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("instance_type", Some("m5.large"), "t2.small")],
        )]);
        assert!(TargetSelector::select(&plan, &rules).is_empty());
    }

    #[test]
    fn test_disjunctive_acceptance_keeps_one_entry_in_order() {
        let rules = compile(
            "changedResources:\n  - path: aws_instance\\..*\n    attributes:\n      - name: instance_type\n        new: ^t2\\.\n  - path: aws_instance\\.web\n",
        );
        let plan = plan_of(vec![
            resource("aws_eip.lb", &[]),
            resource(
                "aws_instance.web",
                &[("instance_type", Some("t2.micro"), "m5.large")],
            ),
        ]);

        // Rejected by the first rule's attribute constraint, accepted by
        // the second rule's unconditional path match.
        let selected = TargetSelector::select(&plan, &rules);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].path, "aws_instance.web");
    }

    #[test]
    fn test_selection_preserves_plan_order() {
        let rules = compile("changedResources:\n  - path: aws_\n");
        let plan = plan_of(vec![
            resource("aws_instance.b", &[]),
            resource("aws_instance.a", &[]),
            resource("aws_instance.c", &[]),
        ]);
        let paths: Vec<String> = TargetSelector::select(&plan, &rules)
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(
            paths,
            vec!["aws_instance.b", "aws_instance.a", "aws_instance.c"]
        );
    }

    #[test]
    fn test_selection_is_idempotent() {
        let rules = compile(
            "changedResources:\n  - path: aws_instance\\..*\n    attributes:\n      - name: instance_type\n        new: ^t2\\.\n",
        );
        let plan = plan_of(vec![
            resource(
                "aws_instance.web",
                &[("instance_type", Some("t2.micro"), "t2.large")],
            ),
            resource(
                "aws_instance.worker",
                &[("instance_type", Some("t2.micro"), "m5.large")],
            ),
        ]);

        let first = TargetSelector::select(&plan, &rules);
        let second = TargetSelector::select(&plan, &rules);
        assert_eq!(first, second);
    }

    #[test]
    fn test_attribute_rule_only_applies_to_matching_names() {
        let rules = compile(
            "changedResources:\n  - path: aws_instance\\.web\n    attributes:\n      - name: ^instance_type$\n        new: ^t2\\.\n",
        );
        let plan = plan_of(vec![resource(
            "aws_instance.web",
            &[("ami", Some("ami-1111"), "ami-2222")],
        )]);
        assert_eq!(TargetSelector::select(&plan, &rules).len(), 1);
    }
}
