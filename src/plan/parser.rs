//! Parser for the human-readable `terraform plan` stdout format.
//!
//! This module turns the textual plan report into a [`PlanModel`]. It
//! understands the classic action section:
//!
//! ```text
//! Terraform will perform the following actions:
//!
//!   ~ aws_instance.web
//!       instance_type: "t2.micro" => "t2.large"
//!
//! Plan: 0 to add, 1 to change, 0 to destroy.
//! ```
//!
//! Only the action section is interpreted; everything before the header
//! (refresh chatter, the symbol legend) and after the `Plan:` summary is
//! ignored.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{PlanError, Result};

use super::model::{AttributeChange, AttributeValue, ChangeAction, PlanModel, ResourceChange};

/// Header that opens the action section.
const SECTION_START: &str = "Terraform will perform the following actions:";

/// Summary line that closes the action section.
const SUMMARY_PREFIX: &str = "Plan:";

/// Markers terraform prints when the plan is empty.
const NO_CHANGES_MARKERS: &[&str] = &[
    "No changes. Infrastructure is up-to-date.",
    "No changes. Your infrastructure matches the configuration.",
];

/// ANSI escape sequences (terraform colors its output by default).
static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("static pattern"));

/// A resource header line: action marker followed by the resource address.
static ACTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-/\+|<=|[~+-])\s+(\S+)").expect("static pattern"));

/// An attribute line: indented `name:` followed by the value transition.
static ATTRIBUTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+([^\s:]+):\s+(\S.*)$").expect("static pattern"));

/// A value transition: `"old" => "new"`, a bare `"value"`, or the
/// `<computed>` / `<sensitive>` placeholders in either position.
static TRANSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:(?:"(?P<old>(?:[^"\\]|\\.)*)"|<(?P<old_special>[a-z ]+)>)\s*=>\s*)?(?:"(?P<new>(?:[^"\\]|\\.)*)"|<(?P<new_special>[a-z ]+)>)"#,
    )
    .expect("static pattern")
});

/// Parser for `terraform plan` stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanParser;

impl PlanParser {
    /// Parses raw plan output into a [`PlanModel`].
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] if the text contains neither an action
    /// section nor a no-changes marker, or if an attribute line inside
    /// the action section cannot be interpreted.
    pub fn parse_stdout(raw: &str) -> Result<PlanModel> {
        let text = ANSI_ESCAPE.replace_all(raw, "");

        if NO_CHANGES_MARKERS.iter().any(|m| text.contains(m)) {
            debug!("plan reports no changes");
            return Ok(PlanModel::empty());
        }

        let Some(section_offset) = text.find(SECTION_START) else {
            return Err(PlanError::unrecognized(format!(
                "missing '{SECTION_START}' header"
            ))
            .into());
        };

        // Line numbers in errors are relative to the full input.
        let header_line = text[..section_offset].lines().count();
        let section = &text[section_offset + SECTION_START.len()..];

        let mut resources: Vec<ResourceChange> = Vec::new();
        let mut index_by_path: HashMap<String, usize> = HashMap::new();
        let mut current: Option<usize> = None;

        for (offset, line) in section.lines().enumerate() {
            let line_no = header_line + offset + 1;
            let trimmed = line.trim_end();

            if trimmed.trim_start().starts_with(SUMMARY_PREFIX) {
                break;
            }
            if trimmed.trim().is_empty() {
                current = None;
                continue;
            }

            if let Some(caps) = ACTION_LINE.captures(trimmed) {
                let marker = &caps[1];
                let path = caps[2].to_string();
                let Some(action) = ChangeAction::from_marker(marker) else {
                    continue;
                };

                // Duplicate headers continue the earlier entry.
                let idx = *index_by_path.entry(path.clone()).or_insert_with(|| {
                    resources.push(ResourceChange::new(path.clone(), action));
                    resources.len() - 1
                });
                trace!("plan resource {} ({})", path, action);
                current = Some(idx);
                continue;
            }

            if let Some(caps) = ATTRIBUTE_LINE.captures(trimmed) {
                let Some(idx) = current else {
                    trace!("attribute line outside a resource block: {trimmed}");
                    continue;
                };
                let name = caps[1].to_string();
                let change = Self::parse_transition(&caps[2]).ok_or_else(|| {
                    PlanError::MalformedLine {
                        line: line_no,
                        content: trimmed.to_string(),
                    }
                })?;
                resources[idx].changed_attributes.insert(name, change);
                continue;
            }

            trace!("skipping plan line: {trimmed}");
        }

        if resources.is_empty() {
            debug!("action section contains no resources");
        }

        let (changed_data_sources, changed_resources): (Vec<_>, Vec<_>) =
            resources.into_iter().partition(|r| r.action.is_read());

        Ok(PlanModel {
            changed_resources,
            changed_data_sources,
        })
    }

    /// Interprets one attribute value transition.
    fn parse_transition(rest: &str) -> Option<AttributeChange> {
        let caps = TRANSITION.captures(rest)?;

        let old = caps
            .name("old")
            .map(|m| AttributeValue::new(m.as_str()))
            .or_else(|| {
                caps.name("old_special")
                    .map(|m| AttributeValue::new(format!("<{}>", m.as_str())))
            });

        let new = caps
            .name("new")
            .map(|m| AttributeValue::new(m.as_str()))
            .or_else(|| {
                caps.name("new_special")
                    .map(|m| AttributeValue::new(format!("<{}>", m.as_str())))
            })?;

        Some(AttributeChange { old, new })
    }
}
