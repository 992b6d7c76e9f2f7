//! Data model for a parsed terraform plan.
//!
//! These types are the passive output of [`super::PlanParser`] and the
//! input to target selection. They are immutable for the lifetime of a
//! reconciliation run.

use std::collections::BTreeMap;

use serde::Serialize;

/// A parsed set of planned resource changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanModel {
    /// Resources the plan will change, in document order.
    pub changed_resources: Vec<ResourceChange>,
    /// Data sources the plan will read, in document order.
    ///
    /// Reads are reported for operator visibility but are never
    /// candidates for targeting.
    pub changed_data_sources: Vec<ResourceChange>,
}

/// A single planned change to one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceChange {
    /// Unique resource address (e.g. `aws_instance.web`).
    pub path: String,
    /// What terraform intends to do with the resource.
    pub action: ChangeAction,
    /// Attribute transitions, keyed by attribute name.
    pub changed_attributes: BTreeMap<String, AttributeChange>,
}

/// The action terraform plans to take on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// Resource will be created (`+`).
    Create,
    /// Resource will be updated in place (`~`).
    Update,
    /// Resource will be destroyed (`-`).
    Destroy,
    /// Resource will be destroyed and recreated (`-/+`).
    Replace,
    /// Data source will be read (`<=`).
    Read,
}

/// One attribute's transition from its old to its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChange {
    /// Prior value. `None` means the attribute is newly created.
    pub old: Option<AttributeValue>,
    /// Planned value.
    pub new: AttributeValue,
}

/// A single observed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeValue {
    /// The raw value string as printed by terraform.
    pub value: String,
}

impl PlanModel {
    /// Creates an empty plan (no changes).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            changed_resources: vec![],
            changed_data_sources: vec![],
        }
    }

    /// Returns true if the plan changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_resources.is_empty()
    }

    /// Looks up a changed resource by its address.
    #[must_use]
    pub fn resource(&self, path: &str) -> Option<&ResourceChange> {
        self.changed_resources.iter().find(|r| r.path == path)
    }
}

impl ResourceChange {
    /// Creates a resource change with no attributes yet.
    #[must_use]
    pub const fn new(path: String, action: ChangeAction) -> Self {
        Self {
            path,
            action,
            changed_attributes: BTreeMap::new(),
        }
    }
}

impl ChangeAction {
    /// Maps a plan action marker to its action.
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "+" => Some(Self::Create),
            "~" => Some(Self::Update),
            "-" => Some(Self::Destroy),
            "-/+" => Some(Self::Replace),
            "<=" => Some(Self::Read),
            _ => None,
        }
    }

    /// Returns true if this action reads a data source.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Read)
    }
}

impl AttributeChange {
    /// Returns true if the attribute actually changes value.
    ///
    /// An attribute without a prior value counts as changed.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.old.as_ref().is_none_or(|old| old.value != self.new.value)
    }
}

impl AttributeValue {
    /// Wraps a raw value string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::Replace => "replace",
            Self::Read => "read",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.old {
            Some(old) => write!(f, "\"{}\" => \"{}\"", old.value, self.new.value),
            None => write!(f, "\"{}\"", self.new.value),
        }
    }
}
