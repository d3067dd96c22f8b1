//! Validation engine contract and the structured error shape it produces.
//!
//! The form builders consume a [`Validator`] without knowing how rules are
//! declared. [`crate::Schema`] is the provided implementation; anything
//! that can answer the three contract methods plugs in the same way.

use crate::{FormResult, GroupFilter, Model, RuleKind};
use serde::{Deserialize, Serialize};

/// One failed rule on a field: the rule kind and its rendered message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Which rule failed.
    pub kind: RuleKind,
    /// Human-readable message for the failure.
    pub message: String,
}

impl Constraint {
    /// Create a constraint entry.
    #[inline]
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Structured validation outcome for one field.
///
/// `constraints` lists this field's own failed rules in declaration order.
/// `children` carries errors of nested objects; for sequence fields each
/// child's `property` is the element index rendered as a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field's own name (or element index for array children).
    pub property: String,
    /// Failed rules on this field, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    /// Errors of nested fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ValidationError>,
}

impl ValidationError {
    /// Create an empty error entry for a property.
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            constraints: Vec::new(),
            children: Vec::new(),
        }
    }

    /// True if this entry carries no constraints and no children.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty() && self.children.is_empty()
    }

    /// The messages of this entry's own constraints, in order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().map(|c| c.message.as_str())
    }
}

/// Flatten the messages of every top-level error matching `property`.
///
/// Returns the messages in error order, then constraint order. A field
/// with no matching errors yields an empty vector, never an absent value.
pub fn collect_errors(errors: &[ValidationError], property: &str) -> Vec<String> {
    errors
        .iter()
        .filter(|e| e.property == property)
        .flat_map(|e| e.messages().map(str::to_owned))
        .collect()
}

/// The validation engine consumed by form builders.
///
/// `validate` runs one pass over a model node; the two descent methods
/// hand out the engine for a nested field so child builders validate
/// their subtree with the right rules. Descending into a field that was
/// not declared with the matching nesting is a fault.
pub trait Validator: std::fmt::Debug {
    /// Validate a model node, restricted to the rules the filter selects.
    fn validate(&self, model: &Model, filter: &GroupFilter) -> FormResult<Vec<ValidationError>>;

    /// The engine for a nested-object field.
    fn object_rules(&self, field: &str) -> FormResult<&dyn Validator>;

    /// The engine for the elements of a sequence field.
    fn element_rules(&self, field: &str) -> FormResult<&dyn Validator>;
}
