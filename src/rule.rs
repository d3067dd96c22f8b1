//! Rule vocabulary for the path-keyed rule table.
//!
//! Rules are declared per field and evaluated against the field's current
//! value. Each rule carries a kind from a closed vocabulary, a rendered
//! message, and the validation groups it belongs to. Groups gate which
//! rules run in a given pass; the `immediate` group marks rules surfaced
//! before any interaction.

use crate::Model;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Group tag for rules surfaced before any interaction.
pub const IMMEDIATE: &str = "immediate";

/// The closed vocabulary of rule kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Value must be a non-empty string.
    NotEmpty,
    /// Value must not be null/missing.
    Defined,
    /// String must have at least N characters.
    MinLength,
    /// String must have at most N characters.
    MaxLength,
    /// Number must be at least N.
    Min,
    /// Number must be at most N.
    Max,
    /// Caller-supplied predicate.
    Custom,
}

type Check = Arc<dyn Fn(&Model) -> bool + Send + Sync>;

/// One validation rule: a kind, a predicate, a message, and group tags.
///
/// A missing field is checked as [`Model::Null`], so presence rules like
/// [`Rule::defined`] fail for it while string rules fail too (null is not
/// a string of any length).
#[derive(Clone)]
pub struct Rule {
    kind: RuleKind,
    message: String,
    groups: Vec<String>,
    check: Check,
}

impl Rule {
    /// Create a rule from a kind, message, and predicate.
    pub fn new(
        kind: RuleKind,
        message: impl Into<String>,
        check: impl Fn(&Model) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            groups: Vec::new(),
            check: Arc::new(check),
        }
    }

    /// Value must be a non-empty string.
    pub fn not_empty(message: impl Into<String>) -> Self {
        Self::new(RuleKind::NotEmpty, message, |value| {
            value.as_str().is_some_and(|s| !s.is_empty())
        })
    }

    /// Value must not be null or missing.
    pub fn defined(message: impl Into<String>) -> Self {
        Self::new(RuleKind::Defined, message, |value| !value.is_null())
    }

    /// String must have at least `n` characters.
    pub fn min_length(n: usize, message: impl Into<String>) -> Self {
        Self::new(RuleKind::MinLength, message, move |value| {
            value.as_str().is_some_and(|s| s.chars().count() >= n)
        })
    }

    /// String must have at most `n` characters.
    pub fn max_length(n: usize, message: impl Into<String>) -> Self {
        Self::new(RuleKind::MaxLength, message, move |value| {
            value.as_str().is_some_and(|s| s.chars().count() <= n)
        })
    }

    /// Number must be at least `n`.
    pub fn min(n: f64, message: impl Into<String>) -> Self {
        Self::new(RuleKind::Min, message, move |value| {
            value.as_f64().is_some_and(|v| v >= n)
        })
    }

    /// Number must be at most `n`.
    pub fn max(n: f64, message: impl Into<String>) -> Self {
        Self::new(RuleKind::Max, message, move |value| {
            value.as_f64().is_some_and(|v| v <= n)
        })
    }

    /// Caller-supplied predicate; passes when the predicate returns true.
    pub fn custom(
        message: impl Into<String>,
        check: impl Fn(&Model) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(RuleKind::Custom, message, check)
    }

    /// Add a group tag to this rule (builder pattern).
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Add several group tags to this rule (builder pattern).
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// The kind of this rule.
    #[inline]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// The rendered message for this rule.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The group tags this rule belongs to.
    #[inline]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Evaluate the rule's predicate against a value.
    #[inline]
    pub fn check(&self, value: &Model) -> bool {
        (self.check)(value)
    }

    /// Whether this rule runs under the given group filter.
    #[inline]
    pub fn runs_in(&self, filter: &GroupFilter) -> bool {
        filter.selects(&self.groups)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

/// Selects which rules participate in a validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GroupFilter {
    /// Run every rule, grouped or not.
    #[default]
    All,
    /// Run only rules tagged with at least one of these groups.
    Only(Vec<String>),
}

impl GroupFilter {
    /// The unrestricted filter.
    #[inline]
    pub fn all() -> Self {
        GroupFilter::All
    }

    /// Restrict to rules carrying at least one of the given groups.
    pub fn only<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupFilter::Only(groups.into_iter().map(Into::into).collect())
    }

    /// Whether a rule with the given group tags is selected.
    pub fn selects(&self, groups: &[String]) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::Only(wanted) => groups.iter().any(|g| wanted.contains(g)),
        }
    }
}
