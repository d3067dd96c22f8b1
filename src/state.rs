//! Blur tracking for a form session.
//!
//! `FormState` records which field paths the user has blurred. The set is
//! path-qualified, so two fields sharing a local name at different depths
//! have independent status. Paths are only ever added for the lifetime of
//! a session; no reset operation is exposed.

use crate::FieldPath;
use serde::{Deserialize, Serialize};

/// The blurred-path set owned by an external state owner.
///
/// Updates are immutable: [`FormState::with_blurred`] returns a new state
/// and never touches the receiver. Insertion order is preserved and
/// duplicates are forbidden, so serialized snapshots are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    blurred_fields: Vec<FieldPath>,
}

impl FormState {
    /// Create a state with no blurred fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the exact path has blurred.
    pub fn has_blurred(&self, path: &FieldPath) -> bool {
        self.blurred_fields.contains(path)
    }

    /// Return a new state with `path` recorded as blurred.
    ///
    /// Adding an already-present path returns an equal state; order of
    /// earlier entries is preserved.
    pub fn with_blurred(&self, path: FieldPath) -> FormState {
        if self.has_blurred(&path) {
            return self.clone();
        }
        let mut blurred_fields = self.blurred_fields.clone();
        blurred_fields.push(path);
        FormState { blurred_fields }
    }

    /// The blurred paths, in insertion order.
    pub fn blurred_fields(&self) -> &[FieldPath] {
        &self.blurred_fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn test_blur_is_path_qualified() {
        let state = FormState::new().with_blurred(path!("name"));
        assert!(state.has_blurred(&path!("name")));
        assert!(!state.has_blurred(&path!("subModels", 0, "name")));
    }

    #[test]
    fn test_with_blurred_is_idempotent() {
        let state = FormState::new()
            .with_blurred(path!("name"))
            .with_blurred(path!("age"))
            .with_blurred(path!("name"));
        assert_eq!(state.blurred_fields(), [path!("name"), path!("age")]);
    }

    #[test]
    fn test_with_blurred_leaves_original() {
        let state = FormState::new();
        let _ = state.with_blurred(path!("name"));
        assert!(state.blurred_fields().is_empty());
    }

    #[test]
    fn test_serde() {
        let state = FormState::new()
            .with_blurred(path!("name"))
            .with_blurred(path!("subModels", 0, "name"));
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"blurred_fields":["name","subModels.0.name"]}"#
        );
        let parsed: FormState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, parsed);
    }
}
