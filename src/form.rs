//! Form entry point and the state-owner contract.
//!
//! `FormValidator` wires a root builder to an external state owner. The
//! relationship is pull-based: the owner hands the core a `(model, state)`
//! snapshot, the core pushes full-value replacements back, and the owner
//! is responsible for re-entering `builder_for_model` with the updated
//! snapshot on the next read cycle. Nothing is cached across calls.

use crate::{FormResult, FormState, Model, Mutator, ValidatedFormBuilder, Validator};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// The external owner of the current model and form state.
///
/// Called with full replacement values on every mutation; implementations
/// use interior mutability. The core never subscribes to or polls the
/// owner.
pub trait StateOwner {
    /// Replace the current model.
    fn set_model(&self, model: Arc<Model>);

    /// Replace the current form state.
    fn set_form_state(&self, state: FormState);
}

/// Top-level factory producing root builders against owner snapshots.
pub struct FormValidator<'a> {
    owner: &'a dyn StateOwner,
    rules: &'a dyn Validator,
}

impl<'a> FormValidator<'a> {
    /// Wire a validator to a state owner and a rule table.
    pub fn new(owner: &'a dyn StateOwner, rules: &'a dyn Validator) -> Self {
        Self { owner, rules }
    }

    /// Root builder over a `(model, state)` snapshot.
    ///
    /// The root mutator operates at the empty path: model replacements go
    /// straight to the owner's model slot, and blur reads/writes hit the
    /// owner's blur set unqualified. Recording an already-blurred path is
    /// a no-op and does not touch the owner.
    pub fn builder_for_model<'s>(
        &'s self,
        model: Arc<Model>,
        state: &'s FormState,
    ) -> FormResult<ValidatedFormBuilder<'s>> {
        let mutator = Mutator::new(
            move |new_model| {
                debug!("replacing root model");
                self.owner.set_model(new_model);
                Ok(())
            },
            move |path| state.has_blurred(path),
            move |path| {
                if state.has_blurred(path) {
                    return;
                }
                debug!(path = %path, "recording blurred field");
                self.owner.set_form_state(state.with_blurred(path.clone()));
            },
        );
        ValidatedFormBuilder::new(model, self.rules, mutator)
    }
}

impl std::fmt::Debug for FormValidator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormValidator").finish_non_exhaustive()
    }
}

/// A `Mutex`-backed state owner holding the `(model, state)` pair.
///
/// This is the reference owner implementation; hosts with their own
/// storage implement [`StateOwner`] directly. Reads hand out the current
/// snapshot; writes replace whole values, never mutate in place.
pub struct FormSession {
    inner: Mutex<(Arc<Model>, FormState)>,
}

impl FormSession {
    /// Create a session owning the given initial model.
    pub fn new(model: Model) -> Self {
        Self {
            inner: Mutex::new((Arc::new(model), FormState::new())),
        }
    }

    /// The current `(model, state)` snapshot.
    pub fn snapshot(&self) -> (Arc<Model>, FormState) {
        let guard = self.inner.lock().unwrap();
        (guard.0.clone(), guard.1.clone())
    }

    /// The current model.
    pub fn model(&self) -> Arc<Model> {
        self.inner.lock().unwrap().0.clone()
    }

    /// The current form state.
    pub fn form_state(&self) -> FormState {
        self.inner.lock().unwrap().1.clone()
    }
}

impl StateOwner for FormSession {
    fn set_model(&self, model: Arc<Model>) {
        self.inner.lock().unwrap().0 = model;
    }

    fn set_form_state(&self, state: FormState) {
        self.inner.lock().unwrap().1 = state;
    }
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (model, state) = self.snapshot();
        f.debug_struct("FormSession")
            .field("model", &model.kind())
            .field("blurred", &state.blurred_fields().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{path, Model, Rule, Schema, IMMEDIATE};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new().field(
            "name",
            [
                Rule::not_empty("Name is required").with_group(IMMEDIATE),
                Rule::min_length(1, "Name is too short"),
            ],
        )
    }

    #[test]
    fn test_root_mutator_forwards_to_owner() {
        let session = FormSession::new(Model::from(json!({"name": ""})));
        let schema = schema();
        let validator = FormValidator::new(&session, &schema);

        let (model, state) = session.snapshot();
        let builder = validator.builder_for_model(model.clone(), &state).unwrap();
        builder
            .input_props_for("name")
            .unwrap()
            .change(Model::from("John"))
            .unwrap();

        let replaced = session.model();
        assert!(!Arc::ptr_eq(&replaced, &model));
        assert_eq!(replaced.field("name").unwrap().as_str(), Some("John"));
    }

    #[test]
    fn test_blur_writes_are_idempotent_against_owner() {
        let session = FormSession::new(Model::from(json!({"name": ""})));
        let schema = schema();
        let validator = FormValidator::new(&session, &schema);

        let (model, state) = session.snapshot();
        let builder = validator.builder_for_model(model, &state).unwrap();
        let props = builder.input_props_for("name").unwrap();
        props.blur();
        props.blur();

        // Second blur against the same snapshot is a no-op
        assert_eq!(session.form_state().blurred_fields(), [path!("name")]);

        // And against the refreshed snapshot too
        let (model, state) = session.snapshot();
        let builder = validator.builder_for_model(model, &state).unwrap();
        builder.input_props_for("name").unwrap().blur();
        assert_eq!(session.form_state().blurred_fields(), [path!("name")]);
    }

    #[test]
    fn test_no_caching_across_reads() {
        let session = FormSession::new(Model::from(json!({"name": ""})));
        let schema = schema();
        let validator = FormValidator::new(&session, &schema);

        let (model, state) = session.snapshot();
        let builder = validator.builder_for_model(model, &state).unwrap();
        assert_eq!(
            builder.input_props_for("name").unwrap().errors,
            ["Name is required"]
        );
        builder
            .input_props_for("name")
            .unwrap()
            .change(Model::from("John"))
            .unwrap();

        // A fresh read reflects the replaced snapshot
        let (model, state) = session.snapshot();
        let builder = validator.builder_for_model(model, &state).unwrap();
        assert!(builder.input_props_for("name").unwrap().errors.is_empty());
    }
}
