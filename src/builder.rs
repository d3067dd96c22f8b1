//! Recursive form builders.
//!
//! A builder binds one model node to field-level input bindings. It is an
//! ephemeral value: constructed for a single read cycle, it runs the two
//! validation passes eagerly, hands out [`InputProps`] per field, and
//! descends into nested object and sequence fields with fresh builders.
//! All mutation flows outward through the [`Mutator`] chain, each ancestor
//! repeating the copy-with-one-field-replaced step on its own node until a
//! fully new root reaches the state owner.

use crate::{
    collect_errors, FieldPath, FormResult, GroupFilter, Model, ValidationError, Validator,
    IMMEDIATE,
};
use std::sync::Arc;
use tracing::trace;

/// The `currentTarget` of a [`FieldEvent`]: which field, and what value.
#[derive(Clone, Debug)]
pub struct FieldTarget {
    /// Local name of the field the event refers to.
    pub name: String,
    /// The field's (new) value.
    pub value: Arc<Model>,
}

/// A change or blur event delivered to a field binding.
#[derive(Clone, Debug)]
pub struct FieldEvent {
    /// The field the event targets.
    pub current_target: FieldTarget,
}

impl FieldEvent {
    /// Create an event for a field.
    pub fn new(name: impl Into<String>, value: impl Into<Arc<Model>>) -> Self {
        Self {
            current_target: FieldTarget {
                name: name.into(),
                value: value.into(),
            },
        }
    }
}

/// The mutator contract a builder uses to reach its ancestor.
///
/// `set_model` receives a brand-new node for the builder's subtree and is
/// responsible for folding it into the ancestor's own node. The blur
/// callbacks receive paths local to the builder; each ancestor prefixes
/// them with its own segment on the way up, which is what keeps colliding
/// local names at different depths independent.
pub struct Mutator<'a> {
    set_model: Box<dyn Fn(Arc<Model>) -> FormResult<()> + 'a>,
    field_has_blurred: Box<dyn Fn(&FieldPath) -> bool + 'a>,
    add_blurred_field: Box<dyn Fn(&FieldPath) + 'a>,
}

impl<'a> Mutator<'a> {
    /// Create a mutator from its three callbacks.
    pub fn new(
        set_model: impl Fn(Arc<Model>) -> FormResult<()> + 'a,
        field_has_blurred: impl Fn(&FieldPath) -> bool + 'a,
        add_blurred_field: impl Fn(&FieldPath) + 'a,
    ) -> Self {
        Self {
            set_model: Box::new(set_model),
            field_has_blurred: Box::new(field_has_blurred),
            add_blurred_field: Box::new(add_blurred_field),
        }
    }

    /// Push a replacement for this builder's subtree to the ancestor.
    #[inline]
    pub fn set_model(&self, model: Arc<Model>) -> FormResult<()> {
        (self.set_model)(model)
    }

    /// Whether the given local path has blurred.
    #[inline]
    pub fn field_has_blurred(&self, path: &FieldPath) -> bool {
        (self.field_has_blurred)(path)
    }

    /// Record the given local path as blurred.
    #[inline]
    pub fn add_blurred_field(&self, path: &FieldPath) {
        (self.add_blurred_field)(path)
    }
}

impl std::fmt::Debug for Mutator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutator").finish_non_exhaustive()
    }
}

/// Field bindings for one model node.
///
/// Construction eagerly runs the immediate-group pass and the full pass
/// over the node's subtree; both results are reused for every binding
/// request against this builder. Builders are not retained across reads.
pub struct ValidatedFormBuilder<'a> {
    model: Arc<Model>,
    rules: &'a dyn Validator,
    mutator: Mutator<'a>,
    immediate_errors: Vec<ValidationError>,
    all_errors: Vec<ValidationError>,
}

impl<'a> ValidatedFormBuilder<'a> {
    /// Build over a model node with its rule table and mutator.
    ///
    /// Validation-engine faults propagate unchanged.
    pub fn new(
        model: Arc<Model>,
        rules: &'a dyn Validator,
        mutator: Mutator<'a>,
    ) -> FormResult<Self> {
        let immediate_errors = rules.validate(&model, &GroupFilter::only([IMMEDIATE]))?;
        let all_errors = rules.validate(&model, &GroupFilter::all())?;
        Ok(Self {
            model,
            rules,
            mutator,
            immediate_errors,
            all_errors,
        })
    }

    /// The model node this builder is bound to.
    #[inline]
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Binding descriptor for one field: current value, handlers, and the
    /// rendered error list for the field's current blur tier.
    pub fn input_props_for<'b>(&'b self, field: &str) -> FormResult<InputProps<'b, 'a>> {
        let value = self.model.field(field)?.clone();
        Ok(InputProps {
            name: field.to_owned(),
            value,
            errors: self.render_errors(field),
            builder: self,
        })
    }

    /// Child builder for a nested object field.
    ///
    /// The child's mutator folds replacements through this builder's own
    /// change logic and qualifies blur paths as `"{field}.{sub}"`.
    pub fn builder_for_object<'b>(&'b self, field: &str) -> FormResult<ValidatedFormBuilder<'b>> {
        let sub_model = self.model.field(field)?.clone();
        let rules = self.rules.object_rules(field)?;
        ValidatedFormBuilder::new(sub_model, rules, self.mutator_for(field))
    }

    /// Child builder for a sequence field.
    pub fn builder_for_array<'b>(
        &'b self,
        field: &str,
    ) -> FormResult<ValidatedArrayFormBuilder<'b>> {
        let sub_model = self.model.field(field)?.clone();
        let rules = self.rules.element_rules(field)?;
        ValidatedArrayFormBuilder::new(sub_model, rules, self.mutator_for(field))
            .map_err(|e| e.with_prefix(&FieldPath::root().field(field)))
    }

    fn mutator_for<'b>(&'b self, field: &str) -> Mutator<'b> {
        let change_name = field.to_owned();
        let has_name = field.to_owned();
        let add_name = field.to_owned();
        Mutator::new(
            move |sub_model| self.change(&change_name, sub_model),
            move |path| {
                self.mutator
                    .field_has_blurred(&path.prefixed(has_name.as_str()))
            },
            move |path| {
                self.mutator
                    .add_blurred_field(&path.prefixed(add_name.as_str()))
            },
        )
    }

    fn change(&self, field: &str, value: Arc<Model>) -> FormResult<()> {
        trace!(field, "field changed");
        let next = self.model.with_field(field, value)?;
        self.mutator.set_model(Arc::new(next))
    }

    fn blur(&self, field: &str) {
        trace!(field, "field blurred");
        self.mutator
            .add_blurred_field(&FieldPath::root().field(field));
    }

    fn render_errors(&self, field: &str) -> Vec<String> {
        let local = FieldPath::root().field(field);
        if self.mutator.field_has_blurred(&local) {
            collect_errors(&self.all_errors, field)
        } else {
            collect_errors(&self.immediate_errors, field)
        }
    }
}

impl std::fmt::Debug for ValidatedFormBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedFormBuilder")
            .field("model", &self.model.kind())
            .field("immediate_errors", &self.immediate_errors.len())
            .field("all_errors", &self.all_errors.len())
            .finish_non_exhaustive()
    }
}

/// The binding descriptor for one field.
///
/// `errors` holds the full-pass messages once the field's path has
/// blurred, and the immediate-pass messages before that. It is always
/// present; a clean field simply carries an empty list.
pub struct InputProps<'b, 'a> {
    /// Local field name.
    pub name: String,
    /// Current value of the field.
    pub value: Arc<Model>,
    /// Rendered error messages for the field's current blur tier.
    pub errors: Vec<String>,
    builder: &'b ValidatedFormBuilder<'a>,
}

impl InputProps<'_, '_> {
    /// Handle a change event: copy-override the model and push the new
    /// root to the state owner. Targets the field named in the event.
    pub fn on_change(&self, event: FieldEvent) -> FormResult<()> {
        self.builder
            .change(&event.current_target.name, event.current_target.value)
    }

    /// Handle a blur event: record the event's field path as blurred.
    pub fn on_blur(&self, event: FieldEvent) {
        self.builder.blur(&event.current_target.name);
    }

    /// Change this binding's own field to a new value.
    pub fn change(&self, value: impl Into<Arc<Model>>) -> FormResult<()> {
        self.builder.change(&self.name, value.into())
    }

    /// Blur this binding's own field.
    pub fn blur(&self) {
        self.builder.blur(&self.name);
    }
}

impl std::fmt::Debug for InputProps<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputProps")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

/// Builder specialization for sequence fields.
///
/// Runs no validation of its own; element builders validate their element
/// subtree. Replacing an element rebuilds the array with the same length,
/// every sibling element keeping its identity.
pub struct ValidatedArrayFormBuilder<'a> {
    model: Arc<Model>,
    rules: &'a dyn Validator,
    mutator: Mutator<'a>,
}

impl<'a> ValidatedArrayFormBuilder<'a> {
    /// Build over an array node with the per-element rule table.
    pub fn new(
        model: Arc<Model>,
        rules: &'a dyn Validator,
        mutator: Mutator<'a>,
    ) -> FormResult<Self> {
        if !model.is_array() {
            return Err(crate::FormError::type_mismatch(
                FieldPath::root(),
                "array",
                model.kind(),
            ));
        }
        Ok(Self {
            model,
            rules,
            mutator,
        })
    }

    /// The array node this builder is bound to.
    #[inline]
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.model.as_array().map_or(0, |items| items.len())
    }

    /// True if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builder for the element at `index`.
    ///
    /// The element's mutator replaces only that index in a copy of the
    /// array and qualifies blur paths as `"{index}.{sub}"`.
    pub fn builder_for_element<'b>(&'b self, index: usize) -> FormResult<ValidatedFormBuilder<'b>> {
        let element = self.model.element(index)?.clone();
        let mutator = Mutator::new(
            move |new_element| {
                let next = self.model.with_element(index, new_element)?;
                self.mutator.set_model(Arc::new(next))
            },
            move |path| self.mutator.field_has_blurred(&path.prefixed(index)),
            move |path| self.mutator.add_blurred_field(&path.prefixed(index)),
        );
        ValidatedFormBuilder::new(element, self.rules, mutator)
    }
}

impl std::fmt::Debug for ValidatedArrayFormBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedArrayFormBuilder")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{path, FormError, FormState, Rule, Schema};
    use serde_json::json;
    use std::sync::Mutex;

    fn schema() -> Schema {
        Schema::new()
            .field(
                "name",
                [
                    Rule::not_empty("Name is required").with_group(IMMEDIATE),
                    Rule::min_length(1, "Name is too short"),
                ],
            )
            .object(
                "address",
                Schema::new().field("street", [Rule::not_empty("Street is required")]),
            )
            .array(
                "subModels",
                Schema::new().field(
                    "name",
                    [Rule::not_empty("Sub name is required").with_group(IMMEDIATE)],
                ),
            )
    }

    fn model() -> Arc<Model> {
        Arc::new(Model::from(json!({
            "name": "",
            "address": {"street": ""},
            "subModels": [{"name": ""}],
        })))
    }

    struct Harness {
        model: Mutex<Option<Arc<Model>>>,
        state: Mutex<FormState>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                model: Mutex::new(None),
                state: Mutex::new(FormState::new()),
            }
        }

        fn mutator(&self) -> Mutator<'_> {
            Mutator::new(
                move |m| {
                    *self.model.lock().unwrap() = Some(m);
                    Ok(())
                },
                move |p| self.state.lock().unwrap().has_blurred(p),
                move |p| {
                    let mut state = self.state.lock().unwrap();
                    let next = state.with_blurred(p.clone());
                    *state = next;
                },
            )
        }

        fn pushed_model(&self) -> Arc<Model> {
            self.model.lock().unwrap().clone().expect("no model pushed")
        }
    }

    #[test]
    fn test_two_tier_error_rendering() {
        let harness = Harness::new();
        let schema = schema();
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator()).unwrap();

        // Never blurred: immediate tier only
        let props = builder.input_props_for("name").unwrap();
        assert_eq!(props.errors, ["Name is required"]);

        props.blur();

        // Same snapshot, next builder sees the full tier
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator()).unwrap();
        let props = builder.input_props_for("name").unwrap();
        assert_eq!(props.errors, ["Name is required", "Name is too short"]);
    }

    #[test]
    fn test_change_pushes_new_model_without_mutating_input() {
        let harness = Harness::new();
        let schema = schema();
        let original = model();
        let builder =
            ValidatedFormBuilder::new(original.clone(), &schema, harness.mutator()).unwrap();

        let props = builder.input_props_for("name").unwrap();
        props.change(Model::from("John")).unwrap();

        let pushed = harness.pushed_model();
        assert!(!Arc::ptr_eq(&pushed, &original));
        assert_eq!(pushed.field("name").unwrap().as_str(), Some("John"));
        // Input untouched, untouched siblings shared
        assert_eq!(original.field("name").unwrap().as_str(), Some(""));
        assert!(Arc::ptr_eq(
            original.field("address").unwrap(),
            pushed.field("address").unwrap()
        ));
    }

    #[test]
    fn test_on_change_targets_event_field() {
        let harness = Harness::new();
        let schema = schema();
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator()).unwrap();

        let props = builder.input_props_for("name").unwrap();
        props
            .on_change(FieldEvent::new("name", Model::from("Jo")))
            .unwrap();
        assert_eq!(
            harness.pushed_model().field("name").unwrap().as_str(),
            Some("Jo")
        );
    }

    #[test]
    fn test_unknown_field_is_fault() {
        let harness = Harness::new();
        let schema = schema();
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator()).unwrap();

        assert!(matches!(
            builder.input_props_for("nick").unwrap_err(),
            FormError::UnknownField { .. }
        ));
        let props = builder.input_props_for("name").unwrap();
        let err = props
            .on_change(FieldEvent::new("nick", Model::from("x")))
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownField { .. }));
    }

    #[test]
    fn test_nested_object_change_propagates_to_root() {
        let harness = Harness::new();
        let schema = schema();
        let original = model();
        let builder =
            ValidatedFormBuilder::new(original.clone(), &schema, harness.mutator()).unwrap();

        let address = builder.builder_for_object("address").unwrap();
        let street = address.input_props_for("street").unwrap();
        assert_eq!(street.errors, Vec::<String>::new()); // not immediate, not blurred
        street.change(Model::from("Main")).unwrap();

        let pushed = harness.pushed_model();
        assert_eq!(
            pushed
                .at_path(&path!("address", "street"))
                .unwrap()
                .as_str(),
            Some("Main")
        );
        // Root sibling untouched by the nested change
        assert!(Arc::ptr_eq(
            original.field("subModels").unwrap(),
            pushed.field("subModels").unwrap()
        ));
    }

    #[test]
    fn test_nested_blur_is_qualified() {
        let harness = Harness::new();
        let schema = schema();
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator()).unwrap();

        let address = builder.builder_for_object("address").unwrap();
        address.input_props_for("street").unwrap().blur();

        let state = harness.state.lock().unwrap().clone();
        assert_eq!(state.blurred_fields(), [path!("address", "street")]);
        assert!(!state.has_blurred(&path!("street")));
    }

    #[test]
    fn test_array_element_blur_is_qualified() {
        let harness = Harness::new();
        let schema = schema();
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator()).unwrap();

        let subs = builder.builder_for_array("subModels").unwrap();
        let first = subs.builder_for_element(0).unwrap();
        first.input_props_for("name").unwrap().blur();

        let state = harness.state.lock().unwrap().clone();
        assert!(state.has_blurred(&path!("subModels", 0, "name")));
        assert!(!state.has_blurred(&path!("name")));
    }

    #[test]
    fn test_array_element_replacement_shares_siblings() {
        let harness = Harness::new();
        let schema = schema();
        let original = Arc::new(Model::from(json!({
            "name": "x",
            "address": {"street": "s"},
            "subModels": [{"name": "a"}, {"name": "b"}],
        })));
        let builder =
            ValidatedFormBuilder::new(original.clone(), &schema, harness.mutator()).unwrap();

        let subs = builder.builder_for_array("subModels").unwrap();
        assert_eq!(subs.len(), 2);
        let second = subs.builder_for_element(1).unwrap();
        second
            .input_props_for("name")
            .unwrap()
            .change(Model::from("B"))
            .unwrap();

        let pushed = harness.pushed_model();
        let old_items = original.field("subModels").unwrap().as_array().unwrap();
        let new_items = pushed.field("subModels").unwrap().as_array().unwrap();
        assert_eq!(new_items.len(), 2);
        assert!(Arc::ptr_eq(&old_items[0], &new_items[0]));
        assert_eq!(
            new_items[1].field("name").unwrap().as_str(),
            Some("B")
        );
    }

    #[test]
    fn test_element_out_of_range_is_fault() {
        let harness = Harness::new();
        let schema = schema();
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator()).unwrap();

        let subs = builder.builder_for_array("subModels").unwrap();
        assert!(matches!(
            subs.builder_for_element(7).unwrap_err(),
            FormError::IndexOutOfBounds { index: 7, len: 1, .. }
        ));
    }

    #[test]
    fn test_builder_for_array_on_non_array_is_fault() {
        let harness = Harness::new();
        // Misdeclared schema: "name" marked as a sequence
        let schema = Schema::new().array("name", Schema::new());
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator());
        // Scalar under an array declaration faults during validation already
        assert!(builder.is_err());
    }

    #[test]
    fn test_descending_into_undeclared_field_is_fault() {
        let harness = Harness::new();
        let schema = schema();
        let builder = ValidatedFormBuilder::new(model(), &schema, harness.mutator()).unwrap();
        assert!(matches!(
            builder.builder_for_object("name").unwrap_err(),
            FormError::InvalidSchema { .. }
        ));
    }
}
