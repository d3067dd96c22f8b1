//! Path-keyed rule table.
//!
//! `Schema` is the provided [`Validator`]: an ordered table mapping field
//! names to rules plus optional nested schemas for object and sequence
//! fields. It is built once at schema-definition time and walked against
//! the live model tree on every validation pass.

use crate::{
    Constraint, FieldPath, FormError, FormResult, GroupFilter, Model, Rule, ValidationError,
    Validator,
};
use std::sync::Arc;

/// Rules attached to one field.
#[derive(Clone, Debug, Default)]
struct FieldRules {
    rules: Vec<Rule>,
    nested: Option<Nested>,
}

/// Nested rule table for object and sequence fields.
#[derive(Clone, Debug)]
enum Nested {
    Object(Arc<Schema>),
    Array(Arc<Schema>),
}

/// An ordered rule table for one object type.
///
/// # Examples
///
/// ```
/// use valiform::{Model, Rule, Schema, GroupFilter, IMMEDIATE, Validator};
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .field("name", [
///         Rule::not_empty("Name is required").with_group(IMMEDIATE),
///         Rule::min_length(1, "Name is too short"),
///     ]);
///
/// let model = Model::from(json!({"name": ""}));
/// let errors = schema.validate(&model, &GroupFilter::all()).unwrap();
/// assert_eq!(errors[0].constraints.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<(String, FieldRules)>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut FieldRules {
        if let Some(pos) = self.fields.iter().position(|(k, _)| k == name) {
            return &mut self.fields[pos].1;
        }
        self.fields.push((name.to_owned(), FieldRules::default()));
        &mut self.fields.last_mut().expect("just pushed").1
    }

    /// Attach rules to a field (builder pattern). Repeated calls append.
    pub fn field(mut self, name: &str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.entry(name).rules.extend(rules);
        self
    }

    /// Declare a field as a nested object validated by `schema`.
    ///
    /// A null value skips the nested pass; pair with [`Rule::defined`] to
    /// require presence.
    pub fn object(mut self, name: &str, schema: Schema) -> Self {
        self.entry(name).nested = Some(Nested::Object(Arc::new(schema)));
        self
    }

    /// Declare a field as a sequence whose elements are validated by
    /// `schema`.
    pub fn array(mut self, name: &str, schema: Schema) -> Self {
        self.entry(name).nested = Some(Nested::Array(Arc::new(schema)));
        self
    }

    fn find(&self, name: &str) -> FormResult<&FieldRules> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, fr)| fr)
            .ok_or_else(|| {
                FormError::invalid_schema(format!("no rules declared for field `{name}`"))
            })
    }
}

impl Validator for Schema {
    fn validate(&self, model: &Model, filter: &GroupFilter) -> FormResult<Vec<ValidationError>> {
        if !model.is_object() {
            return Err(FormError::type_mismatch(
                FieldPath::root(),
                "object",
                model.kind(),
            ));
        }

        let null = Model::Null;
        let mut out = Vec::new();

        for (name, field_rules) in &self.fields {
            let value: &Model = model.get(name).map(|v| v.as_ref()).unwrap_or(&null);
            let mut error = ValidationError::new(name.clone());

            for rule in &field_rules.rules {
                if rule.runs_in(filter) && !rule.check(value) {
                    error
                        .constraints
                        .push(Constraint::new(rule.kind(), rule.message()));
                }
            }

            match &field_rules.nested {
                Some(Nested::Object(schema)) => match value {
                    Model::Object(_) => {
                        error.children = schema
                            .validate(value, filter)
                            .map_err(|e| e.with_prefix(&FieldPath::root().field(name.as_str())))?;
                    }
                    Model::Null => {}
                    other => {
                        return Err(FormError::type_mismatch(
                            FieldPath::root().field(name.as_str()),
                            "object",
                            other.kind(),
                        ))
                    }
                },
                Some(Nested::Array(schema)) => match value {
                    Model::Array(items) => {
                        for (i, item) in items.iter().enumerate() {
                            let item_path = FieldPath::root().field(name.as_str()).index(i);
                            if !item.is_object() {
                                return Err(FormError::type_mismatch(
                                    item_path,
                                    "object",
                                    item.kind(),
                                ));
                            }
                            let item_errors = schema
                                .validate(item, filter)
                                .map_err(|e| e.with_prefix(&item_path))?;
                            if !item_errors.is_empty() {
                                let mut child = ValidationError::new(i.to_string());
                                child.children = item_errors;
                                error.children.push(child);
                            }
                        }
                    }
                    Model::Null => {}
                    other => {
                        return Err(FormError::type_mismatch(
                            FieldPath::root().field(name.as_str()),
                            "array",
                            other.kind(),
                        ))
                    }
                },
                None => {}
            }

            if !error.is_empty() {
                out.push(error);
            }
        }

        Ok(out)
    }

    fn object_rules(&self, field: &str) -> FormResult<&dyn Validator> {
        match &self.find(field)?.nested {
            Some(Nested::Object(schema)) => Ok(schema.as_ref()),
            Some(Nested::Array(_)) => Err(FormError::invalid_schema(format!(
                "field `{field}` is declared as a sequence, not a nested object"
            ))),
            None => Err(FormError::invalid_schema(format!(
                "field `{field}` has no nested object rules"
            ))),
        }
    }

    fn element_rules(&self, field: &str) -> FormResult<&dyn Validator> {
        match &self.find(field)?.nested {
            Some(Nested::Array(schema)) => Ok(schema.as_ref()),
            Some(Nested::Object(_)) => Err(FormError::invalid_schema(format!(
                "field `{field}` is declared as a nested object, not a sequence"
            ))),
            None => Err(FormError::invalid_schema(format!(
                "field `{field}` has no element rules"
            ))),
        }
    }
}
