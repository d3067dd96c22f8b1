//! Persistent model tree with structurally-shared children.
//!
//! `Model` is the form's data tree: objects with named fields, arrays of
//! elements, and scalar leaves. Children are held behind `Arc`, so the
//! copy-with-one-field-replaced updates (`with_field`, `with_element`)
//! produce a new node while every untouched subtree keeps its identity.
//! Nothing in this module mutates a model in place.

use crate::{FieldPath, FormError, FormResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

/// One node of a form model.
///
/// # Examples
///
/// ```
/// use valiform::Model;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let model = Model::from(json!({"name": "", "age": 3}));
/// let next = model.with_field("name", Arc::new(Model::from("John"))).unwrap();
///
/// assert_eq!(next.field("name").unwrap().as_str(), Some("John"));
/// // The original is untouched
/// assert_eq!(model.field("name").unwrap().as_str(), Some(""));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Model {
    /// Absent / null leaf.
    Null,
    /// Boolean leaf.
    Bool(bool),
    /// Numeric leaf.
    Number(serde_json::Number),
    /// String leaf.
    String(String),
    /// Sequence of elements.
    Array(Vec<Arc<Model>>),
    /// Named fields in declaration order.
    Object(Vec<(String, Arc<Model>)>),
}

impl Model {
    /// Build a model from a JSON value.
    pub fn from_value(value: &Value) -> Model {
        match value {
            Value::Null => Model::Null,
            Value::Bool(b) => Model::Bool(*b),
            Value::Number(n) => Model::Number(n.clone()),
            Value::String(s) => Model::String(s.clone()),
            Value::Array(items) => {
                Model::Array(items.iter().map(|v| Arc::new(Model::from_value(v))).collect())
            }
            Value::Object(map) => Model::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Arc::new(Model::from_value(v))))
                    .collect(),
            ),
        }
    }

    /// Render this model as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Model::Null => Value::Null,
            Model::Bool(b) => Value::Bool(*b),
            Model::Number(n) => Value::Number(n.clone()),
            Model::String(s) => Value::String(s.clone()),
            Model::Array(items) => Value::Array(items.iter().map(|m| m.to_value()).collect()),
            Model::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, m)| (k.clone(), m.to_value()))
                    .collect(),
            ),
        }
    }

    /// The kind of this node, for diagnostics.
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Model::Null => "null",
            Model::Bool(_) => "boolean",
            Model::Number(_) => "number",
            Model::String(_) => "string",
            Model::Array(_) => "array",
            Model::Object(_) => "object",
        }
    }

    /// Returns true if this node is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Model::Null)
    }

    /// Returns true if this node is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Model::Object(_))
    }

    /// Returns true if this node is an array.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Model::Array(_))
    }

    /// Get the string value if this is a string leaf.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Model::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean value if this is a boolean leaf.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Model::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the numeric value as f64 if this is a number leaf.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Model::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Get the elements if this is an array node.
    #[inline]
    pub fn as_array(&self) -> Option<&[Arc<Model>]> {
        match self {
            Model::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get the fields if this is an object node.
    #[inline]
    pub fn as_object(&self) -> Option<&[(String, Arc<Model>)]> {
        match self {
            Model::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a field by name. Returns `None` for missing fields and
    /// non-object nodes.
    pub fn get(&self, name: &str) -> Option<&Arc<Model>> {
        match self {
            Model::Object(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a field by name; an unknown field is a fault.
    pub fn field(&self, name: &str) -> FormResult<&Arc<Model>> {
        match self {
            Model::Object(fields) => fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v)
                .ok_or_else(|| FormError::unknown_field(FieldPath::root().field(name))),
            other => Err(FormError::type_mismatch(
                FieldPath::root(),
                "object",
                other.kind(),
            )),
        }
    }

    /// Look up an array element by index; out of range is a fault.
    pub fn element(&self, index: usize) -> FormResult<&Arc<Model>> {
        match self {
            Model::Array(items) => items.get(index).ok_or_else(|| {
                FormError::index_out_of_bounds(FieldPath::root(), index, items.len())
            }),
            other => Err(FormError::type_mismatch(
                FieldPath::root(),
                "array",
                other.kind(),
            )),
        }
    }

    /// Return a new object node with exactly one field overridden.
    ///
    /// Every other field keeps its `Arc` identity; the receiver is not
    /// modified. Naming a field the node does not have is a fault.
    pub fn with_field(&self, name: &str, value: Arc<Model>) -> FormResult<Model> {
        match self {
            Model::Object(fields) => {
                if !fields.iter().any(|(k, _)| k == name) {
                    return Err(FormError::unknown_field(FieldPath::root().field(name)));
                }
                let fields = fields
                    .iter()
                    .map(|(k, v)| {
                        if k == name {
                            (k.clone(), value.clone())
                        } else {
                            (k.clone(), v.clone())
                        }
                    })
                    .collect();
                Ok(Model::Object(fields))
            }
            other => Err(FormError::type_mismatch(
                FieldPath::root(),
                "object",
                other.kind(),
            )),
        }
    }

    /// Return a new array node with exactly one element replaced.
    ///
    /// The result has the same length; every other element keeps its `Arc`
    /// identity. An out-of-range index is a fault.
    pub fn with_element(&self, index: usize, value: Arc<Model>) -> FormResult<Model> {
        match self {
            Model::Array(items) => {
                if index >= items.len() {
                    return Err(FormError::index_out_of_bounds(
                        FieldPath::root(),
                        index,
                        items.len(),
                    ));
                }
                let mut items: Vec<Arc<Model>> = items.to_vec();
                items[index] = value;
                Ok(Model::Array(items))
            }
            other => Err(FormError::type_mismatch(
                FieldPath::root(),
                "array",
                other.kind(),
            )),
        }
    }

    /// Navigate to the node at `path`, faulting on the first segment that
    /// cannot be resolved.
    pub fn at_path(&self, path: &FieldPath) -> FormResult<&Model> {
        let mut current = self;
        for (depth, seg) in path.iter().enumerate() {
            let next = match seg {
                crate::Seg::Field(name) => current.field(name),
                crate::Seg::Index(i) => current.element(*i),
            };
            current = next
                .map_err(|e| {
                    e.with_prefix(&FieldPath::from_segments(
                        path.segments()[..depth].to_vec(),
                    ))
                })?
                .as_ref();
        }
        Ok(current)
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Null
    }
}

impl From<Value> for Model {
    fn from(value: Value) -> Self {
        Model::from_value(&value)
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::String(s.to_owned())
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Model::String(s)
    }
}

impl From<bool> for Model {
    fn from(b: bool) -> Self {
        Model::Bool(b)
    }
}

impl From<i64> for Model {
    fn from(n: i64) -> Self {
        Model::Number(n.into())
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Model::from_value(&value))
    }
}
