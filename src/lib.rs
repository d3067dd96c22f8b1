//! Validated form state: recursive builders binding immutable models to
//! field-level input bindings.
//!
//! `valiform` tracks per-field validation errors and per-field blurred
//! status over an arbitrarily nested model tree, with every mutation
//! producing a brand-new model value. Builders are ephemeral: a fresh one
//! is constructed from the owner's `(model, state)` snapshot on every read
//! cycle, runs two validation passes (the `immediate` group, then all
//! rules), and exposes bindings whose handlers push replacements back to
//! the owner.
//!
//! # Core Concepts
//!
//! - **Model**: persistent data tree with `Arc`-shared children; updates
//!   copy one node and override one field, sharing untouched branches
//! - **FieldPath**: dot-joined address of a field, with bare integer
//!   segments for array indices (`subModels.0.name`)
//! - **Schema**: ordered rule table keyed by field name, with nested
//!   tables for object and sequence fields; the provided [`Validator`]
//! - **FormState**: the path-qualified blurred-field set; blurring a
//!   field switches its rendered errors from the immediate tier to the
//!   full tier
//! - **ValidatedFormBuilder**: bindings for one model node, descending
//!   into nested fields with fresh builders
//! - **StateOwner**: the external slot the core pushes replacement
//!   models and states into
//!
//! # Quick Start
//!
//! ```
//! use valiform::{
//!     FormSession, FormValidator, Model, Rule, Schema, IMMEDIATE,
//! };
//! use serde_json::json;
//!
//! let schema = Schema::new().field("name", [
//!     Rule::not_empty("Name is required").with_group(IMMEDIATE),
//!     Rule::min_length(2, "Name is too short"),
//! ]);
//!
//! let session = FormSession::new(Model::from(json!({"name": ""})));
//! let form = FormValidator::new(&session, &schema);
//!
//! // Read cycle: snapshot -> builder -> bindings
//! let (model, state) = session.snapshot();
//! let builder = form.builder_for_model(model, &state).unwrap();
//! let name = builder.input_props_for("name").unwrap();
//!
//! // Untouched field renders the immediate tier only
//! assert_eq!(name.errors, ["Name is required"]);
//!
//! name.blur();
//!
//! // The next read renders the full tier for the blurred path
//! let (model, state) = session.snapshot();
//! let builder = form.builder_for_model(model, &state).unwrap();
//! let name = builder.input_props_for("name").unwrap();
//! assert_eq!(name.errors, ["Name is required", "Name is too short"]);
//! ```

mod builder;
mod error;
mod form;
mod model;
mod path;
mod rule;
mod schema;
mod state;
mod validate;

pub use builder::{
    FieldEvent, FieldTarget, InputProps, Mutator, ValidatedArrayFormBuilder, ValidatedFormBuilder,
};
pub use error::{FormError, FormResult};
pub use form::{FormSession, FormValidator, StateOwner};
pub use model::Model;
pub use path::{FieldPath, Seg};
pub use rule::{GroupFilter, Rule, RuleKind, IMMEDIATE};
pub use schema::Schema;
pub use state::FormState;
pub use validate::{collect_errors, Constraint, ValidationError, Validator};

// Re-export serde_json::Value for convenience in model conversions.
pub use serde_json::Value;
