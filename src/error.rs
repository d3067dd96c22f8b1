//! Fault types for the form core.
//!
//! Faults are contract violations: unknown fields, bad indices, rule-table
//! misuse. They are distinct from validation errors, which are ordinary
//! data surfaced through field bindings and never travel through
//! `FormError`.

use crate::FieldPath;
use thiserror::Error;

/// Result type alias for form-core operations.
pub type FormResult<T> = Result<T, FormError>;

/// Faults raised by form-core operations.
///
/// The core performs no recovery or retry; every fault propagates
/// synchronously to the caller.
#[derive(Debug, Error)]
pub enum FormError {
    /// A binding or mutation named a field the model node does not have.
    #[error("unknown field: {path}")]
    UnknownField {
        /// The path that was requested.
        path: FieldPath,
    },

    /// Array index is out of bounds.
    #[error("index {index} out of bounds (len: {len}) at {path}")]
    IndexOutOfBounds {
        /// The path to the array.
        path: FieldPath,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the array.
        len: usize,
    },

    /// A node had a different kind than the operation requires.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path where the mismatch occurred.
        path: FieldPath,
        /// The expected kind.
        expected: &'static str,
        /// The actual kind found.
        found: &'static str,
    },

    /// The rule table was used in a way it was not declared for.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Description of the misuse.
        message: String,
    },
}

impl FormError {
    /// Create an unknown field error.
    #[inline]
    pub fn unknown_field(path: FieldPath) -> Self {
        FormError::UnknownField { path }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: FieldPath, index: usize, len: usize) -> Self {
        FormError::IndexOutOfBounds { path, index, len }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: FieldPath, expected: &'static str, found: &'static str) -> Self {
        FormError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    /// Create an invalid schema error.
    #[inline]
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        FormError::InvalidSchema {
            message: message.into(),
        }
    }

    /// Re-root path-carrying variants under a prefix.
    ///
    /// Used when descending into nested fields so a fault raised at a
    /// subtree's local path reports the full path: a mismatch at `city`
    /// inside `address` becomes a mismatch at `address.city`.
    pub fn with_prefix(self, prefix: &FieldPath) -> Self {
        match self {
            FormError::UnknownField { path } => FormError::UnknownField {
                path: prefix.join(&path),
            },
            FormError::IndexOutOfBounds { path, index, len } => FormError::IndexOutOfBounds {
                path: prefix.join(&path),
                index,
                len,
            },
            FormError::TypeMismatch {
                path,
                expected,
                found,
            } => FormError::TypeMismatch {
                path: prefix.join(&path),
                expected,
                found,
            },
            other => other,
        }
    }
}
