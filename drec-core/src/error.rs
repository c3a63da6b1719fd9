use alloc::string::String;

use crate::{DType, Inferred};

/// Everything that can go wrong with a schema, a record or a JSON document.
///
/// Field-level variants are stored on the record they concern and read back
/// through its queries; only decoding returns them as `Err`.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DError {
    /// The schema declared the same key twice.
    DuplicateField {
        /// The repeated key
        key: String,
    },

    /// A key the schema does not declare.
    UnknownField {
        /// The key that was asked for
        key: String,
    },

    /// A declared field that has never been given a value.
    MissingValue {
        /// The unset key
        key: String,
    },

    /// Raw input could not be converted into a value for the field.
    ValidationFailed {
        /// The field the input was meant for
        key: String,
        /// The schema's custom message for this field, or a generated one
        message: String,
    },

    /// The value's type is not the one the schema declares.
    TypeMismatch {
        /// The field written to
        key: String,
        /// What the schema declares
        expected: DType,
        /// What the value turned out to be
        found: Inferred,
    },

    /// A JSON document did not match the schema, or was not JSON at all.
    DecodingFailed {
        /// Dotted path to the offending value (`entry.unit.abbr`, `tags[2]`);
        /// empty for the document itself
        path: String,
        /// What was wrong there
        reason: String,
    },

    /// Decoding was attempted against a schema without fields.
    NoSchema,

    /// A type that cannot hold values was used where one is needed.
    InvalidSchemaType {
        /// The field involved
        key: String,
        /// Why the type cannot be used
        reason: String,
    },
}

impl DError {
    /// The key this error is about, if it is about one.
    pub fn key(&self) -> Option<&str> {
        match self {
            DError::DuplicateField { key }
            | DError::UnknownField { key }
            | DError::MissingValue { key }
            | DError::ValidationFailed { key, .. }
            | DError::TypeMismatch { key, .. }
            | DError::InvalidSchemaType { key, .. } => Some(key),
            DError::DecodingFailed { .. } | DError::NoSchema => None,
        }
    }

    /// Builds a `DecodingFailed` for `path`.
    pub fn decoding(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DError::DecodingFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl core::fmt::Display for DError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DError::DuplicateField { key } => {
                write!(f, "Field `{}` is declared more than once", key)
            }
            DError::UnknownField { key } => write!(f, "Unknown field `{}`", key),
            DError::MissingValue { key } => write!(f, "Field `{}` has no value", key),
            DError::ValidationFailed { message, .. } => f.write_str(message),
            DError::TypeMismatch {
                key,
                expected,
                found,
            } => write!(
                f,
                "Field `{}` expects {}, but got {}",
                key, expected, found
            ),
            DError::DecodingFailed { path, reason } if path.is_empty() => {
                write!(f, "Could not decode JSON: {}", reason)
            }
            DError::DecodingFailed { path, reason } => {
                write!(f, "Could not decode JSON at `{}`: {}", path, reason)
            }
            DError::NoSchema => write!(f, "Cannot decode into a schema with no fields"),
            DError::InvalidSchemaType { key, reason } => {
                write!(f, "Field `{}` has an unusable type: {}", key, reason)
            }
        }
    }
}

impl core::error::Error for DError {}
