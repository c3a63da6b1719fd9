use core::fmt;

use crate::Schema;

/// The type a schema declares for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum DType {
    /// A field that can never hold a value. Writes to it are rejected.
    Never,
    /// `true` or `false`
    Bool,
    /// A single Unicode scalar value; JSON carries its code point.
    Char,
    /// A 64-bit float
    Float,
    /// A 64-bit signed integer
    Int,
    /// Any JSON value, kept as-is
    Json,
    /// Milliseconds since the Unix epoch
    Posix,
    /// A string
    String,
    /// A nested record described by another schema
    Record(Schema),
    /// A value that may be absent
    Optional(ElementType),
    /// An ordered sequence
    List(ElementType),
    /// An ordered, indexable sequence
    Array(ElementType),
}

/// What an optional, list or array may hold: scalars and nested records,
/// never another container.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// `true` or `false`
    Bool,
    /// A single Unicode scalar value
    Char,
    /// A 64-bit float
    Float,
    /// A 64-bit signed integer
    Int,
    /// Any JSON value
    Json,
    /// Milliseconds since the Unix epoch
    Posix,
    /// A string
    String,
    /// A nested record
    Record(Schema),
}

impl ElementType {
    /// The field type a single element of this kind has.
    pub fn to_dtype(&self) -> DType {
        match self {
            ElementType::Bool => DType::Bool,
            ElementType::Char => DType::Char,
            ElementType::Float => DType::Float,
            ElementType::Int => DType::Int,
            ElementType::Json => DType::Json,
            ElementType::Posix => DType::Posix,
            ElementType::String => DType::String,
            ElementType::Record(schema) => DType::Record(schema.clone()),
        }
    }

    /// The element kind for a field type, if that type may sit inside a container.
    ///
    /// Returns `None` for `Never` and for optionals and containers, which is
    /// what rules out containers of containers.
    pub fn from_dtype(ty: &DType) -> Option<Self> {
        Some(match ty {
            DType::Bool => ElementType::Bool,
            DType::Char => ElementType::Char,
            DType::Float => ElementType::Float,
            DType::Int => ElementType::Int,
            DType::Json => ElementType::Json,
            DType::Posix => ElementType::Posix,
            DType::String => ElementType::String,
            DType::Record(schema) => ElementType::Record(schema.clone()),
            DType::Never | DType::Optional(_) | DType::List(_) | DType::Array(_) => return None,
        })
    }
}

impl DType {
    /// The element type of an optional or container.
    pub fn element(&self) -> Option<&ElementType> {
        match self {
            DType::Optional(el) | DType::List(el) | DType::Array(el) => Some(el),
            _ => None,
        }
    }

    /// Returns `true` if a value classified as `found` may be stored in a field
    /// declared with this type.
    ///
    /// This is plain equality, except that an empty container or an absent
    /// optional carries no element type and fits any element type of the same
    /// shape.
    pub fn accepts(&self, found: &Inferred) -> bool {
        match (self, found) {
            (DType::Never, _) => false,
            (declared, Inferred::Type(actual)) => declared == actual,
            (DType::Optional(_), Inferred::UnknownOptional) => true,
            (DType::List(_), Inferred::UnknownList) => true,
            (DType::Array(_), Inferred::UnknownArray) => true,
            _ => false,
        }
    }
}

/// The type observed on a value.
///
/// Containers report their element type from their elements; when there are
/// none, only the container shape is known.
#[derive(Debug, Clone, PartialEq)]
pub enum Inferred {
    /// Fully known type
    Type(DType),
    /// `None`: an optional of some element type
    UnknownOptional,
    /// An empty list
    UnknownList,
    /// An empty array
    UnknownArray,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Bool => write!(f, "Bool"),
            ElementType::Char => write!(f, "Char"),
            ElementType::Float => write!(f, "Float"),
            ElementType::Int => write!(f, "Int"),
            ElementType::Json => write!(f, "Json"),
            ElementType::Posix => write!(f, "Posix"),
            ElementType::String => write!(f, "String"),
            ElementType::Record(schema) => write!(f, "Record {}", schema),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Never => write!(f, "Never"),
            DType::Optional(el) => write!(f, "Optional {}", el),
            DType::List(el) => write!(f, "List {}", el),
            DType::Array(el) => write!(f, "Array {}", el),
            scalar => match ElementType::from_dtype(scalar) {
                Some(el) => write!(f, "{}", el),
                None => write!(f, "Never"),
            },
        }
    }
}

impl fmt::Display for Inferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inferred::Type(ty) => write!(f, "{}", ty),
            Inferred::UnknownOptional => write!(f, "Optional (empty)"),
            Inferred::UnknownList => write!(f, "List (empty)"),
            Inferred::UnknownArray => write!(f, "Array (empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_containers_fit_any_element_type() {
        assert!(DType::List(ElementType::Int).accepts(&Inferred::UnknownList));
        assert!(DType::Optional(ElementType::String).accepts(&Inferred::UnknownOptional));
        assert!(DType::Array(ElementType::Bool).accepts(&Inferred::UnknownArray));
    }

    #[test]
    fn unknown_containers_keep_their_shape() {
        assert!(!DType::List(ElementType::Int).accepts(&Inferred::UnknownArray));
        assert!(!DType::Array(ElementType::Int).accepts(&Inferred::UnknownOptional));
        assert!(!DType::Int.accepts(&Inferred::UnknownList));
    }

    #[test]
    fn known_types_compare_structurally() {
        let list_of_ints = Inferred::Type(DType::List(ElementType::Int));
        assert!(DType::List(ElementType::Int).accepts(&list_of_ints));
        assert!(!DType::List(ElementType::Float).accepts(&list_of_ints));
        assert!(!DType::Array(ElementType::Int).accepts(&list_of_ints));
        assert!(!DType::Float.accepts(&Inferred::Type(DType::Int)));
        assert!(!DType::Never.accepts(&Inferred::Type(DType::Never)));
    }

    #[test]
    fn no_containers_of_containers() {
        assert!(ElementType::from_dtype(&DType::List(ElementType::Int)).is_none());
        assert!(ElementType::from_dtype(&DType::Optional(ElementType::Int)).is_none());
        assert_eq!(ElementType::from_dtype(&DType::Char), Some(ElementType::Char));
    }

    #[test]
    fn display() {
        assert_eq!(DType::Optional(ElementType::String).to_string(), "Optional String");
        assert_eq!(DType::Posix.to_string(), "Posix");
        assert_eq!(Inferred::UnknownList.to_string(), "List (empty)");
    }
}
