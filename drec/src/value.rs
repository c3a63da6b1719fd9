use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use drec_core::{DType, ElementType, Inferred, Posix};
use drec_json::JsonValue;

use crate::Record;

/// The data held by one field of a record.
///
/// Mirrors [`DType`]: one variant per scalar kind, a nested [`Record`], and
/// the three containers. Containers are homogeneous and may not hold other
/// containers or optionals; [`Value::classify`] reports violations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `true` or `false`
    Bool(bool),
    /// A Unicode scalar value
    Char(char),
    /// A 64-bit float
    Float(f64),
    /// A 64-bit signed integer
    Int(i64),
    /// Arbitrary JSON
    Json(JsonValue),
    /// Milliseconds since the epoch
    Posix(Posix),
    /// A string
    String(String),
    /// A nested record, owned by this value
    Record(Box<Record>),
    /// Present or absent
    Optional(Option<Box<Value>>),
    /// A sequence
    List(Vec<Value>),
    /// An indexable sequence
    Array(Vec<Value>),
}

/// Why a value has no type a schema could declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    /// An optional, list or array holds another optional, list or array.
    NestedContainer,
    /// A list or array holds elements of different types.
    MixedElements,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::NestedContainer => {
                write!(f, "optionals and containers cannot hold optionals or containers")
            }
            ClassifyError::MixedElements => write!(f, "container elements differ in type"),
        }
    }
}

impl core::error::Error for ClassifyError {}

impl Value {
    /// A list of the given items.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// An array of the given items.
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// An optional holding `value`.
    pub fn some(value: impl Into<Value>) -> Self {
        Value::Optional(Some(Box::new(value.into())))
    }

    /// An absent optional.
    pub const NONE: Value = Value::Optional(None);

    /// The type this value has, as far as it can tell.
    ///
    /// Optionals and containers take their element type from their content;
    /// an absent optional or an empty container reports only its shape.
    pub fn classify(&self) -> Result<Inferred, ClassifyError> {
        let ty = match self {
            Value::Bool(_) => DType::Bool,
            Value::Char(_) => DType::Char,
            Value::Float(_) => DType::Float,
            Value::Int(_) => DType::Int,
            Value::Json(_) => DType::Json,
            Value::Posix(_) => DType::Posix,
            Value::String(_) => DType::String,
            Value::Record(record) => DType::Record(record.schema().clone()),
            Value::Optional(None) => return Ok(Inferred::UnknownOptional),
            Value::Optional(Some(inner)) => DType::Optional(inner.element_type()?),
            Value::List(items) => match homogeneous_element(items)? {
                Some(el) => DType::List(el),
                None => return Ok(Inferred::UnknownList),
            },
            Value::Array(items) => match homogeneous_element(items)? {
                Some(el) => DType::Array(el),
                None => return Ok(Inferred::UnknownArray),
            },
        };
        Ok(Inferred::Type(ty))
    }

    /// The element type this value has when it sits inside a container.
    fn element_type(&self) -> Result<ElementType, ClassifyError> {
        match self.classify()? {
            Inferred::Type(ty) => {
                ElementType::from_dtype(&ty).ok_or(ClassifyError::NestedContainer)
            }
            _ => Err(ClassifyError::NestedContainer),
        }
    }

    /// Returns `false` if this value holds a nested record, directly or as
    /// an element, that is not itself valid.
    pub(crate) fn nested_records_valid(&self) -> bool {
        match self {
            Value::Record(record) => record.is_valid(),
            Value::Optional(Some(inner)) => inner.nested_records_valid(),
            Value::List(items) | Value::Array(items) => {
                items.iter().all(Value::nested_records_valid)
            }
            _ => true,
        }
    }

    /// Items of a list or an array.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// The element type shared by every item, or `None` for no items.
fn homogeneous_element(items: &[Value]) -> Result<Option<ElementType>, ClassifyError> {
    let Some((first, rest)) = items.split_first() else {
        return Ok(None);
    };
    let el = first.element_type()?;
    for item in rest {
        if item.element_type()? != el {
            return Err(ClassifyError::MixedElements);
        }
    }
    Ok(Some(el))
}

/// The text a form shows for a committed value.
///
/// Scalars print plainly (`true`, `C`, `3.14`, `1357`), records and JSON as
/// compact JSON, an absent optional as nothing, and containers of scalars as
/// `a, b, c`. The text converters used by [`Record::update`] read each of
/// these forms back.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Float(x) => write!(f, "{}", x),
            Value::Int(n) => write!(f, "{}", n),
            Value::Json(json) => write!(f, "{}", json),
            Value::Posix(p) => write!(f, "{}", p),
            Value::String(s) => f.write_str(s),
            Value::Record(record) => f.write_str(&crate::to_string_pretty(record, 0)),
            Value::Optional(None) => Ok(()),
            Value::Optional(Some(inner)) => write!(f, "{}", inner),
            Value::List(items) | Value::Array(items) => {
                if items
                    .iter()
                    .any(|item| matches!(item, Value::Record(_) | Value::Json(_)))
                {
                    let encoded = items.iter().map(crate::encode::encode_value).collect();
                    return write!(f, "{}", JsonValue::Array(encoded));
                }
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<Posix> for Value {
    fn from(p: Posix) -> Self {
        Value::Posix(p)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::Json(json)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(Box::new(record))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        Value::Optional(opt.map(|v| Box::new(v.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drec_core::Schema;

    #[test]
    fn scalars_classify_directly() {
        assert_eq!(Value::from('C').classify(), Ok(Inferred::Type(DType::Char)));
        assert_eq!(
            Value::Posix(Posix::EPOCH).classify(),
            Ok(Inferred::Type(DType::Posix))
        );
    }

    #[test]
    fn containers_classify_by_content() {
        assert_eq!(
            Value::list([1i64, 3, 5, 7]).classify(),
            Ok(Inferred::Type(DType::List(ElementType::Int)))
        );
        assert_eq!(
            Value::array(Vec::<i64>::new()).classify(),
            Ok(Inferred::UnknownArray)
        );
        assert_eq!(Value::NONE.classify(), Ok(Inferred::UnknownOptional));
        assert_eq!(
            Value::some("x").classify(),
            Ok(Inferred::Type(DType::Optional(ElementType::String)))
        );
    }

    #[test]
    fn records_classify_to_their_schema() {
        let schema = Schema::builder().field("a", DType::Int).build();
        let value = Value::from(Record::new(&schema));
        assert_eq!(value.classify(), Ok(Inferred::Type(DType::Record(schema))));
    }

    #[test]
    fn containers_of_containers_are_rejected() {
        let nested = Value::list([Value::list([1i64])]);
        assert_eq!(nested.classify(), Err(ClassifyError::NestedContainer));
        let optional_list = Value::some(Value::list([true]));
        assert_eq!(optional_list.classify(), Err(ClassifyError::NestedContainer));
        let list_of_none = Value::list([Value::NONE]);
        assert_eq!(list_of_none.classify(), Err(ClassifyError::NestedContainer));
    }

    #[test]
    fn mixed_containers_are_rejected() {
        let mixed = Value::List(vec![Value::Int(1), Value::from("two")]);
        assert_eq!(mixed.classify(), Err(ClassifyError::MixedElements));
    }

    #[test]
    fn display_text() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Char('C').to_string(), "C");
        assert_eq!(Value::Float(3.14).to_string(), "3.14");
        assert_eq!(Value::Int(1357).to_string(), "1357");
        assert_eq!(Value::NONE.to_string(), "");
        assert_eq!(Value::some(2.5).to_string(), "2.5");
        assert_eq!(Value::list([1i64, 3, 5]).to_string(), "1, 3, 5");
        assert_eq!(
            Value::Json(JsonValue::Array(vec![true.into()])).to_string(),
            "[true]"
        );
    }
}
