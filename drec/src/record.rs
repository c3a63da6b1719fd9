use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use std::collections::HashMap;

use drec_core::{DError, DType, ElementType, FieldId, Inferred, Posix, Schema};
use drec_json::JsonValue;
use log::{debug, trace};
use owo_colors::OwoColorize;

use crate::{Value, convert};

/// One instance of a [`Schema`]: committed values, rejected input, and the
/// problems found so far.
///
/// Each declared field is in one of three states:
///
/// - **unset**: nothing has been written yet;
/// - **committed**: it holds a value of its declared type;
/// - **buffered**: the last write was rejected. The raw input is kept for
///   display together with an error. A value committed before the rejected
///   write is kept as well (see [`Record::last_committed`]), but
///   [`Record::has_value`] reports `false` until a write succeeds.
///
/// Writes never fail; the outcome is read back through [`Record::is_valid`],
/// [`Record::field_error`], [`Record::field_buffer`] and
/// [`Record::error_messages`].
#[derive(Clone, PartialEq)]
pub struct Record {
    schema: Schema,
    store: HashMap<String, Value>,
    /// Raw text of rejected writes, by key.
    buffers: HashMap<String, String>,
    /// Field errors by declared key, plus `UnknownField` under undeclared keys.
    errors: BTreeMap<String, DError>,
}

macro_rules! typed_setters {
    ($($(#[$meta:meta])* $name:ident($ty:ty) => $variant:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self, field: impl FieldId, value: $ty) -> &mut Self {
                let key = self.schema.key_of(&field).into_owned();
                self.set_value(key, Value::$variant(value.into()))
            }
        )*
    };
}

macro_rules! typed_getters {
    ($($(#[$meta:meta])* $name:ident -> $ty:ty, |$declared:pat_param| $expected:expr, |$v:ident| $pat:pat => $out:expr;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(&self, field: impl FieldId) -> Result<$ty, DError> {
                match self.get(&field)? {
                    $pat => Ok($out),
                    $v => {
                        let key = self.schema.key_of(&field).into_owned();
                        let $declared = self.schema.type_of(&key).cloned().unwrap_or(DType::Never);
                        Err(DError::TypeMismatch {
                            expected: $expected,
                            found: $v.classify().unwrap_or(Inferred::Type(DType::Never)),
                            key,
                        })
                    }
                }
            }
        )*
    };
}

/// The record type `get_record` reports wanting: the nested schema the field
/// carries as its element, else a schema with no fields.
fn record_hint(declared: &DType) -> DType {
    match element_hint(declared) {
        ElementType::Record(schema) => DType::Record(schema),
        _ => DType::Record(Schema::builder().build()),
    }
}

/// The element type a container getter reports wanting: the one the field
/// already has when it has one.
fn element_hint(declared: &DType) -> ElementType {
    declared
        .element()
        .cloned()
        .or_else(|| ElementType::from_dtype(declared))
        .unwrap_or(ElementType::Json)
}

impl Record {
    /// An empty record: every field unset.
    pub fn new(schema: &Schema) -> Self {
        Self {
            schema: schema.clone(),
            store: HashMap::new(),
            buffers: HashMap::new(),
            errors: BTreeMap::new(),
        }
    }

    /// The schema this record follows, for nesting it in another schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Declared keys, in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.schema.fields()
    }

    /// Converts `raw` with `convert` and writes the result to `field`.
    ///
    /// - An undeclared field records [`DError::UnknownField`] and nothing else.
    /// - `None` from the converter buffers `raw`'s text with
    ///   [`DError::ValidationFailed`], using the schema's message for the
    ///   field if it has one.
    /// - A value whose type the field does not accept buffers the text with
    ///   [`DError::TypeMismatch`].
    /// - Otherwise the value is committed and any buffer and error for the
    ///   field are cleared.
    ///
    /// Rejections leave a previously committed value in place.
    pub fn set_with<R, F>(&mut self, field: impl FieldId, convert: F, raw: R) -> &mut Self
    where
        R: fmt::Display,
        F: FnOnce(R) -> Option<Value>,
    {
        let key = self.schema.key_of(&field).into_owned();
        if !self.schema.contains(&key) {
            return self.unknown_field(key);
        }

        let text = raw.to_string();
        match convert(raw) {
            Some(value) => self.set_value(key, value),
            None => {
                let message = self.validation_message(&key, &text);
                self.reject(key, text, |key| DError::ValidationFailed { key, message })
            }
        }
    }

    /// Writes raw form text to `field`, converted according to the field's
    /// declared type.
    ///
    /// Numbers parse as decimal, booleans as `true`/`false` in any case, a
    /// char from exactly one character, JSON and records from JSON text,
    /// Posix times from integer milliseconds. Optionals treat blank text as
    /// absent. Lists and arrays of scalars split on commas; lists and arrays
    /// of records or JSON read a JSON array.
    pub fn update(&mut self, field: impl FieldId, text: &str) -> &mut Self {
        let key = self.schema.key_of(&field).into_owned();
        let Some(ty) = self.schema.type_of(&key).cloned() else {
            return self.unknown_field(key);
        };

        if ty == DType::Never {
            return self.reject(key, text.to_string(), |key| DError::InvalidSchemaType {
                key,
                reason: "a field declared Never cannot hold a value".to_string(),
            });
        }

        self.set_with(key.as_str(), |text: &str| convert::from_text(&ty, text), text)
    }

    /// Writes any value to `field`, checking it against the declared type.
    pub fn set(&mut self, field: impl FieldId, value: impl Into<Value>) -> &mut Self {
        let key = self.schema.key_of(&field).into_owned();
        self.set_value(key, value.into())
    }

    typed_setters! {
        /// Writes a boolean.
        set_bool(bool) => Bool;
        /// Writes a character.
        set_char(char) => Char;
        /// Writes a float.
        set_float(f64) => Float;
        /// Writes an integer.
        set_int(i64) => Int;
        /// Writes raw JSON.
        set_json(JsonValue) => Json;
        /// Writes a point in time.
        set_posix(Posix) => Posix;
        /// Writes a string.
        set_string(impl Into<String>) => String;
        /// Writes a list; items must share one element type.
        set_list(Vec<Value>) => List;
        /// Writes an array; items must share one element type.
        set_array(Vec<Value>) => Array;
    }

    /// Writes an optional value; `None` counts as a value.
    pub fn set_optional(&mut self, field: impl FieldId, value: Option<Value>) -> &mut Self {
        let key = self.schema.key_of(&field).into_owned();
        self.set_value(key, Value::Optional(value.map(Box::new)))
    }

    /// Writes a nested record.
    pub fn set_record(&mut self, field: impl FieldId, record: Record) -> &mut Self {
        let key = self.schema.key_of(&field).into_owned();
        self.set_value(key, Value::Record(Box::new(record)))
    }

    /// Commits `value` under `key` if its type fits, else buffers its text.
    pub(crate) fn set_value(&mut self, key: String, value: Value) -> &mut Self {
        let Some(declared) = self.schema.type_of(&key) else {
            return self.unknown_field(key);
        };

        match value.classify() {
            Ok(found) if declared.accepts(&found) => {
                trace!("Committing {} ({})", key.blue(), found.green());
                self.buffers.remove(&key);
                self.errors.remove(&key);
                self.store.insert(key, value);
                self
            }
            Ok(found) => {
                let expected = declared.clone();
                self.reject(key, value.to_string(), |key| DError::TypeMismatch {
                    key,
                    expected,
                    found,
                })
            }
            Err(e) => self.reject(key, value.to_string(), |key| DError::InvalidSchemaType {
                key,
                reason: e.to_string(),
            }),
        }
    }

    fn reject(
        &mut self,
        key: String,
        text: String,
        error: impl FnOnce(String) -> DError,
    ) -> &mut Self {
        let error = error(key.clone());
        debug!("Buffering {:?} for {}: {}", text, key.blue(), error.red());
        self.buffers.insert(key.clone(), text);
        self.errors.insert(key, error);
        self
    }

    fn unknown_field(&mut self, key: String) -> &mut Self {
        debug!("Write to undeclared field {}", key.red());
        self.errors
            .insert(key.clone(), DError::UnknownField { key });
        self
    }

    fn validation_message(&self, key: &str, text: &str) -> String {
        match self.schema.message_for(key) {
            Some(message) => message.to_string(),
            None => {
                let ty = self
                    .schema
                    .type_of(key)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                format!("`{}` is not a valid {} for field `{}`", text, ty, key)
            }
        }
    }

    /// The committed value of `field`.
    ///
    /// Fails with [`DError::UnknownField`] for undeclared fields, with the
    /// field's error while it holds rejected input, and with
    /// [`DError::MissingValue`] while it is unset.
    pub fn get(&self, field: impl FieldId) -> Result<&Value, DError> {
        let key = self.schema.key_of(&field);
        if !self.schema.contains(&key) {
            return Err(DError::UnknownField {
                key: key.into_owned(),
            });
        }
        if let Some(error) = self.errors.get(&*key) {
            return Err(error.clone());
        }
        self.store
            .get(&*key)
            .ok_or_else(|| DError::MissingValue {
                key: key.into_owned(),
            })
    }

    typed_getters! {
        /// The committed boolean.
        get_bool -> bool, |_| DType::Bool, |v| Value::Bool(b) => *b;
        /// The committed character.
        get_char -> char, |_| DType::Char, |v| Value::Char(c) => *c;
        /// The committed float.
        get_float -> f64, |_| DType::Float, |v| Value::Float(x) => *x;
        /// The committed integer.
        get_int -> i64, |_| DType::Int, |v| Value::Int(n) => *n;
        /// The committed JSON.
        get_json -> &JsonValue, |_| DType::Json, |v| Value::Json(json) => json;
        /// The committed point in time.
        get_posix -> Posix, |_| DType::Posix, |v| Value::Posix(p) => *p;
        /// The committed string.
        get_string -> &str, |_| DType::String, |v| Value::String(s) => s.as_str();
        /// The committed nested record.
        get_record -> &Record, |d| record_hint(&d), |v| Value::Record(r) => &**r;
        /// The items of a committed list.
        get_list -> &[Value], |d| DType::List(element_hint(&d)), |v| Value::List(items) => items.as_slice();
        /// The items of a committed array.
        get_array -> &[Value], |d| DType::Array(element_hint(&d)), |v| Value::Array(items) => items.as_slice();
        /// The content of a committed optional.
        get_optional -> Option<&Value>, |d| DType::Optional(element_hint(&d)), |v| Value::Optional(inner) => inner.as_deref();
    }

    /// The value committed to `field` before any pending rejected input.
    pub fn last_committed(&self, field: impl FieldId) -> Option<&Value> {
        self.store.get(&*self.schema.key_of(&field))
    }

    /// Text for a form input bound to `field`, with the error to show next to it.
    ///
    /// Rejected input comes back verbatim with its error; a committed value as
    /// its display text; anything else as empty text with the error
    /// [`Record::get`] would return.
    pub fn retrieve(&self, field: impl FieldId) -> (String, Option<DError>) {
        let key = self.schema.key_of(&field);
        if let Some(buffer) = self.buffers.get(&*key) {
            return (buffer.clone(), self.errors.get(&*key).cloned());
        }
        match self.get(&*key) {
            Ok(value) => (value.to_string(), None),
            Err(error) => (String::new(), Some(error)),
        }
    }

    /// Returns `true` if `field` holds a committed value and no rejected input.
    /// An optional committed as absent has a value.
    pub fn has_value(&self, field: impl FieldId) -> bool {
        self.get(field).is_ok()
    }

    /// The error recorded for `field`, if any.
    pub fn field_error(&self, field: impl FieldId) -> Option<&DError> {
        self.errors.get(&*self.schema.key_of(&field))
    }

    /// The rejected input pending on `field`, if any.
    pub fn field_buffer(&self, field: impl FieldId) -> Option<&str> {
        self.buffers
            .get(&*self.schema.key_of(&field))
            .map(String::as_str)
    }

    /// Returns `true` if neither the schema nor the record has errors, every
    /// declared field has a value, and every nested record, including those
    /// inside optionals and containers, is valid too.
    pub fn is_valid(&self) -> bool {
        self.schema.errors().is_empty()
            && self.errors.is_empty()
            && self.fields().all(|key| {
                self.store
                    .get(key)
                    .is_some_and(Value::nested_records_valid)
            })
    }

    /// Returns `true` if the record as a whole is unusable: its schema is
    /// broken, or something was written under an undeclared key.
    pub fn has_record_errors(&self) -> bool {
        !self.schema.errors().is_empty()
            || self
                .errors
                .values()
                .any(|e| matches!(e, DError::UnknownField { .. }))
    }

    /// Every recorded error: the schema's, then field errors in declaration
    /// order, then unknown-field errors by key.
    pub fn errors(&self) -> impl Iterator<Item = &DError> + '_ {
        let declared = self.fields().filter_map(|key| self.errors.get(key));
        let undeclared = self
            .errors
            .iter()
            .filter(|(key, _)| !self.schema.contains(key))
            .map(|(_, e)| e);
        self.schema.errors().iter().chain(declared).chain(undeclared)
    }

    /// Human-readable text of [`Record::errors`].
    pub fn error_messages(&self) -> Vec<String> {
        self.errors().map(ToString::to_string).collect()
    }

    /// Resets every field to unset. The schema is kept.
    pub fn clear(&mut self) -> &mut Self {
        self.store.clear();
        self.buffers.clear();
        self.errors.clear();
        self
    }

    /// Encodes the committed fields; see [`crate::to_value`].
    pub fn encode(&self) -> JsonValue {
        crate::to_value(self)
    }

    /// JSON text of the committed fields, indented as the schema says; see
    /// [`crate::to_string`].
    pub fn stringify(&self) -> String {
        crate::to_string(self)
    }

    /// Decodes JSON text into a new record with this record's schema.
    pub fn decode_str(&self, json: &str) -> Result<Record, DError> {
        crate::from_str(&self.schema, json)
    }

    /// Decodes a JSON value into a new record with this record's schema.
    pub fn decode_value(&self, json: &JsonValue) -> Result<Record, DError> {
        crate::from_value(&self.schema, json)
    }

    /// Committed value for `key`, if any; buffered state is ignored.
    pub(crate) fn committed(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.fields() {
            match (self.store.get(key), self.buffers.get(key)) {
                (_, Some(buffer)) => map.entry(&key, &format_args!("<buffered {:?}>", buffer)),
                (Some(value), None) => map.entry(&key, value),
                (None, None) => map.entry(&key, &format_args!("<unset>")),
            };
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::builder()
            .field("Inty", DType::Int)
            .field("Stringy", DType::String)
            .field("Maybe", DType::Optional(ElementType::Float))
            .build()
    }

    #[test]
    fn starts_unset() {
        let record = Record::new(&schema());
        assert_eq!(
            record.get("Inty"),
            Err(DError::MissingValue { key: "inty".into() })
        );
        assert!(!record.is_valid());
        assert!(record.error_messages().is_empty());
    }

    #[test]
    fn rejected_input_keeps_the_old_value() {
        let mut record = Record::new(&schema());
        record.set_int("Inty", 7);
        record.set_with("Inty", |_: &str| None, "seven");

        assert!(!record.has_value("Inty"));
        assert_eq!(record.last_committed("Inty"), Some(&Value::Int(7)));
        assert_eq!(record.field_buffer("Inty"), Some("seven"));
        assert!(matches!(
            record.field_error("Inty"),
            Some(DError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn type_mismatch_buffers_display_text() {
        let mut record = Record::new(&schema());
        record.set_string("Inty", "1357");
        assert_eq!(record.field_buffer("Inty"), Some("1357"));
        assert_eq!(
            record.field_error("Inty"),
            Some(&DError::TypeMismatch {
                key: "inty".into(),
                expected: DType::Int,
                found: Inferred::Type(DType::String),
            })
        );
    }

    #[test]
    fn absent_optional_is_a_value() {
        let mut record = Record::new(&schema());
        record
            .set_int("Inty", 1)
            .set_string("Stringy", "s")
            .set_optional("Maybe", None);
        assert!(record.has_value("Maybe"));
        assert_eq!(record.get_optional("Maybe"), Ok(None));
        assert!(record.is_valid());
    }

    #[test]
    fn clear_keeps_the_schema() {
        let mut record = Record::new(&schema());
        record.set_int("Inty", 1).set_bool("Nope", true);
        record.clear();
        assert!(record.errors().next().is_none());
        assert!(!record.has_value("Inty"));
        assert_eq!(record.fields().len(), 3);
    }
}
