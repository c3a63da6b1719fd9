use alloc::string::String;

use drec_json::{JsonObject, JsonValue};
use log::debug;

use crate::{Record, Value};

/// Encodes the committed fields of `record` as a JSON object.
///
/// Keys follow declaration order. Unset fields and fields holding rejected
/// input are left out, as are optionals committed as absent; present
/// optionals are written unwrapped. A record with record-level errors (see
/// [`Record::has_record_errors`]) encodes as `{}`, so check
/// [`Record::is_valid`] before trusting the output.
pub fn to_value(record: &Record) -> JsonValue {
    if record.has_record_errors() {
        debug!("Record has record-level errors, encoding as an empty object");
        return JsonValue::Object(JsonObject::new());
    }

    let mut object = JsonObject::with_capacity(record.fields().len());
    for key in record.fields() {
        if record.field_buffer(key).is_some() {
            continue;
        }
        match record.committed(key) {
            None | Some(Value::Optional(None)) => {}
            Some(value) => {
                object.insert(key, encode_value(value));
            }
        }
    }
    JsonValue::Object(object)
}

/// JSON text of `record`, indented as its schema says.
pub fn to_string(record: &Record) -> String {
    to_string_pretty(record, record.schema().indent())
}

/// JSON text of `record` with `indent` spaces per level; `0` is compact.
///
/// Nested records are laid out with the same indentation, whatever their own
/// schemas say.
pub fn to_string_pretty(record: &Record, indent: usize) -> String {
    drec_json::to_string_pretty(&to_value(record), indent)
}

pub(crate) fn encode_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Char(c) => JsonValue::from(i64::from(u32::from(*c))),
        Value::Float(x) => JsonValue::from(*x),
        Value::Int(n) => JsonValue::from(*n),
        Value::Json(json) => json.clone(),
        Value::Posix(p) => JsonValue::from(p.millis()),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Record(record) => to_value(record),
        Value::Optional(None) => JsonValue::Null,
        Value::Optional(Some(inner)) => encode_value(inner),
        Value::List(items) | Value::Array(items) => {
            JsonValue::Array(items.iter().map(encode_value).collect())
        }
    }
}
