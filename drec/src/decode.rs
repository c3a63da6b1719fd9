use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use drec_core::{DError, DType, ElementType, Posix, Schema};
use drec_json::{JsonError, JsonValue};
use log::{debug, trace};
use owo_colors::OwoColorize;

use crate::{Record, Value};

/// Decodes JSON text into a record of `schema`.
pub fn from_str(schema: &Schema, json: &str) -> Result<Record, DError> {
    from_slice(schema, json.as_bytes())
}

/// Decodes JSON bytes into a record of `schema`.
///
/// Malformed JSON fails with a [`DError::DecodingFailed`] at the document
/// itself; so does a document that does not match the schema, at the path of
/// the first offending value.
pub fn from_slice(schema: &Schema, json: &[u8]) -> Result<Record, DError> {
    let decoder = RecordDecoder::new(schema)?;
    let value = drec_json::from_slice(json).map_err(syntax_error)?;
    decoder.decode(&value)
}

/// Decodes an already-parsed JSON value into a record of `schema`.
pub fn from_value(schema: &Schema, json: &JsonValue) -> Result<Record, DError> {
    RecordDecoder::new(schema)?.decode(json)
}

fn syntax_error(e: JsonError<'_>) -> DError {
    debug!("Malformed JSON: {}", e.message());
    DError::decoding(
        "",
        format!("{} at byte {}", e.kind, e.span.start()),
    )
}

/// A decoder compiled from a schema: one step per declared field, in
/// declaration order, each knowing its key and how to read its value.
///
/// Compiling checks the schema once; the decoder can then be run against
/// any number of documents.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    schema: Schema,
    fields: Vec<FieldDecoder>,
}

#[derive(Debug, Clone)]
struct FieldDecoder {
    key: String,
    kind: FieldKind,
}

#[derive(Debug, Clone)]
enum FieldKind {
    Required(ElementDecoder),
    Optional(ElementDecoder),
    List(ElementDecoder),
    Array(ElementDecoder),
}

#[derive(Debug, Clone)]
enum ElementDecoder {
    Bool,
    Char,
    Float,
    Int,
    Json,
    Posix,
    String,
    Record(Box<RecordDecoder>),
}

impl RecordDecoder {
    /// Compiles a decoder for `schema`.
    ///
    /// Fails with [`DError::NoSchema`] for a schema without fields, with
    /// [`DError::DecodingFailed`] for a schema that has errors, and with
    /// [`DError::InvalidSchemaType`] for a field declared `Never`. Nested
    /// schemas are checked the same way.
    pub fn new(schema: &Schema) -> Result<Self, DError> {
        if schema.is_empty() {
            return Err(DError::NoSchema);
        }
        if let Some(first) = schema.errors().first() {
            return Err(DError::decoding(
                "",
                format!("schema has errors: {}", first),
            ));
        }

        let fields = schema
            .fields()
            .map(|key| {
                let ty = schema.type_of(key).unwrap_or(&DType::Never);
                let kind = FieldKind::compile(key, ty)?;
                Ok(FieldDecoder {
                    key: key.to_string(),
                    kind,
                })
            })
            .collect::<Result<Vec<_>, DError>>()?;

        Ok(Self {
            schema: schema.clone(),
            fields,
        })
    }

    /// Runs the decoder on a JSON object. Keys the schema does not declare
    /// are ignored.
    pub fn decode(&self, json: &JsonValue) -> Result<Record, DError> {
        self.decode_at("", json)
    }

    fn decode_at(&self, path: &str, json: &JsonValue) -> Result<Record, DError> {
        let Some(object) = json.as_object() else {
            return Err(DError::decoding(
                path,
                format!("expected an object, got {}", json.kind()),
            ));
        };

        let mut record = Record::new(&self.schema);
        for field in &self.fields {
            let path = join(path, &field.key);
            trace!("Decoding {}", path.blue());
            let value = field.kind.decode(&path, object.get(&field.key))?;
            record.set_value(field.key.clone(), value);
        }
        Ok(record)
    }
}

impl FieldKind {
    fn compile(key: &str, ty: &DType) -> Result<Self, DError> {
        Ok(match ty {
            DType::Never => {
                return Err(DError::InvalidSchemaType {
                    key: key.to_string(),
                    reason: "a field declared Never cannot be decoded".to_string(),
                });
            }
            DType::Optional(el) => FieldKind::Optional(ElementDecoder::compile(el)?),
            DType::List(el) => FieldKind::List(ElementDecoder::compile(el)?),
            DType::Array(el) => FieldKind::Array(ElementDecoder::compile(el)?),
            scalar => match ElementType::from_dtype(scalar) {
                Some(el) => FieldKind::Required(ElementDecoder::compile(&el)?),
                None => {
                    return Err(DError::InvalidSchemaType {
                        key: key.to_string(),
                        reason: format!("{} cannot be decoded", scalar),
                    });
                }
            },
        })
    }

    fn decode(&self, path: &str, json: Option<&JsonValue>) -> Result<Value, DError> {
        match (self, json) {
            (FieldKind::Optional(_), None | Some(JsonValue::Null)) => Ok(Value::Optional(None)),
            (FieldKind::Optional(el), Some(json)) => {
                Ok(Value::Optional(Some(Box::new(el.decode(path, json)?))))
            }
            (_, None) => Err(DError::decoding(path, "missing")),
            (FieldKind::Required(el), Some(json)) => el.decode(path, json),
            (FieldKind::List(el), Some(json)) => el.decode_items(path, json).map(Value::List),
            (FieldKind::Array(el), Some(json)) => el.decode_items(path, json).map(Value::Array),
        }
    }
}

impl ElementDecoder {
    fn compile(el: &ElementType) -> Result<Self, DError> {
        Ok(match el {
            ElementType::Bool => ElementDecoder::Bool,
            ElementType::Char => ElementDecoder::Char,
            ElementType::Float => ElementDecoder::Float,
            ElementType::Int => ElementDecoder::Int,
            ElementType::Json => ElementDecoder::Json,
            ElementType::Posix => ElementDecoder::Posix,
            ElementType::String => ElementDecoder::String,
            ElementType::Record(schema) => {
                ElementDecoder::Record(Box::new(RecordDecoder::new(schema)?))
            }
        })
    }

    fn decode_items(&self, path: &str, json: &JsonValue) -> Result<Vec<Value>, DError> {
        let Some(items) = json.as_array() else {
            return Err(mismatch(path, "an array", json));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.decode(&format!("{}[{}]", path, i), item))
            .collect()
    }

    fn decode(&self, path: &str, json: &JsonValue) -> Result<Value, DError> {
        match self {
            ElementDecoder::Bool => json
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| mismatch(path, "a boolean", json)),
            ElementDecoder::Char => json
                .as_number()
                .and_then(|n| n.as_i64())
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| mismatch(path, "a character code point", json)),
            ElementDecoder::Float => json
                .as_number()
                .map(|n| Value::Float(n.as_f64()))
                .ok_or_else(|| mismatch(path, "a number", json)),
            ElementDecoder::Int => json
                .as_number()
                .and_then(|n| n.as_i64())
                .map(Value::Int)
                .ok_or_else(|| mismatch(path, "an integer", json)),
            ElementDecoder::Json => Ok(Value::Json(json.clone())),
            ElementDecoder::Posix => json
                .as_number()
                .and_then(|n| n.as_i64())
                .map(|ms| Value::Posix(Posix::from_millis(ms)))
                .ok_or_else(|| mismatch(path, "integer milliseconds", json)),
            ElementDecoder::String => json
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| mismatch(path, "a string", json)),
            ElementDecoder::Record(decoder) => decoder
                .decode_at(path, json)
                .map(|record| Value::Record(Box::new(record))),
        }
    }
}

fn mismatch(path: &str, wanted: &str, got: &JsonValue) -> DError {
    DError::decoding(path, format!("expected {}, got {}", wanted, got.kind()))
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}
