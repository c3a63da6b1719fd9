use alloc::string::String;
use alloc::vec::Vec;
use log::trace;

use crate::{JsonValue, JsonWrite, Number};

/// Largest magnitude below which an integral float is written as an integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serializes a value to compact JSON text.
pub fn to_string(value: &JsonValue) -> String {
    to_string_pretty(value, 0)
}

/// Serializes a value to JSON text indented by `indent` spaces per level.
///
/// An indent of zero produces compact output. Otherwise the layout matches
/// `JSON.stringify(value, null, indent)`: one entry per line, `": "` after
/// keys, and empty containers written as `{}` and `[]`.
pub fn to_string_pretty(value: &JsonValue, indent: usize) -> String {
    let mut out = Vec::new();
    to_writer(value, &mut out, indent);
    // Only whole UTF-8 sequences are ever written.
    String::from_utf8(out).unwrap_or_default()
}

/// Serializes a value into `writer`, indented by `indent` spaces per level.
pub fn to_writer<W: JsonWrite>(value: &JsonValue, writer: W, indent: usize) {
    trace!("Writing {} with indent {}", value.kind(), indent);
    let mut serializer = JsonSerializer::new(writer, indent);
    serializer.write_value(value);
}

/// Writes [`JsonValue`] trees as JSON text.
pub struct JsonSerializer<W: JsonWrite> {
    writer: W,
    indent: usize,
    depth: usize,
}

impl<W: JsonWrite> JsonSerializer<W> {
    /// Creates a new serializer; `indent` of zero means compact output.
    pub fn new(writer: W, indent: usize) -> Self {
        Self {
            writer,
            indent,
            depth: 0,
        }
    }

    /// Writes one complete value.
    pub fn write_value(&mut self, value: &JsonValue) {
        match value {
            JsonValue::Null => self.writer.write(b"null"),
            JsonValue::Bool(b) => self.writer.write(if *b { b"true" } else { b"false" }),
            JsonValue::Number(n) => self.write_number(n),
            JsonValue::String(s) => {
                self.writer.reserve(s.len() + 2);
                crate::write_json_string(&mut self.writer, s);
            }
            JsonValue::Array(items) => {
                if items.is_empty() {
                    self.writer.write(b"[]");
                    return;
                }
                self.writer.write(b"[");
                self.depth += 1;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.writer.write(b",");
                    }
                    self.newline();
                    self.write_value(item);
                }
                self.depth -= 1;
                self.newline();
                self.writer.write(b"]");
            }
            JsonValue::Object(object) => {
                if object.is_empty() {
                    self.writer.write(b"{}");
                    return;
                }
                self.writer.write(b"{");
                self.depth += 1;
                for (i, (key, item)) in object.iter().enumerate() {
                    if i > 0 {
                        self.writer.write(b",");
                    }
                    self.newline();
                    crate::write_json_string(&mut self.writer, key);
                    self.writer.write(if self.indent > 0 { b": " } else { b":" });
                    self.write_value(item);
                }
                self.depth -= 1;
                self.newline();
                self.writer.write(b"}");
            }
        }
    }

    fn write_number(&mut self, n: &Number) {
        match *n {
            Number::U64(n) => self.writer.write(itoa::Buffer::new().format(n).as_bytes()),
            Number::I64(n) => self.writer.write(itoa::Buffer::new().format(n).as_bytes()),
            Number::F64(f) if !f.is_finite() => self.writer.write(b"null"),
            Number::F64(f) if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => {
                self.writer
                    .write(itoa::Buffer::new().format(f as i64).as_bytes());
            }
            Number::F64(f) => self.writer.write(ryu::Buffer::new().format(f).as_bytes()),
        }
    }

    fn newline(&mut self) {
        if self.indent == 0 {
            return;
        }
        self.writer.write(b"\n");
        for _ in 0..self.depth * self.indent {
            self.writer.write(b" ");
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonObject;
    use alloc::vec;

    fn sample() -> JsonValue {
        let mut inner = JsonObject::new();
        inner.insert("abbr", "m".into());
        let mut object = JsonObject::new();
        object.insert("name", "Level 0".into());
        object.insert("list", JsonValue::Array(vec![1i64.into(), 2i64.into()]));
        object.insert("unit", inner.into());
        object.insert("empty", JsonValue::Array(vec![]));
        object.into()
    }

    #[test]
    fn compact_output() {
        assert_eq!(
            to_string(&sample()),
            r#"{"name":"Level 0","list":[1,2],"unit":{"abbr":"m"},"empty":[]}"#
        );
    }

    #[test]
    fn indented_output() {
        let expected = "{\n  \"name\": \"Level 0\",\n  \"list\": [\n    1,\n    2\n  ],\n  \"unit\": {\n    \"abbr\": \"m\"\n  },\n  \"empty\": []\n}";
        assert_eq!(to_string_pretty(&sample(), 2), expected);
    }

    #[test]
    fn floats() {
        assert_eq!(to_string(&3.14.into()), "3.14");
        assert_eq!(to_string(&314.5.into()), "314.5");
        assert_eq!(to_string(&2.0.into()), "2");
        assert_eq!(to_string(&(-0.5).into()), "-0.5");
        assert_eq!(to_string(&f64::NAN.into()), "null");
    }
}
