//! Converters from form text to values, one per declared type.

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;

use drec_core::{DType, ElementType, Posix};
use drec_json::JsonValue;
use log::trace;

use crate::Value;

/// Reads `text` as a value of type `ty`, or `None` if it is not one.
///
/// Always `None` for [`DType::Never`].
pub fn from_text(ty: &DType, text: &str) -> Option<Value> {
    let value = match ty {
        DType::Never => None,
        DType::Optional(el) => {
            if text.trim().is_empty() {
                Some(Value::Optional(None))
            } else {
                element_from_text(el, text).map(|v| Value::Optional(Some(Box::new(v))))
            }
        }
        DType::List(el) => items_from_text(el, text).map(Value::List),
        DType::Array(el) => items_from_text(el, text).map(Value::Array),
        scalar => ElementType::from_dtype(scalar).and_then(|el| element_from_text(&el, text)),
    };
    if value.is_none() {
        trace!("Rejected {:?} as {}", text, ty);
    }
    value
}

fn element_from_text(el: &ElementType, text: &str) -> Option<Value> {
    match el {
        ElementType::Bool => match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
            t if t.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
            _ => None,
        },
        ElementType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        ElementType::Float => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(Value::Float),
        ElementType::Int => text.trim().parse().ok().map(Value::Int),
        ElementType::Posix => text
            .trim()
            .parse()
            .ok()
            .map(|ms| Value::Posix(Posix::from_millis(ms))),
        ElementType::Json => drec_json::from_str(text).ok().map(Value::Json),
        ElementType::String => Some(Value::String(text.to_string())),
        ElementType::Record(schema) => crate::from_str(schema, text)
            .ok()
            .map(|record| Value::Record(Box::new(record))),
    }
}

/// Scalars are comma separated; records and JSON come as a JSON array.
fn items_from_text(el: &ElementType, text: &str) -> Option<Vec<Value>> {
    if text.trim().is_empty() {
        return Some(Vec::new());
    }

    match el {
        ElementType::Json => match drec_json::from_str(text).ok()? {
            JsonValue::Array(items) => Some(items.into_iter().map(Value::Json).collect()),
            _ => None,
        },
        ElementType::Record(schema) => match drec_json::from_str(text).ok()? {
            JsonValue::Array(items) => items
                .iter()
                .map(|item| {
                    crate::from_value(schema, item)
                        .ok()
                        .map(|record| Value::Record(Box::new(record)))
                })
                .collect(),
            _ => None,
        },
        scalar => text
            .split(',')
            .map(|part| element_from_text(scalar, part.trim()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drec_core::Schema;

    #[test]
    fn scalars() {
        assert_eq!(from_text(&DType::Bool, "TRUE"), Some(Value::Bool(true)));
        assert_eq!(from_text(&DType::Bool, "yes"), None);
        assert_eq!(from_text(&DType::Char, "C"), Some(Value::Char('C')));
        assert_eq!(from_text(&DType::Char, "CD"), None);
        assert_eq!(from_text(&DType::Char, ""), None);
        assert_eq!(from_text(&DType::Float, " 3.14 "), Some(Value::Float(3.14)));
        assert_eq!(from_text(&DType::Float, "inf"), None);
        assert_eq!(from_text(&DType::Int, "1357"), Some(Value::Int(1357)));
        assert_eq!(from_text(&DType::Int, "13.5"), None);
        assert_eq!(
            from_text(&DType::Posix, "1700000000000"),
            Some(Value::Posix(Posix::from_millis(1_700_000_000_000)))
        );
        assert_eq!(
            from_text(&DType::String, " kept as is "),
            Some(Value::String(" kept as is ".into()))
        );
        assert_eq!(from_text(&DType::Never, "anything"), None);
    }

    #[test]
    fn optionals_treat_blank_as_absent() {
        let ty = DType::Optional(ElementType::Int);
        assert_eq!(from_text(&ty, "  "), Some(Value::NONE));
        assert_eq!(from_text(&ty, "4"), Some(Value::some(4i64)));
        assert_eq!(from_text(&ty, "four"), None);
    }

    #[test]
    fn containers_of_scalars_split_on_commas() {
        let ty = DType::List(ElementType::Int);
        assert_eq!(from_text(&ty, "1, 3,5 ,7"), Some(Value::list([1i64, 3, 5, 7])));
        assert_eq!(from_text(&ty, ""), Some(Value::List(Vec::new())));
        assert_eq!(from_text(&ty, "1,,3"), None);
        assert_eq!(
            from_text(&DType::Array(ElementType::Bool), "true,false"),
            Some(Value::array([true, false]))
        );
    }

    #[test]
    fn containers_of_records_read_json_arrays() {
        let unit = Schema::builder().field("abbr", DType::String).build();
        let ty = DType::List(ElementType::Record(unit));
        let Some(Value::List(items)) = from_text(&ty, r#"[{"abbr":"g"},{"abbr":"kg"}]"#) else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(from_text(&ty, r#"{"abbr":"g"}"#), None);
        assert_eq!(from_text(&ty, r#"[{"abbr":1}]"#), None);
    }
}
