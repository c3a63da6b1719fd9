use std::borrow::Cow;

use drec::{DError, DType, ElementType, FieldId, JsonValue, Posix, Record, Schema, Value};
use eyre::Result;
use insta::assert_snapshot;

#[derive(Debug, Clone, Copy)]
enum Scalar {
    Booly,
    Chary,
    Floaty,
    Inty,
    Jsony,
    Stringy,
}

impl FieldId for Scalar {
    fn ident(&self) -> Cow<'_, str> {
        Cow::Borrowed(match self {
            Scalar::Booly => "Booly",
            Scalar::Chary => "Chary",
            Scalar::Floaty => "Floaty",
            Scalar::Inty => "Inty",
            Scalar::Jsony => "Jsony",
            Scalar::Stringy => "Stringy",
        })
    }
}

fn scalar_schema() -> Schema {
    Schema::builder()
        .field(Scalar::Booly, DType::Bool)
        .field(Scalar::Chary, DType::Char)
        .field(Scalar::Floaty, DType::Float)
        .field(Scalar::Inty, DType::Int)
        .field(Scalar::Jsony, DType::Json)
        .field(Scalar::Stringy, DType::String)
        .build()
}

#[test]
fn scalars_round_trip() -> Result<()> {
    drec_testhelpers::setup();

    let json = r#"{"booly":true,"chary":67,"floaty":3.14,"inty":1357,"jsony":"JSON","stringy":"lorem ipsum"}"#;
    let record = drec::from_str(&scalar_schema(), json)?;

    assert!(record.is_valid());
    assert_eq!(record.get_bool(Scalar::Booly), Ok(true));
    assert_eq!(record.get_char(Scalar::Chary), Ok('C'));
    assert_eq!(record.get_float(Scalar::Floaty), Ok(3.14));
    assert_eq!(record.get_int(Scalar::Inty), Ok(1357));
    assert_eq!(
        record.get_json(Scalar::Jsony),
        Ok(&JsonValue::String("JSON".into()))
    );
    assert_eq!(record.get_string(Scalar::Stringy), Ok("lorem ipsum"));
    assert_eq!(record.stringify(), json);
    Ok(())
}

#[test]
fn typed_setters_encode_in_declaration_order() -> Result<()> {
    drec_testhelpers::setup();

    let mut record = Record::new(&scalar_schema());
    record
        .set_string(Scalar::Stringy, "lorem ipsum")
        .set_json(Scalar::Jsony, JsonValue::String("JSON".into()))
        .set_int(Scalar::Inty, 1357)
        .set_float(Scalar::Floaty, 3.14)
        .set_char(Scalar::Chary, 'C')
        .set_bool(Scalar::Booly, true);

    assert_eq!(
        record.stringify(),
        r#"{"booly":true,"chary":67,"floaty":3.14,"inty":1357,"jsony":"JSON","stringy":"lorem ipsum"}"#
    );
    Ok(())
}

#[test]
fn absent_optionals_are_omitted() -> Result<()> {
    drec_testhelpers::setup();

    let schema = Schema::builder()
        .field("Inty", DType::Optional(ElementType::Int))
        .field("Stringy", DType::Optional(ElementType::String))
        .build();

    let empty = drec::from_str(&schema, "{}")?;
    assert!(empty.is_valid());
    assert_eq!(empty.get_optional("Inty"), Ok(None));
    assert_eq!(empty.stringify(), "{}");

    let one = drec::from_str(&schema, r#"{"inty":null,"stringy":"lorem ipsum"}"#)?;
    assert_eq!(
        one.get_optional("Stringy"),
        Ok(Some(&Value::String("lorem ipsum".into())))
    );
    assert_eq!(one.stringify(), r#"{"stringy":"lorem ipsum"}"#);

    assert_eq!(
        drec::from_str(&schema, r#"{"inty":"3"}"#).unwrap_err(),
        DError::decoding("inty", "expected an integer, got string")
    );
    Ok(())
}

#[test]
fn lists_and_arrays() -> Result<()> {
    drec_testhelpers::setup();

    let schema = Schema::builder()
        .field("Listy", DType::List(ElementType::Int))
        .field("Arrayy", DType::Array(ElementType::Int))
        .build();

    let json = r#"{"listy":[1,3,5,7],"arrayy":[1,3,5,7]}"#;
    let record = drec::from_str(&schema, json)?;
    let odd = [1i64, 3, 5, 7].map(Value::Int);
    assert_eq!(record.get_list("Listy")?, odd);
    assert_eq!(record.get_array("Arrayy")?, odd);
    assert_eq!(record.stringify(), json);

    let empty = drec::from_str(&schema, r#"{"listy":[],"arrayy":[]}"#)?;
    assert!(empty.is_valid());
    assert!(empty.get_list("Listy")?.is_empty());
    Ok(())
}

#[test]
fn posix_is_integer_milliseconds() -> Result<()> {
    drec_testhelpers::setup();

    let schema = Schema::builder().field("At", DType::Posix).build();
    let record = drec::from_str(&schema, r#"{"at":1700000000000}"#)?;
    assert_eq!(record.get_posix("At"), Ok(Posix::from_millis(1_700_000_000_000)));
    assert_eq!(record.stringify(), r#"{"at":1700000000000}"#);
    Ok(())
}

fn level_schema() -> Schema {
    let unit = Schema::builder()
        .field("Abbr", DType::String)
        .field("Long", DType::String)
        .build();
    let entry = Schema::builder()
        .field("Description", DType::String)
        .field("Measurement", DType::Float)
        .field("Unit", DType::Record(unit))
        .build();
    Schema::builder()
        .field("Name", DType::String)
        .field("Entry", DType::Record(entry))
        .build()
}

#[test]
fn nested_records_round_trip_byte_for_byte() -> Result<()> {
    drec_testhelpers::setup();

    let json = r#"{"name":"Level 0","entry":{"description":"Tower measurement","measurement":314.5,"unit":{"abbr":"m","long":"meters"}}}"#;
    let record = drec::from_str(&level_schema(), json)?;

    let unit = record.get_record("Entry")?.get_record("Unit")?;
    assert_eq!(unit.get_string("Abbr"), Ok("m"));
    assert_eq!(record.stringify(), json);
    Ok(())
}

#[test]
fn pretty_output_uses_the_outer_indent() -> Result<()> {
    drec_testhelpers::setup();

    let json = r#"{"name":"Level 0","entry":{"description":"Tower measurement","measurement":314.5,"unit":{"abbr":"m","long":"meters"}}}"#;
    let record = drec::from_str(&level_schema(), json)?;

    assert_snapshot!(drec::to_string_pretty(&record, 2), @r#"
    {
      "name": "Level 0",
      "entry": {
        "description": "Tower measurement",
        "measurement": 314.5,
        "unit": {
          "abbr": "m",
          "long": "meters"
        }
      }
    }
    "#);
    Ok(())
}

#[test]
fn decode_failures_name_the_path() -> Result<()> {
    drec_testhelpers::setup();

    let schema = level_schema();
    let missing = r#"{"name":"Level 0","entry":{"description":"d","measurement":1,"unit":{"abbr":"m"}}}"#;
    assert_eq!(
        drec::from_str(&schema, missing).unwrap_err(),
        DError::decoding("entry.unit.long", "missing")
    );

    let wrong = r#"{"name":7}"#;
    assert_eq!(
        drec::from_str(&schema, wrong).unwrap_err(),
        DError::decoding("name", "expected a string, got integer")
    );

    let tags = Schema::builder()
        .field("Tags", DType::List(ElementType::String))
        .build();
    assert_eq!(
        drec::from_str(&tags, r#"{"tags":["a","b",3]}"#).unwrap_err(),
        DError::decoding("tags[2]", "expected a string, got integer")
    );
    Ok(())
}

#[test]
fn malformed_json_fails_at_the_document() -> Result<()> {
    drec_testhelpers::setup();

    let err = drec::from_str(&scalar_schema(), r#"{"booly" true}"#).unwrap_err();
    let DError::DecodingFailed { path, reason } = &err else {
        panic!("expected a decoding failure, got {err:?}");
    };
    assert_eq!(path, "");
    assert!(reason.ends_with("at byte 9"), "{reason}");
    Ok(())
}

#[test]
fn broken_schemas_refuse_to_decode() -> Result<()> {
    drec_testhelpers::setup();

    let schema = Schema::builder()
        .field("Name", DType::String)
        .field("name", DType::String)
        .build();
    let err = drec::from_str(&schema, r#"{"name":"x"}"#).unwrap_err();
    assert!(matches!(err, DError::DecodingFailed { ref path, .. } if path.is_empty()));

    let mut record = Record::new(&schema);
    assert!(!record.is_valid());
    record.set_string("Name", "Ada");
    assert!(record.has_value("Name"));
    assert!(!record.is_valid());
    assert_eq!(
        record.error_messages(),
        ["Field `name` is declared more than once"]
    );
    assert_eq!(record.stringify(), "{}");
    Ok(())
}

#[test]
fn unknown_json_keys_are_ignored() -> Result<()> {
    drec_testhelpers::setup();

    let schema = Schema::builder().field("Inty", DType::Int).build();
    let record = drec::from_str(&schema, r#"{"extra":[1,2],"inty":3}"#)?;
    assert_eq!(record.stringify(), r#"{"inty":3}"#);

    let again = record.decode_value(&record.encode())?;
    assert_eq!(again, record);
    Ok(())
}
