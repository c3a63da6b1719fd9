use std::borrow::Cow;

use drec_core::{Case, DError, DType, ElementType, FieldId, Schema, SchemaBuilder};
use eyre::Result;

#[derive(Debug, Clone, Copy)]
enum Measurement {
    Description,
    Measurement,
    Unit,
}

impl FieldId for Measurement {
    fn ident(&self) -> Cow<'_, str> {
        Cow::Borrowed(match self {
            Measurement::Description => "Description",
            Measurement::Measurement => "Measurement",
            Measurement::Unit => "Unit",
        })
    }
}

fn unit_schema() -> Schema {
    Schema::builder()
        .field("Abbr", DType::String)
        .field("Long", DType::String)
        .build()
}

#[test]
fn enum_fields_are_cased_at_declaration() -> Result<()> {
    drec_testhelpers::setup();

    let schema = Schema::builder()
        .field(Measurement::Description, DType::String)
        .field(Measurement::Measurement, DType::Float)
        .field(Measurement::Unit, DType::Record(unit_schema()))
        .build();

    assert_eq!(
        schema.fields().collect::<Vec<_>>(),
        ["description", "measurement", "unit"]
    );
    assert_eq!(schema.key_of(&Measurement::Unit), "unit");
    assert_eq!(schema.type_of("unit"), Some(&DType::Record(unit_schema())));
    Ok(())
}

#[test]
fn nested_schemas_are_shared_not_copied() -> Result<()> {
    drec_testhelpers::setup();

    let unit = unit_schema();
    let parent = Schema::builder()
        .field("Unit", DType::Record(unit.clone()))
        .field("Units", DType::List(ElementType::Record(unit.clone())))
        .build();

    let Some(DType::Record(nested)) = parent.type_of("unit") else {
        eyre::bail!("unit should be a record field");
    };
    assert!(nested.ptr_eq(&unit));
    assert_eq!(
        parent.type_of("units").and_then(DType::element),
        Some(&ElementType::Record(unit))
    );
    Ok(())
}

#[test]
fn duplicate_declarations_leave_a_schema_error() -> Result<()> {
    drec_testhelpers::setup();

    let schema = SchemaBuilder::new(Case::Kebab, 0)
        .field("FirstName", DType::String)
        .field("Age", DType::Int)
        .field("first_name", DType::Bool)
        .build();

    assert_eq!(schema.fields().collect::<Vec<_>>(), ["first-name", "age"]);
    assert_eq!(
        schema.errors(),
        [DError::DuplicateField {
            key: "first-name".into()
        }]
    );
    assert_eq!(
        schema.errors()[0].to_string(),
        "Field `first-name` is declared more than once"
    );
    Ok(())
}

#[test]
fn display_describes_nesting() {
    drec_testhelpers::setup();

    let schema = Schema::builder()
        .field("Name", DType::String)
        .field("Unit", DType::Record(unit_schema()))
        .field("Tags", DType::Optional(ElementType::String))
        .build();
    assert_eq!(
        schema.to_string(),
        "{name: String, unit: Record {abbr: String, long: String}, tags: Optional String}"
    );
}
