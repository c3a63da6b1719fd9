use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::collections::HashMap;

use log::{debug, trace};

use crate::{Case, DError, DType, FieldId};

/// An immutable, shareable description of a record: its fields in declaration
/// order, their types, and how keys and JSON output are formatted.
///
/// Cloning is cheap; every record and every parent schema that nests this one
/// holds the same allocation. Because a schema can only nest schemas that
/// were already built, nesting can never form a cycle.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaDef>,
}

#[derive(Default)]
struct SchemaDef {
    /// Keys in declaration order.
    keys: Vec<String>,
    types: HashMap<String, DType>,
    /// Identifier, before casing, to key.
    idents: HashMap<String, String>,
    messages: HashMap<String, String>,
    case: Case,
    indent: usize,
    errors: Vec<DError>,
}

impl Schema {
    /// A builder with snake_case keys and compact output.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new(Case::Snake, 0)
    }

    /// Keys in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.inner.keys.iter().map(String::as_str)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.inner.keys.len()
    }

    /// Returns `true` if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.inner.keys.is_empty()
    }

    /// The declared type for `key`.
    pub fn type_of(&self, key: &str) -> Option<&DType> {
        self.inner.types.get(key)
    }

    /// Returns `true` if `key` is declared.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.types.contains_key(key)
    }

    /// The custom validation message declared for `key`.
    pub fn message_for(&self, key: &str) -> Option<&str> {
        self.inner.messages.get(key).map(String::as_str)
    }

    /// The key casing rule.
    pub fn case(&self) -> Case {
        self.inner.case
    }

    /// Spaces per nesting level when records of this schema are stringified.
    pub fn indent(&self) -> usize {
        self.inner.indent
    }

    /// Problems found while the schema was built. A schema with errors makes
    /// every record built on it invalid.
    pub fn errors(&self) -> &[DError] {
        &self.inner.errors
    }

    /// The key a field identifier maps to.
    ///
    /// Identifiers that were declared resolve through the table built at
    /// declaration time; a string that already is a declared key resolves to
    /// itself; anything else is cased with the schema's rule, which yields a
    /// key the schema does not declare.
    pub fn key_of<F: FieldId + ?Sized>(&self, field: &F) -> Cow<'_, str> {
        let ident = field.ident();
        if let Some(key) = self.inner.idents.get(&*ident) {
            return Cow::Borrowed(key.as_str());
        }
        if let Some((key, _)) = self.inner.types.get_key_value(&*ident) {
            return Cow::Borrowed(key.as_str());
        }
        Cow::Owned(self.inner.case.apply(&ident))
    }

    /// Returns `true` if both handles point at the same schema.
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Two schemas are equal when they are the same schema, or declare the same
/// keys, in the same order, with equal types.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.inner.keys == other.inner.keys && self.inner.types == other.inner.types)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in &self.inner.keys {
            map.entry(key, &self.inner.types[key]);
        }
        map.finish()
    }
}

/// `{name: String, entry: Record {description: String}}`
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, key) in self.inner.keys.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, self.inner.types[key])?;
        }
        write!(f, "}}")
    }
}

/// Accumulates field declarations, in order, into a [`Schema`].
///
/// Building never fails: declaring a key twice is recorded as a
/// [`DError::DuplicateField`] on the schema and the second declaration is
/// otherwise ignored.
pub struct SchemaBuilder {
    def: SchemaDef,
}

impl SchemaBuilder {
    /// An empty builder with the given key casing and output indentation.
    pub fn new(case: Case, indent: usize) -> Self {
        Self {
            def: SchemaDef {
                case,
                indent,
                ..SchemaDef::default()
            },
        }
    }

    /// Sets the indentation used when records are stringified.
    pub fn indent(mut self, indent: usize) -> Self {
        self.def.indent = indent;
        self
    }

    /// Declares a field.
    pub fn field(self, field: impl FieldId, ty: DType) -> Self {
        self.declare(&field, ty, None)
    }

    /// Declares a field whose rejected input is reported with `message`
    /// instead of a generated one.
    pub fn field_with_message(
        self,
        field: impl FieldId,
        ty: DType,
        message: impl Into<String>,
    ) -> Self {
        self.declare(&field, ty, Some(message.into()))
    }

    fn declare(mut self, field: &dyn FieldId, ty: DType, message: Option<String>) -> Self {
        let ident = field.ident();
        let key = self.def.case.apply(&ident);

        if self.def.types.contains_key(&key) {
            debug!("Duplicate field declaration for key {key:?}");
            self.def.errors.push(DError::DuplicateField { key });
            return self;
        }

        trace!("Declaring field {key:?}: {ty}");
        self.def.keys.push(key.clone());
        self.def.idents.insert(ident.to_string(), key.clone());
        if let Some(message) = message {
            self.def.messages.insert(key.clone(), message);
        }
        self.def.types.insert(key, ty);
        self
    }

    /// Freezes the declarations into a shareable schema.
    pub fn build(self) -> Schema {
        Schema {
            inner: Arc::new(self.def),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementType;

    #[test]
    fn keys_keep_declaration_order() {
        let schema = Schema::builder()
            .field("Zeta", DType::Int)
            .field("Alpha", DType::String)
            .field("MiddleName", DType::Optional(ElementType::String))
            .build();
        assert_eq!(
            schema.fields().collect::<Vec<_>>(),
            ["zeta", "alpha", "middle_name"]
        );
        assert_eq!(schema.type_of("alpha"), Some(&DType::String));
        assert!(schema.errors().is_empty());
    }

    #[test]
    fn duplicates_are_recorded_not_applied() {
        let schema = Schema::builder()
            .field("Name", DType::String)
            .field("name", DType::Int)
            .build();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.type_of("name"), Some(&DType::String));
        assert_eq!(
            schema.errors(),
            [DError::DuplicateField {
                key: "name".into()
            }]
        );
    }

    #[test]
    fn identifiers_resolve_through_the_declaration_table() {
        let schema = SchemaBuilder::new(Case::Camel, 2)
            .field("first_name", DType::String)
            .build();
        assert_eq!(schema.key_of("first_name"), "firstName");
        assert_eq!(schema.key_of("firstName"), "firstName");
        assert_eq!(schema.key_of("last_name"), "lastName");
        assert!(!schema.contains("lastName"));
        assert_eq!(schema.indent(), 2);
    }

    #[test]
    fn custom_messages() {
        let schema = Schema::builder()
            .field_with_message("Age", DType::Int, "Age must be a whole number")
            .build();
        assert_eq!(schema.message_for("age"), Some("Age must be a whole number"));
        assert_eq!(schema.message_for("other"), None);
    }

    #[test]
    fn equality_is_structural() {
        let a = Schema::builder().field("x", DType::Int).build();
        let b = Schema::builder().field("x", DType::Int).build();
        let c = Schema::builder().field("x", DType::Float).build();
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "{x: Int}");
    }
}
