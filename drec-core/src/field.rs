use alloc::borrow::Cow;
use alloc::string::String;

/// Something that names a field of a record.
///
/// Field enumerations implement this with an explicit table, one arm per
/// variant; the schema's [`Case`](crate::Case) turns the identifier into the
/// serialized key when the field is declared.
///
/// ```
/// use std::borrow::Cow;
/// use drec_core::FieldId;
///
/// enum Person {
///     FirstName,
///     Age,
/// }
///
/// impl FieldId for Person {
///     fn ident(&self) -> Cow<'_, str> {
///         Cow::Borrowed(match self {
///             Person::FirstName => "FirstName",
///             Person::Age => "Age",
///         })
///     }
/// }
///
/// assert_eq!(Person::FirstName.ident(), "FirstName");
/// ```
///
/// Plain strings work too, which is handy for ad-hoc schemas and for nested
/// records whose field enumeration lives elsewhere.
pub trait FieldId {
    /// The identifier before casing.
    fn ident(&self) -> Cow<'_, str>;
}

impl FieldId for str {
    fn ident(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl FieldId for String {
    fn ident(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: FieldId + ?Sized> FieldId for &T {
    fn ident(&self) -> Cow<'_, str> {
        (**self).ident()
    }
}
