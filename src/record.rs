//! The reflective view of a destination struct.
//!
//! A [`PathRecord`] publishes a static [`Schema`] describing its fields and
//! hands out mutable access to them by position. Both halves are normally
//! generated by `#[derive(PathRecord)]`.

use std::any::Any;
use std::fmt;

/// Static description of a record type.
#[derive(Debug)]
pub struct Schema {
    pub type_name: &'static str,
    pub fields: &'static [Field],
}

/// One visible field of a record.
pub struct Field {
    /// The declared identifier, without any `r#` prefix.
    pub ident: &'static str,
    /// Overrides `ident` as the lookup name.
    pub alias: Option<&'static str>,
    /// The field type as written in the struct.
    pub type_name: &'static str,
    pub settable: bool,
    pub shape: FieldShape,
}

impl Field {
    /// The name placeholders are matched against, before case folding.
    pub fn lookup_name(&self) -> &'static str {
        self.alias.unwrap_or(self.ident)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("ident", &self.ident)
            .field("alias", &self.alias)
            .field("type_name", &self.type_name)
            .field("settable", &self.settable)
            .field("embedded", &matches!(self.shape, FieldShape::Embedded(_)))
            .finish()
    }
}

#[derive(Clone, Copy)]
pub enum FieldShape {
    /// A leaf holding a value.
    Value,
    /// An embedded record whose fields are promoted into the parent.
    Embedded(fn() -> &'static Schema),
}

/// Mutable access to a field, as handed out by [`PathRecord::field_mut`].
pub enum FieldMut<'a> {
    Value(&'a mut dyn Any),
    Record(&'a mut dyn PathRecord),
}

/// A struct that path segments can be bound into.
///
/// `field_mut(i)` must agree with `schema().fields[i]`: a
/// [`FieldShape::Value`] field yields [`FieldMut::Value`] and an
/// [`FieldShape::Embedded`] field yields [`FieldMut::Record`], allocating
/// the embedded record if it is absent.
pub trait PathRecord: Any {
    fn schema() -> &'static Schema
    where
        Self: Sized;

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;
}

/// Reaches the record behind an embedded field.
///
/// Implemented by the derive for every record, and for `Box` and `Option`
/// wrappers around one. An empty `Option` is filled with `Default::default()`.
pub trait Embed {
    type Target: PathRecord;

    fn embedded_mut(&mut self) -> &mut Self::Target;
}

impl<T: Embed> Embed for Box<T> {
    type Target = T::Target;

    fn embedded_mut(&mut self) -> &mut Self::Target {
        (**self).embedded_mut()
    }
}

impl<T: Embed + Default> Embed for Option<T> {
    type Target = T::Target;

    fn embedded_mut(&mut self) -> &mut Self::Target {
        self.get_or_insert_with(T::default).embedded_mut()
    }
}

/// Walk `steps` from `record`, descending through embedded records.
pub(crate) fn field_at<'r>(record: &'r mut dyn PathRecord, steps: &[usize]) -> Option<FieldMut<'r>> {
    let (&first, rest) = steps.split_first()?;
    let field = record.field_mut(first)?;
    if rest.is_empty() {
        return Some(field);
    }
    match field {
        FieldMut::Record(inner) => field_at(inner, rest),
        FieldMut::Value(_) => None,
    }
}
