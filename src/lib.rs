//! Bind the segments of a `/`-delimited path into the fields of a struct.
//!
//! A pattern such as `/{owner}/{repository}/issues/{number}` is matched
//! segment by segment against a path; every `{placeholder}` captures the
//! segment at its position, and each capture is stored in the field of the
//! destination whose name matches the placeholder (ignoring the case of the
//! first letter).
//!
//! ```
//! use path_mapper::PathRecord;
//!
//! #[derive(PathRecord, Debug, Clone, Default, PartialEq)]
//! struct Issue {
//!     owner: String,
//!     repository: String,
//!     number: u32,
//! }
//!
//! let mut issue = Issue::default();
//! path_mapper::map(
//!     "/{owner}/{repository}/issues/{number}",
//!     "/rust-lang/rust/issues/1",
//!     &mut issue,
//! )
//! .unwrap();
//! assert_eq!(issue.number, 1);
//! ```

use thiserror::Error;

pub mod convert;
pub mod index;
pub mod record;
pub mod segment;

pub use convert::{BoxError, ConverterRegistry, TargetKind, TypedValue, ValueConverter};
pub use index::{index_of, FieldIndex, FieldPath};
pub use path_mapper_derive::PathRecord;
pub use record::{Embed, Field, FieldMut, FieldShape, PathRecord, Schema};
pub use segment::{Capture, MatchError, Pattern, Segment};

use convert::CoerceError;

/// The ways binding a capture into a record can fail.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("destination must not be nil")]
    NilDestination,
    #[error("destination must be passed by mutable reference, not shared reference")]
    NotAddressable,
    #[error("converter for `{name}` rejected `{value}`")]
    ConversionError {
        name: String,
        value: String,
        #[source]
        source: BoxError,
    },
    #[error("`{value}` captured for `{name}` is invalid as {target_kind}")]
    TypeMismatch {
        name: String,
        value: String,
        target_kind: TargetKind,
    },
    #[error("unsupported conversion of `{name}` into `{kind}`")]
    UnsupportedType { name: String, kind: &'static str },
    #[error("field for `{name}` cannot be set")]
    NotSettable { name: String },
    #[error("converter for `{name}` produced a `{produced}`, which cannot be stored in a `{field_type}` field")]
    IncompatibleValue {
        name: String,
        produced: &'static str,
        field_type: &'static str,
    },
    #[error("no field of `{record}` matches placeholder `{name}`")]
    UnknownPlaceholder { name: String, record: &'static str },
}

/// Any failure of [`map`].
#[derive(Error, Debug)]
pub enum MappingError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Bind(#[from] BindError),
}

/// Something a record can be bound into.
///
/// Only `&mut R` is writable. `Option<&mut R>` is accepted and rejected
/// with [`BindError::NilDestination`] when empty, and `&R` is always
/// rejected with [`BindError::NotAddressable`].
pub trait Destination<'a> {
    type Record: PathRecord + Clone;

    fn into_record(self) -> Result<&'a mut Self::Record, BindError>;
}

impl<'a, R: PathRecord + Clone> Destination<'a> for &'a mut R {
    type Record = R;

    fn into_record(self) -> Result<&'a mut R, BindError> {
        Ok(self)
    }
}

impl<'a, R: PathRecord + Clone> Destination<'a> for Option<&'a mut R> {
    type Record = R;

    fn into_record(self) -> Result<&'a mut R, BindError> {
        self.ok_or(BindError::NilDestination)
    }
}

impl<'a, R: PathRecord + Clone> Destination<'a> for &'a R {
    type Record = R;

    fn into_record(self) -> Result<&'a mut R, BindError> {
        Err(BindError::NotAddressable)
    }
}

/// A configured binder: the converters to consult and whether every
/// placeholder must land in a field.
#[derive(Debug, Default)]
pub struct Mapper {
    converters: ConverterRegistry,
    strict: bool,
}

impl Mapper {
    /// A non-strict mapper with no converters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A non-strict mapper consulting `converters`.
    pub fn with_converters(converters: ConverterRegistry) -> Self {
        Mapper {
            converters,
            strict: false,
        }
    }

    /// In strict mode a named placeholder without a matching field is an
    /// error instead of being skipped. `{}` is skipped either way.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register a converter for placeholders named `name`.
    pub fn converter<F>(mut self, name: impl Into<String>, converter: F) -> Self
    where
        F: Fn(&str) -> Result<TypedValue, BoxError> + Send + Sync + 'static,
    {
        self.converters.register(name, converter);
        self
    }

    /// The converters this mapper consults.
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Mutable access for registering converters after construction.
    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }

    /// Whether unmatched named placeholders are an error.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Match `path` against `pattern` and bind the captures into `dest`.
    pub fn map<'a, D: Destination<'a>>(
        &self,
        pattern: &str,
        path: &str,
        dest: D,
    ) -> Result<(), MappingError> {
        self.binder().map(pattern, path, dest)
    }

    /// Bind already captured values into `dest`.
    pub fn bind<'a, D: Destination<'a>>(
        &self,
        capture: &Capture<'_, '_>,
        dest: D,
    ) -> Result<(), BindError> {
        self.binder().bind(capture, dest)
    }

    fn binder(&self) -> Binder<'_> {
        Binder {
            converters: &self.converters,
            strict: self.strict,
        }
    }
}

struct Binder<'c> {
    converters: &'c ConverterRegistry,
    strict: bool,
}

impl Binder<'_> {
    fn map<'a, D: Destination<'a>>(
        &self,
        pattern: &str,
        path: &str,
        dest: D,
    ) -> Result<(), MappingError> {
        tracing::debug!(pattern, path, strict = self.strict, "mapping path");
        let pattern = Pattern::parse(pattern);
        let result = pattern
            .match_path(path)
            .map_err(MappingError::from)
            .and_then(|capture| self.bind(&capture, dest).map_err(MappingError::from));
        if let Err(error) = &result {
            tracing::debug!(error = %error, "mapping failed");
        }
        result
    }

    /// The values are written into a copy of the destination, which replaces
    /// it only once every placeholder has been stored. On error `dest` is
    /// left untouched.
    fn bind<'a, D: Destination<'a>>(
        &self,
        capture: &Capture<'_, '_>,
        dest: D,
    ) -> Result<(), BindError> {
        let dest = dest.into_record()?;
        let index = index_of::<D::Record>();
        let mut scratch = dest.clone();

        for &(name, value) in capture.iter() {
            let Some(field_path) = index.resolve(name) else {
                if self.strict && !name.is_empty() {
                    return Err(BindError::UnknownPlaceholder {
                        name: name.to_string(),
                        record: index.type_name(),
                    });
                }
                tracing::trace!(placeholder = name, "no matching field, skipped");
                continue;
            };
            self.bind_field(&mut scratch, field_path, name, value)?;
        }

        *dest = scratch;
        Ok(())
    }

    fn bind_field(
        &self,
        target: &mut dyn PathRecord,
        field_path: &FieldPath,
        name: &str,
        value: &str,
    ) -> Result<(), BindError> {
        if !field_path.settable {
            return Err(BindError::NotSettable {
                name: name.to_string(),
            });
        }

        let unsupported = || BindError::UnsupportedType {
            name: name.to_string(),
            kind: field_path.type_name,
        };
        let field = record::field_at(target, &field_path.steps).ok_or_else(unsupported)?;

        if let Some(converter) = self.converters.get(name) {
            let converted = converter
                .convert(value)
                .map_err(|source| BindError::ConversionError {
                    name: name.to_string(),
                    value: value.to_string(),
                    source,
                })?;
            let incompatible = |produced: &TypedValue| BindError::IncompatibleValue {
                name: name.to_string(),
                produced: produced.type_name(),
                field_type: field_path.type_name,
            };
            return match field {
                FieldMut::Value(slot) => converted
                    .store(slot)
                    .map_err(|rejected| incompatible(&rejected)),
                FieldMut::Record(_) => Err(incompatible(&converted)),
            };
        }

        match field {
            FieldMut::Value(slot) => convert::coerce(slot, value).map_err(|error| match error {
                CoerceError::Mismatch(target_kind) => BindError::TypeMismatch {
                    name: name.to_string(),
                    value: value.to_string(),
                    target_kind,
                },
                CoerceError::Unsupported => unsupported(),
            }),
            FieldMut::Record(_) => Err(unsupported()),
        }
    }
}

/// Map `path` onto `dest` with built-in conversions only.
pub fn map<'a, D: Destination<'a>>(pattern: &str, path: &str, dest: D) -> Result<(), MappingError> {
    map_with_converters(pattern, path, dest, &ConverterRegistry::new())
}

/// Map `path` onto `dest`, consulting `converters` before the built-in
/// conversions.
pub fn map_with_converters<'a, D: Destination<'a>>(
    pattern: &str,
    path: &str,
    dest: D,
    converters: &ConverterRegistry,
) -> Result<(), MappingError> {
    Binder {
        converters,
        strict: false,
    }
    .map(pattern, path, dest)
}
