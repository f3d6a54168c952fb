use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Error type returned by converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A value produced by a [`ValueConverter`], ready to be stored in a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    Str(String),
}

macro_rules! typed_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TypedValue {
                fn from(value: $ty) -> Self {
                    TypedValue::$variant(value)
                }
            }
        )*

        impl TypedValue {
            /// Name of the carried type, e.g. `u16`.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(TypedValue::$variant(_) => stringify!($ty),)*
                }
            }

            /// Store into `slot` if it holds the same type, bare or behind one
            /// `Option`/`Box`. Returns the value back when the types differ.
            pub(crate) fn store(self, slot: &mut dyn Any) -> Result<(), TypedValue> {
                match self {
                    $(
                        TypedValue::$variant(value) => match Slot::<$ty>::of(slot) {
                            Some(target) => {
                                target.set(value);
                                Ok(())
                            }
                            None => Err(TypedValue::$variant(value)),
                        },
                    )*
                }
            }
        }
    };
}

typed_value_from!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    String => Str,
);

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::Str(value.to_string())
    }
}

/// A field typed `T`, possibly behind one level of indirection.
enum Slot<'a, T> {
    Plain(&'a mut T),
    Optional(&'a mut Option<T>),
    Boxed(&'a mut Box<T>),
    OptionalBoxed(&'a mut Option<Box<T>>),
}

impl<'a, T: 'static> Slot<'a, T> {
    fn of(slot: &'a mut dyn Any) -> Option<Self> {
        if slot.is::<T>() {
            slot.downcast_mut::<T>().map(Slot::Plain)
        } else if slot.is::<Option<T>>() {
            slot.downcast_mut::<Option<T>>().map(Slot::Optional)
        } else if slot.is::<Box<T>>() {
            slot.downcast_mut::<Box<T>>().map(Slot::Boxed)
        } else {
            slot.downcast_mut::<Option<Box<T>>>().map(Slot::OptionalBoxed)
        }
    }

    fn set(self, value: T) {
        match self {
            Slot::Plain(target) => *target = value,
            Slot::Optional(target) => *target = Some(value),
            Slot::Boxed(target) => **target = value,
            Slot::OptionalBoxed(target) => *target = Some(Box::new(value)),
        }
    }
}

/// The family a built-in numeric parse was aiming for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Int,
    Uint,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Int => f.write_str("int"),
            TargetKind::Uint => f.write_str("uint"),
        }
    }
}

/// Why built-in coercion could not fill a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoerceError {
    Mismatch(TargetKind),
    Unsupported,
}

/// Parse `value` according to the type held in `slot` and store it.
pub(crate) fn coerce(slot: &mut dyn Any, value: &str) -> Result<(), CoerceError> {
    macro_rules! parse_into {
        ($kind:ident, $signed:expr; $($ty:ty),*) => {
            $(
                if let Some(target) = Slot::<$ty>::of(slot) {
                    // Unsigned fields take digits only, `+` included.
                    if !$signed && value.starts_with('+') {
                        return Err(CoerceError::Mismatch(TargetKind::$kind));
                    }
                    let parsed = value
                        .parse::<$ty>()
                        .map_err(|_| CoerceError::Mismatch(TargetKind::$kind))?;
                    target.set(parsed);
                    return Ok(());
                }
            )*
        };
    }

    parse_into!(Int, true; i8, i16, i32, i64, i128, isize);
    parse_into!(Uint, false; u8, u16, u32, u64, u128, usize);

    if let Some(target) = Slot::<String>::of(slot) {
        target.set(value.to_string());
        return Ok(());
    }

    Err(CoerceError::Unsupported)
}

/// Custom conversion from a captured segment to a field value.
pub trait ValueConverter: Send + Sync {
    fn convert(&self, value: &str) -> Result<TypedValue, BoxError>;
}

impl<F> ValueConverter for F
where
    F: Fn(&str) -> Result<TypedValue, BoxError> + Send + Sync,
{
    fn convert(&self, value: &str) -> Result<TypedValue, BoxError> {
        self(value)
    }
}

/// Converters keyed by placeholder name.
///
/// Registering requires `&mut self`, so a registry can only change while
/// nothing is binding with it. Share it by reference (or `Arc`) once it is
/// populated.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Box<dyn ValueConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `converter` for placeholders named `name`, replacing any
    /// earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, converter: F) -> &mut Self
    where
        F: Fn(&str) -> Result<TypedValue, BoxError> + Send + Sync + 'static,
    {
        self.register_converter(name, converter)
    }

    /// Like [`register`](Self::register), for types implementing [`ValueConverter`].
    pub fn register_converter<C>(&mut self, name: impl Into<String>, converter: C) -> &mut Self
    where
        C: ValueConverter + 'static,
    {
        let name = name.into();
        if self.converters.insert(name.clone(), Box::new(converter)).is_some() {
            tracing::debug!(placeholder = name.as_str(), "replaced converter");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ValueConverter> {
        self.converters.get(name).map(|converter| converter.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_plain_and_wrapped() {
        let mut number: i32 = 0;
        coerce(&mut number, "-42").unwrap();
        assert_eq!(number, -42);

        let mut owner: Option<String> = None;
        coerce(&mut owner, "alice").unwrap();
        assert_eq!(owner.as_deref(), Some("alice"));

        let mut boxed: Box<u16> = Box::new(0);
        coerce(&mut boxed, "7").unwrap();
        assert_eq!(*boxed, 7);

        let mut pointer: Option<Box<u64>> = None;
        coerce(&mut pointer, "9").unwrap();
        assert_eq!(pointer, Some(Box::new(9)));
    }

    #[test]
    fn test_coerce_rejects_bad_numbers() {
        let mut signed: i64 = 5;
        assert_eq!(
            coerce(&mut signed, "abc"),
            Err(CoerceError::Mismatch(TargetKind::Int))
        );
        assert_eq!(signed, 5);

        let mut unsigned: u32 = 0;
        assert_eq!(
            coerce(&mut unsigned, "-1"),
            Err(CoerceError::Mismatch(TargetKind::Uint))
        );

        let mut small: u8 = 0;
        assert_eq!(
            coerce(&mut small, "256"),
            Err(CoerceError::Mismatch(TargetKind::Uint))
        );

        assert_eq!(
            coerce(&mut unsigned, "+7"),
            Err(CoerceError::Mismatch(TargetKind::Uint))
        );
        assert_eq!(unsigned, 0);

        assert_eq!(coerce(&mut signed, "+7"), Ok(()));
        assert_eq!(signed, 7);
    }

    #[test]
    fn test_coerce_unsupported() {
        let mut flag = false;
        assert_eq!(coerce(&mut flag, "true"), Err(CoerceError::Unsupported));

        let mut nested: Option<Option<String>> = None;
        assert_eq!(coerce(&mut nested, "x"), Err(CoerceError::Unsupported));
    }

    #[test]
    fn test_store_checks_type() {
        let mut owner = String::new();
        TypedValue::from("#1").store(&mut owner).unwrap();
        assert_eq!(owner, "#1");

        let mut number: i64 = 0;
        let rejected = TypedValue::I32(3).store(&mut number).unwrap_err();
        assert_eq!(rejected.type_name(), "i32");
        assert_eq!(number, 0);

        let mut optional: Option<i32> = None;
        TypedValue::I32(3).store(&mut optional).unwrap();
        assert_eq!(optional, Some(3));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ConverterRegistry::new();
        registry.register("id", |_| Ok(1i64.into()));
        registry.register("id", |_| Ok(2i64.into()));

        assert_eq!(registry.len(), 1);
        let converted = registry.get("id").unwrap().convert("x").unwrap();
        assert_eq!(converted, TypedValue::I64(2));
        assert!(registry.get("Id").is_none());
    }
}
