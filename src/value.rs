use serde::Serialize;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A value with a generic JSON encoding that may fail at runtime.
///
/// Blanket-implemented for every `Serialize + Debug` type. The `Debug`
/// bound supplies the fallback text when serialization is rejected (for
/// example a map whose keys are not strings).
pub trait Structured: fmt::Debug + Send + Sync {
    /// Append the JSON encoding of `self` to `out`.
    ///
    /// On error `out` may hold a partial write; the caller truncates it.
    fn write_json(&self, out: &mut Vec<u8>) -> serde_json::Result<()>;

    /// Name of the concrete type, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T> Structured for T
where
    T: Serialize + fmt::Debug + Send + Sync + ?Sized,
{
    fn write_json(&self, out: &mut Vec<u8>) -> serde_json::Result<()> {
        serde_json::to_writer(out, self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A dynamically-typed argument of a log call.
///
/// Scalars get their own variants so they are written without going through
/// serde. Everything else is either [`Value::Structured`] (has a JSON
/// encoding, which may still fail) or [`Value::Opaque`] (only `Debug`).
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    I128(i128),
    U128(u128),
    F32(f32),
    F64(f64),
    Str(String),
    /// Encoded as its `Display` text; at field level the encoder also
    /// appends a `callstack` sibling field.
    Error(Arc<dyn Error + Send + Sync>),
    Structured(Arc<dyn Structured>),
    Opaque {
        type_name: &'static str,
        value: Arc<dyn fmt::Debug + Send + Sync>,
    },
}

impl Value {
    pub fn error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Value::Error(Arc::new(err))
    }

    pub fn structured<T>(value: T) -> Self
    where
        T: Serialize + fmt::Debug + Send + Sync + 'static,
    {
        Value::Structured(Arc::new(value))
    }

    /// Wrap a value that can only be shown through `Debug`, such as a
    /// closure wrapper or a handle.
    pub fn opaque<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Value::Opaque {
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// The key this value names when it sits at a key position, or `None`
    /// if it is not a non-empty string.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Value::Str(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident($target:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $target)
                }
            }

            impl From<&$ty> for Value {
                fn from(v: &$ty) -> Self {
                    Value::$variant(*v as $target)
                }
            }
        )*
    };
}

impl_from_scalar! {
    i8 => I64(i64),
    i16 => I64(i64),
    i32 => I64(i64),
    i64 => I64(i64),
    isize => I64(i64),
    u8 => U64(u64),
    u16 => U64(u64),
    u32 => U64(u64),
    u64 => U64(u64),
    usize => U64(u64),
    i128 => I128(i128),
    u128 => U128(u128),
    f32 => F32(f32),
    f64 => F64(f64),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&bool> for Value {
    fn from(v: &bool) -> Self {
        Value::Bool(*v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(v: Cow<'_, str>) -> Self {
        Value::Str(v.into_owned())
    }
}

/// `None` is null and `Some(v)` converts `v`. Nested options flatten, so
/// `Some(Some(3))` is `I64(3)` and `Some(None)` is `Null`.
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl From<Box<dyn Error + Send + Sync>> for Value {
    fn from(err: Box<dyn Error + Send + Sync>) -> Self {
        Value::Error(Arc::from(err))
    }
}

impl From<Arc<dyn Error + Send + Sync>> for Value {
    fn from(err: Arc<dyn Error + Send + Sync>) -> Self {
        Value::Error(err)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::structured(v)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn from(v: Vec<T>) -> Self {
        Value::structured(v)
    }
}
