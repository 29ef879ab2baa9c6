//! The type chain: logical field types over physical root types.
//!
//! A `FieldType<T>` is either a root type (an identity over a physical
//! primitive such as `INTEGER` or `NVARCHAR(20)`) or a mapped type wrapping a
//! source type with a forward (source -> T) and backward (T -> source)
//! function. Encoding and decoding walk the whole chain on every call.
//!
//! ```ignore
//! let status = types::enumeration([Status::Active, Status::Banned], |s| s.id().to_string());
//! assert_eq!(status.root(), RootType::FixedString(6));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::db::escape::quote_literal;
use crate::db::value::{DatabaseValue, Value};

/// Physical primitive a type chain ultimately stores as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Double,
    /// Unbounded text
    Text,
    /// Text with a fixed maximum length
    FixedString(u32),
}

impl RootType {
    /// Column type used in table definitions.
    pub fn sql_type(&self) -> String {
        match self {
            RootType::TinyInt => "TINYINT".to_string(),
            RootType::SmallInt => "SMALLINT".to_string(),
            RootType::Int => "INTEGER".to_string(),
            RootType::BigInt => "BIGINT".to_string(),
            RootType::Real => "REAL".to_string(),
            RootType::Double => "FLOAT".to_string(),
            RootType::Text => "NVARCHAR".to_string(),
            RootType::FixedString(n) => format!("NVARCHAR({})", n),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            RootType::TinyInt | RootType::SmallInt | RootType::Int | RootType::BigInt
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, RootType::Real | RootType::Double)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, RootType::Text | RootType::FixedString(_))
    }

    /// Render a root value as an inline SQL literal.
    ///
    /// Only for constants the application controls (column defaults, index
    /// filters). Values coming from callers are always bound as parameters.
    pub fn literal(&self, value: &Value) -> String {
        if value.is_null() {
            return "NULL".to_string();
        }
        if self.is_integer() {
            if let Some(i) = value.as_i64() {
                return i.to_string();
            }
        }
        if self.is_float() {
            // Non-finite floats have no SQL literal form.
            return match value.as_f64() {
                Some(f) if f.is_finite() => format!("{:?}", f),
                _ => "NULL".to_string(),
            };
        }
        match value {
            Value::Text(s) => quote_literal(s),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => format!("{:?}", f),
            Value::Null => "NULL".to_string(),
        }
    }

    /// Coerce a backend value into this root's physical representation.
    ///
    /// A value with no lossless counterpart is passed through unchanged, so
    /// decoding it against the field type fails instead of reading back as
    /// NULL or a truncated number.
    pub fn coerce<V: DatabaseValue>(&self, value: &V) -> Value {
        if value.is_null_value() {
            return Value::Null;
        }
        let coerced = if self.is_integer() {
            value.as_i64().map(Value::Integer)
        } else if self.is_float() {
            value.as_f64().map(Value::Real)
        } else {
            value.as_string().map(Value::Text)
        };
        coerced.unwrap_or_else(|| value.to_value())
    }
}

impl fmt::Display for RootType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_type())
    }
}

/// A root value had no counterpart in the logical type.
///
/// Usually means stored data is corrupt or the id derivation of a mapped type
/// changed after rows were written.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot decode {raw:?} as {root}: {reason}")]
pub struct DecodeError {
    pub raw: Value,
    pub root: RootType,
    pub reason: String,
}

/// Rust primitives that are stored as-is by a root type.
pub trait Primitive: Clone + Send + Sync + 'static {
    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Result<Self, String>;
}

macro_rules! integer_primitive {
    ($($t:ty),*) => {
        $(
            impl Primitive for $t {
                fn into_value(self) -> Value {
                    Value::Integer(self as i64)
                }

                fn from_value(value: &Value) -> Result<Self, String> {
                    let i = value
                        .as_i64()
                        .ok_or_else(|| format!("expected integer, got {}", value.type_name()))?;
                    <$t>::try_from(i).map_err(|_| format!("{} is out of range for {}", i, stringify!($t)))
                }
            }
        )*
    };
}

integer_primitive!(i8, i16, i32, i64);

impl Primitive for f32 {
    fn into_value(self) -> Value {
        Value::Real(self as f64)
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| format!("expected real, got {}", value.type_name()))
    }
}

impl Primitive for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_f64()
            .ok_or_else(|| format!("expected real, got {}", value.type_name()))
    }
}

impl Primitive for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_string()
            .ok_or_else(|| format!("expected text, got {}", value.type_name()))
    }
}

/// One link of a type chain.
trait TypeLink<T>: Send + Sync {
    fn root(&self) -> RootType;

    fn encode(&self, value: &T) -> Value;

    fn decode(&self, raw: &Value) -> Result<T, String>;
}

struct Identity<P> {
    root: RootType,
    _marker: PhantomData<fn() -> P>,
}

impl<P: Primitive> TypeLink<P> for Identity<P> {
    fn root(&self) -> RootType {
        self.root
    }

    fn encode(&self, value: &P) -> Value {
        value.clone().into_value()
    }

    fn decode(&self, raw: &Value) -> Result<P, String> {
        P::from_value(raw)
    }
}

type Forward<A, B> = Arc<dyn Fn(A) -> Option<B> + Send + Sync>;
type Backward<A, B> = Arc<dyn Fn(&B) -> A + Send + Sync>;

struct Mapped<A, B> {
    source: FieldType<A>,
    forward: Forward<A, B>,
    backward: Backward<A, B>,
}

impl<A: 'static, B: 'static> TypeLink<B> for Mapped<A, B> {
    fn root(&self) -> RootType {
        self.source.root()
    }

    fn encode(&self, value: &B) -> Value {
        self.source.link.encode(&(self.backward)(value))
    }

    fn decode(&self, raw: &Value) -> Result<B, String> {
        let source = self.source.link.decode(raw)?;
        (self.forward)(source).ok_or_else(|| "no mapped value".to_string())
    }
}

struct Nullable<T> {
    inner: FieldType<T>,
}

impl<T: 'static> TypeLink<Option<T>> for Nullable<T> {
    fn root(&self) -> RootType {
        self.inner.root()
    }

    fn encode(&self, value: &Option<T>) -> Value {
        match value {
            Some(v) => self.inner.link.encode(v),
            None => Value::Null,
        }
    }

    fn decode(&self, raw: &Value) -> Result<Option<T>, String> {
        if raw.is_null() {
            return Ok(None);
        }
        self.inner.link.decode(raw).map(Some)
    }
}

/// A logical field type, cheap to clone and safe to share across threads.
pub struct FieldType<T> {
    link: Arc<dyn TypeLink<T>>,
}

impl<T> Clone for FieldType<T> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
        }
    }
}

impl<T> fmt::Debug for FieldType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldType").field("root", &self.link.root()).finish()
    }
}

impl<T: 'static> FieldType<T> {
    /// The physical type at the bottom of the chain.
    pub fn root(&self) -> RootType {
        self.link.root()
    }

    /// Encode a logical value down to its root value.
    pub fn encode(&self, value: &T) -> Value {
        self.link.encode(value)
    }

    /// Decode a root value up through every link of the chain.
    pub fn decode(&self, raw: &Value) -> Result<T, DecodeError> {
        self.link.decode(raw).map_err(|reason| DecodeError {
            raw: raw.clone(),
            root: self.root(),
            reason,
        })
    }

    /// Render a logical value as an inline SQL literal.
    pub fn literal(&self, value: &T) -> String {
        self.root().literal(&self.encode(value))
    }

    /// Derive a new type through a pair of mutually inverse functions.
    pub fn map<B: 'static>(
        self,
        forward: impl Fn(T) -> B + Send + Sync + 'static,
        backward: impl Fn(&B) -> T + Send + Sync + 'static,
    ) -> FieldType<B> {
        self.try_map(move |v| Some(forward(v)), backward)
    }

    /// Like [`map`](Self::map), but the forward function may reject a source
    /// value. A rejected value surfaces as a [`DecodeError`].
    pub fn try_map<B: 'static>(
        self,
        forward: impl Fn(T) -> Option<B> + Send + Sync + 'static,
        backward: impl Fn(&B) -> T + Send + Sync + 'static,
    ) -> FieldType<B> {
        FieldType {
            link: Arc::new(Mapped {
                source: self,
                forward: Arc::new(forward),
                backward: Arc::new(backward),
            }),
        }
    }

    /// Allow NULL: `None` is stored as NULL and NULL reads back as `None`.
    pub fn optional(self) -> FieldType<Option<T>> {
        FieldType {
            link: Arc::new(Nullable { inner: self }),
        }
    }
}

fn identity<P: Primitive>(root: RootType) -> FieldType<P> {
    FieldType {
        link: Arc::new(Identity {
            root,
            _marker: PhantomData,
        }),
    }
}

pub fn tiny_int() -> FieldType<i8> {
    identity(RootType::TinyInt)
}

pub fn small_int() -> FieldType<i16> {
    identity(RootType::SmallInt)
}

pub fn int() -> FieldType<i32> {
    identity(RootType::Int)
}

pub fn big_int() -> FieldType<i64> {
    identity(RootType::BigInt)
}

pub fn real() -> FieldType<f32> {
    identity(RootType::Real)
}

pub fn double() -> FieldType<f64> {
    identity(RootType::Double)
}

/// Unbounded text.
pub fn text() -> FieldType<String> {
    identity(RootType::Text)
}

/// Text with at most `max_length` characters.
pub fn fixed_string(max_length: u32) -> FieldType<String> {
    identity(RootType::FixedString(max_length))
}

/// `bool` stored as `TINYINT` 0/1. Any non-zero value reads back as `true`.
pub fn boolean() -> FieldType<bool> {
    tiny_int().map(|v| v != 0, |b| i8::from(*b))
}

/// UUID stored in its 36-character hyphenated form.
pub fn uuid() -> FieldType<::uuid::Uuid> {
    fixed_string(36).try_map(|s| ::uuid::Uuid::parse_str(&s).ok(), |u| u.to_string())
}

/// Enum-like type stored as a fixed-length string id.
///
/// The root length is the longest derived id. Decoding an id that no value
/// derives to fails with a [`DecodeError`] rather than falling back to a default.
pub fn enumeration<T>(
    values: impl IntoIterator<Item = T>,
    derive_id: impl Fn(&T) -> String + Send + Sync + 'static,
) -> FieldType<T>
where
    T: Clone + Send + Sync + 'static,
{
    let forward_map: HashMap<String, T> = values.into_iter().map(|v| (derive_id(&v), v)).collect();
    let max_length = forward_map.keys().map(|id| id.chars().count()).max().unwrap_or(1).max(1);

    fixed_string(max_length as u32).try_map(move |id| forward_map.get(&id).cloned(), derive_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Status {
        Active,
        Suspended,
    }

    impl Status {
        fn id(&self) -> String {
            match self {
                Status::Active => "active".to_string(),
                Status::Suspended => "suspended".to_string(),
            }
        }
    }

    fn status_type() -> FieldType<Status> {
        enumeration([Status::Active, Status::Suspended], Status::id)
    }

    #[rstest]
    #[case(RootType::TinyInt, "TINYINT")]
    #[case(RootType::SmallInt, "SMALLINT")]
    #[case(RootType::Int, "INTEGER")]
    #[case(RootType::BigInt, "BIGINT")]
    #[case(RootType::Real, "REAL")]
    #[case(RootType::Double, "FLOAT")]
    #[case(RootType::Text, "NVARCHAR")]
    #[case(RootType::FixedString(20), "NVARCHAR(20)")]
    fn test_sql_types(#[case] root: RootType, #[case] expected: &str) {
        assert_eq!(root.sql_type(), expected);
    }

    #[rstest]
    fn test_root_walks_the_chain() {
        let doubled = int().map(|v| v as i64 * 2, |v| (*v / 2) as i32);
        let labelled = doubled.map(|v| format!("#{}", v), |s| s[1..].parse().unwrap_or(0));
        assert_eq!(labelled.root(), RootType::Int);
    }

    #[rstest]
    fn test_mapped_encode_decode_composes_in_order() {
        let ty = int().map(|v| v + 1, |v| v - 1).map(|v| v * 10, |v| v / 10);
        // Backward runs outermost link first: 50 -> 5 -> 4.
        assert_eq!(ty.encode(&50), Value::Integer(4));
        assert_eq!(ty.decode(&Value::Integer(4)).unwrap(), 50);
    }

    #[rstest]
    fn test_enumeration_root_length_is_longest_id() {
        assert_eq!(status_type().root(), RootType::FixedString(9));
    }

    #[rstest]
    fn test_enumeration_round_trip() {
        let ty = status_type();
        for status in [Status::Active, Status::Suspended] {
            assert_eq!(ty.decode(&ty.encode(&status)).unwrap(), status);
        }
    }

    #[rstest]
    fn test_enumeration_unknown_id_is_decode_error() {
        let err = status_type().decode(&Value::from("deleted")).unwrap_err();
        assert_eq!(err.raw, Value::from("deleted"));
        assert_eq!(err.reason, "no mapped value");
    }

    #[rstest]
    fn test_uuid_round_trip() {
        let ty = uuid();
        let id = ::uuid::Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
        let raw = ty.encode(&id);
        assert_eq!(raw, Value::from("12345678-9abc-def0-1234-56789abcdef0"));
        assert_eq!(ty.decode(&raw).unwrap(), id);
        assert_eq!(ty.root(), RootType::FixedString(36));
    }

    #[rstest]
    fn test_uuid_rejects_garbage() {
        assert!(uuid().decode(&Value::from("not-a-uuid")).is_err());
    }

    #[rstest]
    fn test_boolean_round_trip() {
        let ty = boolean();
        assert_eq!(ty.encode(&true), Value::Integer(1));
        assert!(!ty.decode(&Value::Integer(0)).unwrap());
        assert!(ty.decode(&Value::Integer(7)).unwrap());
    }

    #[rstest]
    fn test_optional_maps_null() {
        let ty = int().optional();
        assert_eq!(ty.encode(&None), Value::Null);
        assert_eq!(ty.encode(&Some(3)), Value::Integer(3));
        assert_eq!(ty.decode(&Value::Null).unwrap(), None);
        assert_eq!(ty.decode(&Value::Integer(3)).unwrap(), Some(3));
    }

    #[rstest]
    fn test_null_into_required_type_fails() {
        let err = int().decode(&Value::Null).unwrap_err();
        assert!(err.reason.contains("expected integer"));
    }

    #[rstest]
    fn test_integer_out_of_range() {
        let err = tiny_int().decode(&Value::Integer(300)).unwrap_err();
        assert!(err.reason.contains("out of range"));
    }

    #[rstest]
    #[case(RootType::Int, Value::Integer(5), "5")]
    #[case(RootType::Double, Value::Real(1.5), "1.5")]
    #[case(RootType::Double, Value::Real(2.0), "2.0")]
    #[case(RootType::Double, Value::Real(f64::NAN), "NULL")]
    #[case(RootType::Text, Value::Text("O'Brien".into()), "'O''Brien'")]
    #[case(RootType::FixedString(4), Value::Null, "NULL")]
    fn test_literals(#[case] root: RootType, #[case] value: Value, #[case] expected: &str) {
        assert_eq!(root.literal(&value), expected);
    }

    #[rstest]
    fn test_mapped_literal_uses_root_rendering() {
        assert_eq!(status_type().literal(&Status::Active), "'active'");
    }

    #[rstest]
    fn test_coerce_by_root() {
        assert_eq!(RootType::Int.coerce(&Value::Real(3.0)), Value::Integer(3));
        assert_eq!(RootType::Double.coerce(&Value::Integer(2)), Value::Real(2.0));
        assert_eq!(RootType::Text.coerce(&Value::Null), Value::Null);
    }

    #[rstest]
    #[case(RootType::Int, Value::Real(3.9))]
    #[case(RootType::BigInt, Value::from("corrupt"))]
    #[case(RootType::Double, Value::from("1.5x"))]
    #[case(RootType::Text, Value::Integer(7))]
    fn test_coerce_passes_non_fitting_values_through(#[case] root: RootType, #[case] raw: Value) {
        assert_eq!(root.coerce(&raw), raw);
    }

    #[rstest]
    fn test_non_fitting_values_fail_to_decode() {
        let err = int().decode(&RootType::Int.coerce(&Value::Real(3.9))).unwrap_err();
        assert_eq!(err.raw, Value::Real(3.9));
        assert!(err.reason.contains("expected integer, got real"));

        let optional = int().optional();
        let err = optional
            .decode(&RootType::Int.coerce(&Value::from("corrupt")))
            .unwrap_err();
        assert!(err.reason.contains("expected integer, got text"));
    }
}
