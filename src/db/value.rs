//! Root-level values exchanged with the backend.
//!
//! Every logical field type bottoms out in one of a handful of physical
//! primitives. `Value` is the dynamic carrier for those primitives: it is what
//! the type chain encodes to, what bindings carry to the backend, and what a
//! cursor hands back when a column is read.
//!
//! The `DatabaseValue` trait abstracts extraction so that our own `Value` and
//! the SQLite backend's `rusqlite::types::Value` can be coerced uniformly into
//! a root primitive.

use std::fmt::Debug;

use serde::Serialize;

/// A physical value as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Trait for database values that can be extracted to root primitives.
///
/// Implemented for our own [`Value`] and for `rusqlite::types::Value`, so a
/// cursor can coerce whatever the backend returns into the physical type a
/// column was declared with.
pub trait DatabaseValue: Clone + Debug {
    /// Extract as String if the value is string-like.
    ///
    /// Returns `None` if the value is null or not string-like.
    fn as_string(&self) -> Option<String>;

    /// Extract as i64 if the value is an integer.
    ///
    /// A float only qualifies when it is integral and within `i64` range.
    fn as_i64(&self) -> Option<i64>;

    /// Extract as f64 if the value is numeric.
    fn as_f64(&self) -> Option<f64>;

    /// Whether this value is SQL NULL.
    fn is_null_value(&self) -> bool;

    /// Get type name for error messages.
    fn type_name(&self) -> &'static str;

    /// The value unchanged, as one of our own [`Value`]s.
    fn to_value(&self) -> Value;
}

/// `f` as an i64, provided no information is lost.
pub(crate) fn integral_f64(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl DatabaseValue for Value {
    fn as_string(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => integral_f64(*f),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    fn is_null_value(&self) -> bool {
        self.is_null()
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_as_string() {
        assert_eq!(Value::from("hello").as_string(), Some("hello".to_string()));
        assert_eq!(Value::Null.as_string(), None);
        assert_eq!(Value::Integer(42).as_string(), None);
    }

    #[test]
    fn test_value_as_i64_accepts_only_integral_reals() {
        assert_eq!(Value::Real(42.0).as_i64(), Some(42));
        assert_eq!(Value::Real(42.7).as_i64(), None);
        assert_eq!(Value::Real(f64::NAN).as_i64(), None);
        assert_eq!(Value::Real(1e19).as_i64(), None);
        assert_eq!(Value::Integer(-3).as_i64(), Some(-3));
        assert_eq!(Value::from("42").as_i64(), None);
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(Value::Integer(42).as_f64(), Some(42.0));
        assert_eq!(Value::Real(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Integer(0).type_name(), "integer");
        assert_eq!(Value::Real(0.0).type_name(), "real");
        assert_eq!(Value::from("").type_name(), "text");
    }

    #[test]
    fn test_null_detection() {
        assert!(Value::Null.is_null_value());
        assert!(!Value::Integer(0).is_null_value());
    }
}
