//! # Dynamically typed values and parameter kinds.
//!
//! [`Value`] is the payload that flows through the engine: positional
//! arguments bound at load time, outputs captured from each call, and pattern
//! arguments. [`ParamKind`] is the closed set of kinds a callable may declare
//! for its parameters.
//!
//! ## Default table
//! When a call is loaded with fewer arguments than it declares, missing
//! parameters are filled from this table:
//! ```text
//! Int      → Value::Int(0)
//! Float    → Value::Float(0.0)
//! Str      → Value::Str("")
//! Bool     → Value::Bool(false)
//! Duration → (none)  → load fault
//! Any      → (none)  → load fault
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Kind tag of a callable parameter (or declared return value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Text.
    Str,
    /// Boolean.
    Bool,
    /// Time span.
    Duration,
    /// Anything else (opaque payload).
    Any,
}

impl ParamKind {
    /// Returns the zero value substituted for a missing parameter of this kind.
    ///
    /// `None` means the kind has no default and loading must fail.
    pub fn default_value(self) -> Option<Value> {
        match self {
            ParamKind::Int => Some(Value::Int(0)),
            ParamKind::Float => Some(Value::Float(0.0)),
            ParamKind::Str => Some(Value::Str(String::new())),
            ParamKind::Bool => Some(Value::Bool(false)),
            ParamKind::Duration | ParamKind::Any => None,
        }
    }

    /// Short lowercase name used in signatures.
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Str => "str",
            ParamKind::Bool => "bool",
            ParamKind::Duration => "duration",
            ParamKind::Any => "any",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically typed argument, output or pattern parameter.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Duration(Duration),
    /// Arbitrary shared payload; compare with [`Value::downcast_ref`].
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wraps an arbitrary value as [`Value::Opaque`].
    pub fn opaque<T: Any + Send + Sync>(v: T) -> Self {
        Value::Opaque(Arc::new(v))
    }

    /// Returns the kind tag of this value.
    pub fn kind(&self) -> ParamKind {
        match self {
            Value::Int(_) => ParamKind::Int,
            Value::Float(_) => ParamKind::Float,
            Value::Str(_) => ParamKind::Str,
            Value::Bool(_) => ParamKind::Bool,
            Value::Duration(_) => ParamKind::Duration,
            Value::Opaque(_) => ParamKind::Any,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrows the payload of an opaque value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl PartialEq for Value {
    /// Opaque values are equal only when they share the same allocation.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
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

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_primitives_only() {
        assert_eq!(ParamKind::Int.default_value(), Some(Value::Int(0)));
        assert_eq!(ParamKind::Float.default_value(), Some(Value::Float(0.0)));
        assert_eq!(ParamKind::Str.default_value(), Some(Value::Str(String::new())));
        assert_eq!(ParamKind::Bool.default_value(), Some(Value::Bool(false)));
        assert!(ParamKind::Duration.default_value().is_none());
        assert!(ParamKind::Any.default_value().is_none());
    }

    #[test]
    fn test_conversions_pick_matching_kind() {
        assert_eq!(Value::from(7).kind(), ParamKind::Int);
        assert_eq!(Value::from("x").kind(), ParamKind::Str);
        assert_eq!(Value::from(Duration::from_millis(5)).as_duration(), Some(Duration::from_millis(5)));
        assert_eq!(Value::from(1.5).as_int(), None);
    }

    #[test]
    fn test_opaque_equality_is_identity() {
        let a = Value::opaque(vec![1u8, 2, 3]);
        let b = a.clone();
        let c = Value::opaque(vec![1u8, 2, 3]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<Vec<u8>>(), Some(&vec![1u8, 2, 3]));
        assert_eq!(a.kind(), ParamKind::Any);
    }
}
