//! `Value`, the typed scalar stored in agent state bags, environment fields,
//! and model parameter sets.

use std::fmt;

use crate::{CoreError, CoreResult};

/// A dynamically typed scalar.
///
/// There are no nested or collection variants; agent state is a flat
/// attribute bag.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// Short lowercase name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_)   => "integer",
            Value::Float(_) => "float",
            Value::Bool(_)  => "boolean",
            Value::Text(_)  => "text",
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Numeric value as `f64`.  Integers are widened; everything else fails.
    pub fn as_f64(&self) -> CoreResult<f64> {
        match self {
            Value::Int(i)   => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => Err(CoreError::TypeMismatch { expected: "numeric", got: other.type_name() }),
        }
    }

    pub fn as_i64(&self) -> CoreResult<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(CoreError::TypeMismatch { expected: "integer", got: other.type_name() }),
        }
    }

    pub fn as_bool(&self) -> CoreResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(CoreError::TypeMismatch { expected: "boolean", got: other.type_name() }),
        }
    }

    pub fn as_str(&self) -> CoreResult<&str> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(CoreError::TypeMismatch { expected: "text", got: other.type_name() }),
        }
    }

    /// Numeric addition.  `Int + Int` stays an integer (wrapping); any float
    /// operand promotes the result to `Float`.
    pub fn checked_add(&self, rhs: &Value) -> CoreResult<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
            (a, b) => Ok(Value::Float(a.as_f64()? + b.as_f64()?)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i)   => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b)  => write!(f, "{b}"),
            Value::Text(s)  => f.write_str(s),
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
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
