//! Runtime values
//!
//! Values can be numbers, text, sequences (from range references), the empty
//! cell sentinel, or errors. Errors propagate through computations.

use crate::{DisorgError, Number};
use serde::{Deserialize, Serialize};

/// Runtime value produced by the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Number(Number),
    Text(String),
    /// Ordered values from a cell reference, row-major
    List(Vec<Value>),
    /// A blank cell; the additive identity
    Empty,
    Error(DisorgError),
}

impl Value {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&DisorgError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(Number::Integer(_)) => "Integer",
            Value::Number(Number::Decimal(_)) => "Decimal",
            Value::Text(_) => "Text",
            Value::List(_) => "List",
            Value::Empty => "Empty",
            Value::Error(_) => "Error",
        }
    }

    // ========== Conversion ==========

    /// Value of a non-formula cell: blank is `Empty`, number literals become
    /// numbers, anything else is the trimmed text.
    pub fn from_literal(text: &str) -> Value {
        let text = text.trim();
        if text.is_empty() {
            return Value::Empty;
        }
        let unsigned = text.strip_prefix('-').unwrap_or(text);
        let numeric = match unsigned.split_once('.') {
            Some((int, frac)) => is_digits(int) && frac.chars().all(|c| c.is_ascii_digit()),
            None => is_digits(unsigned),
        };
        if numeric {
            if let Ok(n) = text.parse() {
                return Value::Number(n);
            }
        }
        Value::Text(text.to_string())
    }

    /// Collapse a one-element sequence to its element.
    ///
    /// Scalars pass through unchanged. A sequence of any other length where a
    /// scalar is required is a contract violation, reported as `INTERNAL`.
    pub fn unwrap_scalar(self) -> Result<Value, DisorgError> {
        match self {
            Value::List(mut items) if items.len() == 1 => Ok(items.remove(0)),
            Value::List(items) => Err(DisorgError::internal(format!(
                "expected a single value, got a sequence of {}",
                items.len()
            ))),
            other => Ok(other),
        }
    }

    /// First error anywhere inside this value, depth-first
    pub fn first_error(&self) -> Option<&DisorgError> {
        match self {
            Value::Error(e) => Some(e),
            Value::List(items) => items.iter().find_map(Value::first_error),
            _ => None,
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                let contents: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", contents.join(", "))
            }
            Value::Empty => Ok(()),
            Value::Error(e) => write!(f, "{}", e.token()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Empty
    }
}

// From implementations for convenience
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from_i64(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<DisorgError> for Value {
    fn from(e: DisorgError) -> Self {
        Value::Error(e)
    }
}
