//! Typed key/value fields attached to entries.

use std::error::Error as StdError;
use std::fmt::Write;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

/// Value half of a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i32),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    /// Rendered error message.
    Error(String),
    /// Any serializable value, already converted.
    Any(Value),
    /// Seconds, rendered as a plain number.
    Duration(f64),
    /// Rendered as a human-readable string such as `1.5s`.
    Elapsed(Duration),
}

/// A key paired with a typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// JSON form of the value.
    pub fn to_json(&self) -> Value {
        match &self.value {
            FieldValue::String(s) | FieldValue::Error(s) => Value::from(s.as_str()),
            FieldValue::Int(n) => Value::from(*n),
            FieldValue::Int64(n) => Value::from(*n),
            FieldValue::Float64(x) | FieldValue::Duration(x) => float(*x),
            FieldValue::Bool(b) => Value::from(*b),
            FieldValue::Any(v) => v.clone(),
            FieldValue::Elapsed(d) => Value::from(format!("{:?}", d)),
        }
    }
}

/// Non-finite floats have no JSON number form.
fn float(x: f64) -> Value {
    if x.is_nan() {
        Value::from("NaN")
    } else if x == f64::INFINITY {
        Value::from("+Inf")
    } else if x == f64::NEG_INFINITY {
        Value::from("-Inf")
    } else {
        Value::from(x)
    }
}

/// Encodes fields as the body of a JSON object, without braces.
#[cfg(test)]
pub(crate) fn encode(fields: &[Field]) -> String {
    let mut out = String::new();
    append(&mut out, fields);
    out
}

/// Appends encoded fields to an existing object body.
pub(crate) fn append(out: &mut String, fields: &[Field]) {
    for field in fields {
        if !out.is_empty() {
            out.push(',');
        }
        let _ = write!(out, "{}:{}", Value::from(field.key.as_str()), field.to_json());
    }
}

pub fn string(key: impl Into<String>, val: impl Into<String>) -> Field {
    Field::new(key, FieldValue::String(val.into()))
}

pub fn int(key: impl Into<String>, val: i32) -> Field {
    Field::new(key, FieldValue::Int(val))
}

pub fn int64(key: impl Into<String>, val: i64) -> Field {
    Field::new(key, FieldValue::Int64(val))
}

pub fn float64(key: impl Into<String>, val: f64) -> Field {
    Field::new(key, FieldValue::Float64(val))
}

pub fn boolean(key: impl Into<String>, val: bool) -> Field {
    Field::new(key, FieldValue::Bool(val))
}

/// An error under the conventional `error` key.
pub fn error(err: &(dyn StdError + '_)) -> Field {
    named_error("error", err)
}

pub fn named_error(key: impl Into<String>, err: &(dyn StdError + '_)) -> Field {
    Field::new(key, FieldValue::Error(err.to_string()))
}

/// Any serializable value.
///
/// A value that fails to serialize is replaced by a `<key>Error` field holding the
/// serializer's message.
pub fn any<T: Serialize + ?Sized>(key: impl Into<String>, val: &T) -> Field {
    let key = key.into();
    match serde_json::to_value(val) {
        Ok(v) => Field::new(key, FieldValue::Any(v)),
        Err(err) => Field::new(format!("{}Error", key), FieldValue::Error(err.to_string())),
    }
}

/// A duration given in seconds.
pub fn duration(key: impl Into<String>, secs: f64) -> Field {
    Field::new(key, FieldValue::Duration(secs))
}

pub fn elapsed(key: impl Into<String>, val: Duration) -> Field {
    Field::new(key, FieldValue::Elapsed(val))
}
