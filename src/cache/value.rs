//! Cache Value Module
//!
//! The closed set of scalar types the cache accepts, and their byte encoding.

use std::fmt;

use crate::tracking::{repr_bytes, ArgRepr};

// == Value ==
/// A scalar accepted by `Cache::store`.
///
/// Every variant is written to the store as bytes: strings as UTF-8, integers
/// and floats as their decimal text, byte blobs unchanged. The reader picks
/// the decoder, so no type tag is stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

impl Value {
    // == Encoding ==
    /// Returns the bytes written to the store for this value.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Str(s) => s.as_bytes().to_vec(),
            Value::Bytes(b) => b.clone(),
            Value::Int(i) => i.to_string().into_bytes(),
            Value::Float(f) => format_float(*f).into_bytes(),
        }
    }

    /// Consumes the value, avoiding a copy for strings and blobs.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Value::Str(s) => s.into_bytes(),
            Value::Bytes(b) => b,
            other => other.to_bytes(),
        }
    }
}

/// Float text that always parses back to the same `f64` (`1.0`, not `1`).
fn format_float(f: f64) -> String {
    format!("{:?}", f)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&repr_bytes(b)),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

impl ArgRepr for Value {
    fn repr(&self) -> String {
        match self {
            Value::Str(s) => s.repr(),
            Value::Bytes(b) => repr_bytes(b),
            Value::Int(i) => i.repr(),
            Value::Float(x) => x.repr(),
        }
    }
}

// == Conversions ==
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
