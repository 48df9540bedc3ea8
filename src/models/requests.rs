//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::cache::Value;

/// Maximum accepted size of a stored string, in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

/// A JSON scalar to store. Integers are tried before floats.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<StoreValue> for Value {
    fn from(value: StoreValue) -> Self {
        match value {
            StoreValue::Int(i) => Value::Int(i),
            StoreValue::Float(f) => Value::Float(f),
            StoreValue::Str(s) => Value::Str(s),
        }
    }
}

/// Request body for the STORE operation (PUT /store)
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    /// The value to store under a generated key
    pub value: StoreValue,
}

impl StoreRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match &self.value {
            StoreValue::Str(s) if s.len() > MAX_VALUE_SIZE => Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )),
            StoreValue::Float(f) if !f.is_finite() => Some("Float value must be finite".to_string()),
            _ => None,
        }
    }
}

/// Decoder applied by GET /get/:key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Str,
    Int,
    Float,
}

/// Query string for GET /get/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetQuery {
    #[serde(default, rename = "as")]
    pub kind: ValueKind,
}

/// Query string for GET /page
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub url: String,
}

impl PageQuery {
    /// Only absolute http(s) URLs are fetched.
    pub fn validate(&self) -> Option<String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Some("URL must start with http:// or https://".to_string());
        }
        None
    }
}
