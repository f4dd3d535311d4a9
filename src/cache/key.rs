//! Cache Key Module
//!
//! Derives a stable, content-addressed identity from a generation request.

use std::fmt;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{GenerateError, Result};
use crate::models::GenerationOptions;

// == Cache Key ==
/// Canonical identity of a generation request.
///
/// Two requests with identical semantic content produce the same key, no
/// matter in which order their fields were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the hex digest backing this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// == Canonicalization ==
/// Derives the cache key for a payload and its resolved options.
///
/// The options are serialized to JSON, the non-semantic `cacheEnabled`
/// flag is stripped, the payload is injected, and the resulting document
/// is rendered with recursively sorted object keys before hashing. Object
/// key sorting is explicit rather than an accident of map ordering.
pub fn canonicalize(payload: &str, options: &GenerationOptions) -> Result<CacheKey> {
    let mut doc = serde_json::to_value(options)
        .map_err(|e| GenerateError::Cache(format!("Options not serializable: {}", e)))?;

    if let Value::Object(map) = &mut doc {
        map.remove("cacheEnabled");
        map.insert("payload".to_string(), Value::String(payload.to_string()));
    }

    let mut canonical = String::new();
    write_canonical(&doc, &mut canonical);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(CacheKey(hex::encode(hasher.finalize())))
}

/// Writes `value` as canonical JSON: object keys sorted recursively,
/// no insignificant whitespace.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
