//! Cache key derivation
//!
//! Keys are derived from a canonical JSON encoding so that two semantically
//! equal requests always land on the same entry.

use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Encode a JSON value with object keys sorted at every level
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
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
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Hash the canonical encoding of a value
pub fn hash_canonical(value: &Value) -> String {
    let mut hasher = DefaultHasher::new();
    canonical_json(value).hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Generate cache key for query results
pub fn build_query_key(table_name: &str, query_hash: &str) -> String {
    format!("{}:query:{}", table_name, query_hash)
}
