//! Sensitive-data masking (§2.9, §6.2, P3).
//!
//! A serialiser-level concern, grounded on the teacher's `trace!("Request
//! body: {:?}", serde_json::to_value(body).ok())` call sites in
//! `client.rs`: every place that would have logged a raw body now routes it
//! through [`mask_sensitive`] first.

use serde_json::Value;

const MASK: &str = "******";

/// Keys masked regardless of nesting depth or case.
const SENSITIVE_KEYS: &[&str] = &["db_password", "password"];

/// `parameters`-map keys masked by pattern, case-insensitively (§6.2).
const SENSITIVE_PARAMETER_PATTERNS: &[&str] = &[
    "awsauth",
    "awssessiontoken",
    "gcsauth",
    "azurestoragecredentials",
];

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEYS.contains(&lower.as_str())
        || SENSITIVE_PARAMETER_PATTERNS.iter().any(|p| lower == *p)
}

/// Recursively mask sensitive fields in a JSON value before it reaches any
/// `tracing` field or log sink. Never mutates in place — returns a masked
/// copy so callers can still use the original value for the actual request.
pub fn mask_sensitive(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let masked = map
                .iter()
                .map(|(k, v)| {
                    if is_sensitive_key(k) {
                        (k.clone(), Value::String(MASK.to_string()))
                    } else {
                        (k.clone(), mask_sensitive(v))
                    }
                })
                .collect();
            Value::Object(masked)
        }
        Value::Array(items) => Value::Array(items.iter().map(mask_sensitive).collect()),
        other => other.clone(),
    }
}

/// Mask a password for inclusion in a log line, preserving the nil/empty
/// distinction: `None` logs as `None`, `Some("")` logs as `Some("" masked)`,
/// anything else logs as the mask.
pub fn mask_password(password: &Option<String>) -> String {
    match password {
        None => "None".to_string(),
        Some(p) if p.is_empty() => "Some(<empty>)".to_string(),
        Some(_) => format!("Some({MASK})"),
    }
}
