//! Unwrapping of the backend's response envelopes.
//!
//! Endpoints answer in several shapes: `{ "data": X }`, `{ "success": true, "cart": X }`,
//! `{ "products": [..], "total": 12 }` or just `X`. Everything funnels through
//! [`unwrap_payload`] before typed decoding.

use serde_json::{Map, Value};

const DATA_KEY: &str = "data";
const TOTAL_KEYS: [&str; 3] = ["total", "totalCount", "count"];

/// Peels `data` and resource-named wrappers off `value`.
///
/// `keys` are the resource names the caller expects, e.g. `["cart"]` or
/// `["products", "items"]`. At most three levels are peeled, which covers
/// `{ "data": { "wishlist": { "products": .. } } }`.
pub fn unwrap_payload(mut value: Value, keys: &[&str]) -> Value {
    for _ in 0..3 {
        match take_wrapped(value, keys) {
            Ok(inner) => value = inner,
            Err(unchanged) => return unchanged,
        }
    }
    value
}

fn take_wrapped(value: Value, keys: &[&str]) -> Result<Value, Value> {
    let Value::Object(mut map) = value else { return Err(value) };
    for key in std::iter::once(&DATA_KEY).chain(keys) {
        if let Some(inner) = map.remove(*key).filter(|v| !v.is_null()) {
            return Ok(inner);
        }
    }
    Err(Value::Object(map))
}

/// Reads a listing total from the outer envelope, if the backend sent one.
pub fn total_hint(value: &Value) -> Option<u64> {
    let map = value.as_object()?;
    find_total(map).or_else(|| map.get(DATA_KEY).and_then(Value::as_object).and_then(find_total))
}

fn find_total(map: &Map<String, Value>) -> Option<u64> {
    TOTAL_KEYS.iter().find_map(|k| map.get(*k).and_then(Value::as_u64))
}

/// Pulls a human readable error message out of an error body.
pub fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => ["message", "error", "msg"]
            .iter()
            .find_map(|k| match map.get(*k) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(nested @ Value::Object(_)) => error_message(nested),
                _ => None,
            }),
        _ => None,
    }
}
