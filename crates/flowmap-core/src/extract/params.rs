//! Discriminator resolution over loosely-typed node parameters.

use serde_json::{Map, Value};

use crate::model::workflow::scalar_to_string;

/// Resolve the first non-empty parameter among `keys`, in priority order.
///
/// Resource-locator values (`{"__rl": true, "value": "..", "cachedResultName": ".."}`)
/// resolve to `cachedResultName`, then `value`. Other structured values are
/// stringified as compact JSON.
#[must_use]
pub fn resolve(parameters: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| parameters.get(*key))
        .find_map(normalize)
}

/// Plain-string form of one parameter value, or `None` when it is empty.
#[must_use]
pub fn normalize(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(map) if map.contains_key("cachedResultName") || map.contains_key("value") => {
            map.get("cachedResultName")
                .and_then(scalar_to_string)
                .or_else(|| map.get("value").and_then(scalar_to_string))
        }
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(_) | Value::Array(_) => Some(value.to_string()),
        scalar => scalar_to_string(scalar),
    }
}
