//! Row normalization shared by both storage backends.
//!
//! The embedded store keeps `extracted_data` as serialized text while the
//! primary store returns a native JSON value. Callers always receive an
//! object: absent, null, non-object, or unparsable values become `{}`.

use serde_json::{Map, Value};

/// Normalize a native JSON column value into an object.
pub fn extracted_data_from_value(value: Option<Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        // Some drivers hand back JSON stored as a string scalar.
        Some(Value::String(text)) => extracted_data_from_text(Some(&text)),
        _ => Map::new(),
    }
}

/// Normalize a serialized JSON column value into an object.
///
/// Parse failures are swallowed and logged; the caller sees an empty object.
pub fn extracted_data_from_text(text: Option<&str>) -> Map<String, Value> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Map::new();
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unparsable extracted_data");
            Map::new()
        }
    }
}

/// Serialize extracted data for storage, defaulting to `{}`.
pub fn encode_extracted_data(data: Option<&Map<String, Value>>) -> String {
    match data {
        Some(map) => Value::Object(map.clone()).to_string(),
        None => "{}".to_string(),
    }
}
