//! Conversion between plain JSON and Firestore's typed value encoding.

use serde_json::{json, Map, Number, Value};

use crate::provider::{codes, Document, ProviderError};

/// Encode a field map as a Firestore `fields` object.
pub fn encode_fields(fields: &Document) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), encode(value)))
            .collect(),
    )
}

/// Decode a Firestore `fields` object back into a plain field map.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Document, ProviderError> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode(value)?)))
        .collect()
}

pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore carries 64-bit integers as decimal strings.
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn decode(value: &Value) -> Result<Value, ProviderError> {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Err(malformed(value));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner.as_bool().map(Value::Bool).ok_or_else(|| malformed(value)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed.map(Value::from).ok_or_else(|| malformed(value))
        }
        "doubleValue" => {
            let parsed = match inner {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            // NaN and infinities have no JSON form.
            Ok(parsed
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed(value)),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => match inner.get("values") {
            Some(Value::Array(items)) => items.iter().map(decode).collect::<Result<Vec<_>, _>>().map(Value::Array),
            // Firestore omits `values` for an empty array.
            None => Ok(Value::Array(vec![])),
            Some(_) => Err(malformed(value)),
        },
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
            Some(_) => Err(malformed(value)),
        },
        _ => Err(malformed(value)),
    }
}

fn malformed(value: &Value) -> ProviderError {
    ProviderError::new(
        codes::INVALID_RESPONSE,
        format!("Unsupported Firestore value: {}", value),
    )
}
