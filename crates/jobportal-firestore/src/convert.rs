//! Conversion between JSON documents and Firestore field maps.
//!
//! Models serialize to `serde_json` objects; these helpers move them across
//! the Firestore wire format. Document IDs travel as `_id` on the JSON side.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value as Json};

use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{ArrayValue, Document, MapValue, Value};

/// Key carrying the document ID in JSON.
pub const ID_FIELD: &str = "_id";

/// Convert a JSON value to a Firestore value.
pub fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::NullValue(()),
        Json::Bool(b) => Value::BooleanValue(*b),
        Json::Number(n) => number_to_value(n),
        Json::String(s) => Value::StringValue(s.clone()),
        Json::Array(items) => Value::ArrayValue(ArrayValue {
            values: Some(items.iter().map(json_to_value).collect()),
        }),
        Json::Object(map) => Value::MapValue(MapValue {
            fields: Some(object_to_fields(map)),
        }),
    }
}

fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::IntegerValue(i.to_string())
    } else if let Some(u) = n.as_u64().and_then(|u| i64::try_from(u).ok()) {
        Value::IntegerValue(u.to_string())
    } else {
        Value::DoubleValue(n.as_f64().unwrap_or_default())
    }
}

/// Convert a Firestore value to JSON.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::NullValue(()) => Json::Null,
        Value::BooleanValue(b) => Json::Bool(*b),
        Value::IntegerValue(s) => s
            .parse::<i64>()
            .map(Json::from)
            .unwrap_or_else(|_| Json::String(s.clone())),
        Value::DoubleValue(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::TimestampValue(s)
        | Value::StringValue(s)
        | Value::BytesValue(s)
        | Value::ReferenceValue(s) => Json::String(s.clone()),
        Value::GeoPointValue(p) => serde_json::json!({
            "latitude": p.latitude,
            "longitude": p.longitude,
        }),
        Value::ArrayValue(a) => Json::Array(
            a.values
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(value_to_json)
                .collect(),
        ),
        Value::MapValue(m) => Json::Object(fields_to_object(m.fields.as_ref())),
    }
}

/// Firestore fields for a JSON object. `_id` is never stored as a field.
pub fn object_to_fields(map: &Map<String, Json>) -> HashMap<String, Value> {
    map.iter()
        .filter(|(k, _)| k.as_str() != ID_FIELD)
        .map(|(k, v)| (k.clone(), json_to_value(v)))
        .collect()
}

fn fields_to_object(fields: Option<&HashMap<String, Value>>) -> Map<String, Json> {
    fields
        .into_iter()
        .flatten()
        .map(|(k, v)| (k.clone(), value_to_json(v)))
        .collect()
}

/// JSON object for a stored document, with `_id` taken from its name.
pub fn document_to_json(doc: &Document) -> Map<String, Json> {
    let mut object = fields_to_object(doc.fields.as_ref());
    if let Some(id) = doc.id() {
        object.insert(ID_FIELD.to_string(), Json::String(id.to_string()));
    }
    object
}

/// Serialize a model into Firestore fields.
pub fn to_fields<T: Serialize>(model: &T) -> FirestoreResult<HashMap<String, Value>> {
    match serde_json::to_value(model)? {
        Json::Object(map) => Ok(object_to_fields(&map)),
        other => Err(FirestoreError::SerializationError(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Decode a stored document into a model.
pub fn from_document<T: DeserializeOwned>(doc: &Document) -> FirestoreResult<T> {
    Ok(serde_json::from_value(Json::Object(document_to_json(doc)))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_map_to_integer_or_double() {
        assert_eq!(json_to_value(&json!(150)), Value::IntegerValue("150".into()));
        assert_eq!(json_to_value(&json!(-3)), Value::IntegerValue("-3".into()));
        assert_eq!(json_to_value(&json!(2.5)), Value::DoubleValue(2.5));
        assert_eq!(
            json_to_value(&json!(u64::MAX)),
            Value::DoubleValue(u64::MAX as f64)
        );
    }

    #[test]
    fn test_nested_object_round_trips_through_fields() {
        let job = json!({
            "_id": "ignored",
            "title": "Engineer",
            "salaryRange": {"min": 100, "max": 200, "currency": "usd"},
            "tags": ["rust", true, null]
        });
        let fields = object_to_fields(job.as_object().unwrap());
        assert!(!fields.contains_key("_id"));

        let doc = Document {
            name: Some("projects/p/databases/(default)/documents/jobs/j1".into()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };
        let back = Json::Object(document_to_json(&doc));
        assert_eq!(back["_id"], "j1");
        assert_eq!(back["salaryRange"]["max"], 200);
        assert_eq!(back["tags"], json!(["rust", true, null]));
    }

    #[test]
    fn test_timestamp_becomes_string() {
        let v = value_to_json(&Value::TimestampValue("2024-05-01T00:00:00Z".into()));
        assert_eq!(v, json!("2024-05-01T00:00:00Z"));
    }

    #[test]
    fn test_to_fields_rejects_non_objects() {
        assert!(matches!(
            to_fields(&"plain"),
            Err(FirestoreError::SerializationError(_))
        ));
    }
}
