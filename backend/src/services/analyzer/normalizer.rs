//! Record normalization
//!
//! Raw entries come straight out of a Mongo collection export and are not
//! trusted: elements may be null, non-objects, or carry missing/garbled
//! timestamps. Normalization coerces every accepted entry into a well-formed
//! [`LogRecord`] and counts the rejects instead of failing the batch.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::models::{LogRecord, MongoDate, RecordMetadata};

/// Normalize a decoded JSON payload into log records.
///
/// Returns the accepted records (input order preserved) and the number of
/// rejected elements. A non-array payload yields an empty result; individual
/// malformed elements are skipped and counted, never propagated as errors.
/// Missing or unparseable `Metadata.Created`/`Metadata.Modified` timestamps
/// are substituted with the current instant.
pub fn normalize(raw: &Value) -> (Vec<LogRecord>, usize) {
    let entries = match raw.as_array() {
        Some(entries) => entries,
        None => {
            tracing::error!("log payload is not an array: {}", json_type_name(raw));
            return (Vec::new(), 0);
        },
    };

    let mut records = Vec::with_capacity(entries.len());
    let mut error_count = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        match entry.as_object() {
            Some(obj) => records.push(record_from_object(obj)),
            None => {
                error_count += 1;
                tracing::debug!("skipping non-object entry at index {}", index);
            },
        }
    }

    if error_count > 0 {
        tracing::warn!("failed to parse {} entries out of {}", error_count, entries.len());
    }
    tracing::info!("parsed {} log entries from {} total", records.len(), entries.len());

    (records, error_count)
}

fn record_from_object(obj: &Map<String, Value>) -> LogRecord {
    let metadata = obj.get("Metadata").and_then(Value::as_object);
    let created = mongo_date(metadata, "Created").unwrap_or_else(Utc::now);
    let modified = mongo_date(metadata, "Modified").unwrap_or_else(Utc::now);

    LogRecord {
        id: string_field(obj, "_id").unwrap_or_default(),
        metadata: RecordMetadata {
            created: MongoDate::from(created),
            modified: MongoDate::from(modified),
        },
        status: string_field(obj, "Status"),
        request_body: string_field(obj, "RequestBody"),
        request_body_dictionary: string_map(obj.get("RequestBodyDictionary")),
        response_body: string_field(obj, "ResponseBody"),
        path: string_field(obj, "Path").unwrap_or_default(),
        query: string_field(obj, "Query"),
        user: string_field(obj, "User").unwrap_or_default(),
    }
}

/// Extract `<section>.<key>.$date` as an instant, tolerating any malformed shape
fn mongo_date(metadata: Option<&Map<String, Value>>, key: &str) -> Option<DateTime<Utc>> {
    metadata?
        .get(key)?
        .get("$date")?
        .as_str()?
        .parse::<DateTime<Utc>>()
        .ok()
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)?.as_str().map(str::to_owned)
}

/// Copy the request parameter mapping, keeping string values only
fn string_map(value: Option<&Value>) -> HashMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_owned())))
                .collect()
        })
        .unwrap_or_default()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
