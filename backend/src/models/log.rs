//! Log record data model
//!
//! Records originate from a MongoDB collection export, so the wire format
//! keeps the Mongo extended-JSON conventions (`_id`, `{"$date": ...}`) and
//! the PascalCase field names the logger wrote.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Mongo extended-JSON date wrapper: `{"$date": "2024-01-05T10:30:00Z"}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MongoDate {
    #[serde(rename = "$date")]
    pub date: DateTime<Utc>,
}

impl From<DateTime<Utc>> for MongoDate {
    fn from(date: DateTime<Utc>) -> Self {
        Self { date }
    }
}

/// Record metadata. Normalization guarantees both timestamps are set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct RecordMetadata {
    pub created: MongoDate,
    pub modified: MongoDate,
}

/// One logged request/operation.
///
/// `request_body_dictionary` is an open-ended string-to-string mapping; a
/// reserved subset of its keys (`sw<N>`, case-insensitive) carries stopwatch
/// durations in milliseconds encoded as strings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LogRecord {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub metadata: RecordMetadata,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub request_body: Option<String>,
    #[serde(default)]
    pub request_body_dictionary: HashMap<String, String>,
    #[serde(default)]
    pub response_body: Option<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub user: String,
}

impl LogRecord {
    /// Creation instant, always valid after normalization
    pub fn created_at(&self) -> DateTime<Utc> {
        self.metadata.created.date
    }

    /// Value of one request parameter, if present
    pub fn param(&self, key: &str) -> Option<&str> {
        self.request_body_dictionary.get(key).map(String::as_str)
    }
}
