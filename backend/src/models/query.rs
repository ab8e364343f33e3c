//! Query benchmark data model
//!
//! Query datasets are produced by an offline benchmark harness and loaded as
//! `{"results": [...]}` JSON documents; field names stay camelCase on the
//! wire to match those files.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One benchmarked query with its observed timings and the indexes it hit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query_name: String,
    pub avg_execution_time_mongo: f64,
    pub avg_execution_time_code: f64,
    pub execution_times_mongo: Vec<f64>,
    pub execution_times_code: Vec<f64>,
    pub indexes_used: Vec<String>,
}

impl QueryResult {
    /// Combined database + application average, used for sorting and export
    pub fn total_time(&self) -> f64 {
        self.avg_execution_time_mongo + self.avg_execution_time_code
    }

    /// Category derived from the `<category>_<rest>` naming convention.
    /// Names without a separator belong to no category.
    pub fn category(&self) -> Option<&str> {
        self.query_name.split_once('_').map(|(prefix, _)| prefix)
    }
}

/// Wrapper object as stored on disk / uploaded by the user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryDataset {
    pub results: Vec<QueryResult>,
}
