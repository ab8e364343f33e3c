//! Query benchmark aggregation

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use utoipa::ToSchema;

use crate::models::QueryResult;

/// Cross-dataset summary over a set of benchmarked queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuerySummary {
    pub total_queries: usize,
    /// Mean of the per-query database-side averages, rounded to 2 decimals
    pub avg_mongo_time: f64,
    /// Mean of the per-query application-side averages
    pub avg_code_time: f64,
    pub total_avg_time: f64,
    pub slowest_mongo: f64,
    pub slowest_code: f64,
    pub unique_indexes: usize,
}

/// How often one index was hit across the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IndexUsage {
    pub index: String,
    pub count: u64,
}

/// Which of the two timing dimensions to rank by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Mongo,
    Code,
}

/// Summarize a query dataset. Returns `None` for an empty input, which is a
/// caller error per the data contract (datasets are validated non-empty on
/// admission).
pub fn summarize(results: &[QueryResult]) -> Option<QuerySummary> {
    if results.is_empty() {
        return None;
    }

    let total_queries = results.len();
    let avg_mongo_time =
        results.iter().map(|r| r.avg_execution_time_mongo).sum::<f64>() / total_queries as f64;
    let avg_code_time =
        results.iter().map(|r| r.avg_execution_time_code).sum::<f64>() / total_queries as f64;
    let slowest_mongo = results.iter().map(|r| r.avg_execution_time_mongo).fold(f64::MIN, f64::max);
    let slowest_code = results.iter().map(|r| r.avg_execution_time_code).fold(f64::MIN, f64::max);
    let unique_indexes = results
        .iter()
        .flat_map(|r| r.indexes_used.iter())
        .collect::<BTreeSet<_>>()
        .len();

    Some(QuerySummary {
        total_queries,
        avg_mongo_time: round2(avg_mongo_time),
        avg_code_time: round2(avg_code_time),
        total_avg_time: round2(avg_mongo_time + avg_code_time),
        slowest_mongo: round2(slowest_mongo),
        slowest_code: round2(slowest_code),
        unique_indexes,
    })
}

/// Index usage frequency, sorted descending by count (name ascending as the
/// tie-breaker so the ordering is deterministic).
pub fn index_usage(results: &[QueryResult]) -> Vec<IndexUsage> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for result in results {
        for index in &result.indexes_used {
            *counts.entry(index.as_str()).or_insert(0) += 1;
        }
    }

    let mut usage: Vec<IndexUsage> = counts
        .into_iter()
        .map(|(index, count)| IndexUsage { index: index.to_owned(), count })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.index.cmp(&b.index)));
    usage
}

/// Distinct category prefixes present in the dataset, sorted. Query names
/// without a `_` separator carry no category and contribute nothing here.
pub fn categories(results: &[QueryResult]) -> Vec<String> {
    results
        .iter()
        .filter_map(|r| r.category())
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Queries belonging to one category (`<category>_...` prefix match)
pub fn filter_category(results: &[QueryResult], category: &str) -> Vec<QueryResult> {
    let prefix = format!("{}_", category);
    results.iter().filter(|r| r.query_name.starts_with(&prefix)).cloned().collect()
}

/// The `n` slowest queries by the chosen dimension, slowest first
pub fn top_slowest(results: &[QueryResult], n: usize, dimension: Dimension) -> Vec<QueryResult> {
    let mut sorted: Vec<QueryResult> = results.to_vec();
    sorted.sort_by(|a, b| {
        let (a, b) = match dimension {
            Dimension::Mongo => (a.avg_execution_time_mongo, b.avg_execution_time_mongo),
            Dimension::Code => (a.avg_execution_time_code, b.avg_execution_time_code),
        };
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
