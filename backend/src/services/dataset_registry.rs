//! Named query dataset registry
//!
//! Datasets are admitted from two sources: well-known JSON files read at
//! startup from the configured directory, and user uploads at runtime. Both
//! go through the same shape validation; a dataset is admitted whole or not
//! at all.

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use utoipa::ToSchema;

use crate::models::QueryResult;
use crate::utils::{ApiError, ApiResult};

/// How many offending elements a validation error names before truncating
const MAX_REPORTED_ELEMENTS: usize = 5;

/// Registry entry as listed to the frontend
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatasetEntry {
    pub name: String,
    pub query_count: usize,
}

#[derive(Debug, Default)]
pub struct DatasetRegistry {
    datasets: DashMap<String, Vec<QueryResult>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir` as a dataset named after the file
    /// stem. Individual failures are warnings; the rest of the directory
    /// still loads.
    pub fn load_dir(&self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("failed to read dataset directory {}: {}", dir.display(), err);
                return;
            },
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|ext| ext == "json") != Some(true) {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(name) => name.to_owned(),
                None => continue,
            };

            match self.load_file(&name, &path) {
                Ok(count) => {
                    tracing::info!("loaded dataset '{}' ({} queries)", name, count);
                },
                Err(err) => {
                    tracing::warn!("skipping dataset file {}: {}", path.display(), err);
                },
            }
        }
    }

    fn load_file(&self, name: &str, path: &Path) -> ApiResult<usize> {
        let text = fs::read_to_string(path)?;
        let payload: Value = serde_json::from_str(&text)
            .map_err(|err| ApiError::validation_error(format!("invalid JSON: {}", err)))?;
        self.insert(name, &payload)
    }

    /// Validate and admit one dataset. All-or-nothing: on any validation
    /// failure the registry is left untouched.
    pub fn insert(&self, name: &str, payload: &Value) -> ApiResult<usize> {
        if name.trim().is_empty() {
            return Err(ApiError::invalid_input("dataset name must not be empty"));
        }
        if self.datasets.contains_key(name) {
            return Err(ApiError::dataset_exists(name));
        }

        let results = parse_dataset(payload)?;
        let count = results.len();
        self.datasets.insert(name.to_owned(), results);
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<Vec<QueryResult>> {
        self.datasets.get(name).map(|entry| entry.value().clone())
    }

    /// All datasets, sorted by name
    pub fn list(&self) -> Vec<DatasetEntry> {
        let mut entries: Vec<DatasetEntry> = self
            .datasets
            .iter()
            .map(|entry| DatasetEntry {
                name: entry.key().clone(),
                query_count: entry.value().len(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Shape-check an uploaded dataset and decode it.
///
/// Errors identify the offending elements by index so the user can locate
/// the problem in a large file.
fn parse_dataset(payload: &Value) -> ApiResult<Vec<QueryResult>> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::validation_error("expected a JSON object with a results array"))?;

    let results = obj
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::validation_error("expected a results array"))?;

    if results.is_empty() {
        return Err(ApiError::validation_error("results array is empty"));
    }

    let mut problems: Vec<String> = Vec::new();
    for (index, element) in results.iter().enumerate() {
        if let Err(problem) = check_element(element) {
            if problems.len() < MAX_REPORTED_ELEMENTS {
                problems.push(format!("element {}: {}", index, problem));
            } else {
                problems.push("...".to_owned());
                break;
            }
        }
    }

    if !problems.is_empty() {
        return Err(ApiError::validation_error(format!(
            "invalid query results: {}",
            problems.join("; ")
        )));
    }

    // Shape is verified above, so this decode cannot fail on field types
    let decoded: Vec<QueryResult> = serde_json::from_value(Value::Array(results.clone()))?;
    Ok(decoded)
}

fn check_element(element: &Value) -> Result<(), String> {
    let obj = element.as_object().ok_or("not an object")?;

    if !obj.get("queryName").map(Value::is_string).unwrap_or(false) {
        return Err("queryName must be a string".to_owned());
    }
    for field in ["avgExecutionTimeMongo", "avgExecutionTimeCode"] {
        if !obj.get(field).map(Value::is_number).unwrap_or(false) {
            return Err(format!("{} must be a number", field));
        }
    }
    for field in ["executionTimesMongo", "executionTimesCode"] {
        let ok = obj
            .get(field)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().all(Value::is_number))
            .unwrap_or(false);
        if !ok {
            return Err(format!("{} must be an array of numbers", field));
        }
    }
    let indexes_ok = obj
        .get("indexesUsed")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().all(Value::is_string))
        .unwrap_or(false);
    if !indexes_ok {
        return Err("indexesUsed must be an array of strings".to_owned());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "results": [{
                "queryName": "buyer_sold_filter",
                "avgExecutionTimeMongo": 12.5,
                "avgExecutionTimeCode": 30.0,
                "executionTimesMongo": [10.0, 15.0],
                "executionTimesCode": [25.0, 35.0],
                "indexesUsed": ["idx_status"]
            }]
        })
    }

    #[test]
    fn test_insert_valid_dataset() {
        let registry = DatasetRegistry::new();
        let count = registry.insert("default", &valid_payload()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(registry.list().len(), 1);
        assert_eq!(registry.get("default").unwrap()[0].query_name, "buyer_sold_filter");
    }

    #[test]
    fn test_missing_results_key_is_rejected() {
        let registry = DatasetRegistry::new();
        registry.insert("default", &valid_payload()).unwrap();

        let err = registry.insert("broken", &json!({"queries": []})).unwrap_err();
        assert!(err.to_string().contains("expected a results array"), "got: {}", err);
        // Existing datasets are unchanged
        assert_eq!(registry.len(), 1);
        assert!(registry.get("broken").is_none());
    }

    #[test]
    fn test_bad_element_reported_by_index() {
        let registry = DatasetRegistry::new();
        let payload = json!({
            "results": [
                valid_payload()["results"][0],
                {
                    "queryName": 42,
                    "avgExecutionTimeMongo": 1.0,
                    "avgExecutionTimeCode": 1.0,
                    "executionTimesMongo": [1.0],
                    "executionTimesCode": [1.0],
                    "indexesUsed": []
                }
            ]
        });
        let err = registry.insert("bad", &payload).unwrap_err();
        assert!(err.to_string().contains("element 1"), "got: {}", err);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_results_rejected() {
        let registry = DatasetRegistry::new();
        let err = registry.insert("empty", &json!({"results": []})).unwrap_err();
        assert!(err.to_string().contains("empty"), "got: {}", err);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = DatasetRegistry::new();
        registry.insert("default", &valid_payload()).unwrap();
        let err = registry.insert("default", &valid_payload()).unwrap_err();
        assert!(matches!(err, ApiError::DatasetExists { .. }));
    }
}
