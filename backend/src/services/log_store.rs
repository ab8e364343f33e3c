//! In-memory log record store
//!
//! Records are loaded once at startup from a static JSON export and are
//! immutable for the lifetime of the process. A load failure is not fatal:
//! the dashboard comes up with an empty store and a warning, matching the
//! behaviour for any other unavailable data source.

use std::fs;
use std::path::Path;

use crate::models::LogRecord;
use crate::services::analyzer::normalize;

#[derive(Debug, Default)]
pub struct LogStore {
    records: Vec<LogRecord>,
    error_count: usize,
}

impl LogStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and normalize the log export at `path`. Never fails: unreadable
    /// or unparseable files leave the store empty.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("failed to read log file {}: {}", path.display(), err);
                return Self::empty();
            },
        };

        let raw: serde_json::Value = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("failed to parse log file {}: {}", path.display(), err);
                return Self::empty();
            },
        };

        let (records, error_count) = normalize(&raw);
        tracing::info!(
            "loaded {} log records from {} ({} rejected)",
            records.len(),
            path.display(),
            error_count
        );

        Self { records, error_count }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Number of entries rejected during normalization
    pub fn error_count(&self) -> usize {
        self.error_count
    }
}
