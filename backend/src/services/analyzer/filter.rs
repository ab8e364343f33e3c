//! Record filtering

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::models::LogRecord;

/// Request parameter mapping key matched by the free-text search besides
/// path and user
const SEARCH_ID_PARAM: &str = "VehicleId";

/// Filter criteria. Absent fields are no-ops; a default spec matches
/// everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(default)]
pub struct FilterSpec {
    /// Exact, case-sensitive user match
    pub user: Option<String>,
    /// Inclusive range start, compared by calendar day
    pub date_from: Option<NaiveDate>,
    /// Inclusive range end, compared by calendar day
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring over path, user and the vehicle id parameter
    pub search: Option<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.user.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.search.is_none()
    }
}

/// Return the records matching every supplied criterion, order preserved.
pub fn filter_records(records: &[LogRecord], spec: &FilterSpec) -> Vec<LogRecord> {
    records.iter().filter(|record| matches(record, spec)).cloned().collect()
}

fn matches(record: &LogRecord, spec: &FilterSpec) -> bool {
    if let Some(user) = &spec.user {
        if &record.user != user {
            return false;
        }
    }

    // Compare calendar days so both boundary days are inclusive regardless
    // of the record's time-of-day. Normalization guarantees a creation
    // instant on every record, so the date criteria always apply.
    let day = record.created_at().date_naive();
    if let Some(from) = spec.date_from {
        if day < from {
            return false;
        }
    }
    if let Some(to) = spec.date_to {
        if day > to {
            return false;
        }
    }

    if let Some(term) = &spec.search {
        let term = term.to_lowercase();
        let matches_path = record.path.to_lowercase().contains(&term);
        let matches_user = record.user.to_lowercase().contains(&term);
        let matches_id = record
            .param(SEARCH_ID_PARAM)
            .map(|id| id.to_lowercase().contains(&term))
            .unwrap_or(false);

        if !matches_path && !matches_user && !matches_id {
            return false;
        }
    }

    true
}
