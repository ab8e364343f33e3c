//! Timer statistics aggregation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

use super::timers::{extract_timers, timer_index};
use crate::models::LogRecord;

/// Fixed exceedance cutoffs shown on every stat row, in milliseconds
const OVER_10S_MS: i64 = 10_000;
const OVER_20S_MS: i64 = 20_000;
const OVER_30S_MS: i64 = 30_000;

/// Aggregate statistics for one timer across a record collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimerStat {
    /// Timer key as found in the records, e.g. `sw7`
    pub timer: String,
    pub count: u64,
    pub total: i64,
    pub average: f64,
    pub min: i64,
    pub max: i64,
    /// Observations strictly above 10s/20s/30s
    pub over_10s: u64,
    pub over_20s: u64,
    pub over_30s: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

/// Full analytics summary over a (possibly filtered) record collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsData {
    /// Per-timer stats, ordered by the numeric timer suffix
    pub timer_stats: Vec<TimerStat>,
    pub total_entries: usize,
    pub unique_users: usize,
    pub date_range: DateRange,
}

/// Aggregate timer statistics and the global summary over `records`.
///
/// Timers never observed in any record do not appear in the output; no
/// zero-filled rows are produced. When no record carries a creation date the
/// date range collapses to the current instant on both ends.
pub fn aggregate(records: &[LogRecord]) -> AnalyticsData {
    let mut series: HashMap<String, Vec<i64>> = HashMap::new();
    let mut users: HashSet<&str> = HashSet::new();
    let mut dates: Vec<DateTime<Utc>> = Vec::new();

    for record in records {
        if !record.user.is_empty() {
            users.insert(record.user.as_str());
        }
        dates.push(record.created_at());

        for (timer, value) in extract_timers(record) {
            series.entry(timer).or_default().push(value);
        }
    }

    // Sort by embedded numeric suffix, not lexically: sw7 before sw12.
    // Name itself breaks ties so the output order is deterministic.
    let mut names: Vec<String> = series.keys().cloned().collect();
    names.sort_by(|a, b| timer_index(a).cmp(&timer_index(b)).then_with(|| a.cmp(b)));

    let timer_stats = names
        .into_iter()
        .map(|name| {
            let values = &series[&name];
            stat_for(name, values)
        })
        .collect();

    let now = Utc::now();
    let date_range = DateRange {
        earliest: dates.iter().min().copied().unwrap_or(now),
        latest: dates.iter().max().copied().unwrap_or(now),
    };

    AnalyticsData {
        timer_stats,
        total_entries: records.len(),
        unique_users: users.len(),
        date_range,
    }
}

fn stat_for(timer: String, values: &[i64]) -> TimerStat {
    // aggregate() only builds series with at least one observation
    debug_assert!(!values.is_empty());

    let count = values.len() as u64;
    let total: i64 = values.iter().sum();
    let min = values.iter().min().copied().unwrap_or(0);
    let max = values.iter().max().copied().unwrap_or(0);

    TimerStat {
        timer,
        count,
        total,
        average: total as f64 / count as f64,
        min,
        max,
        over_10s: exceeding(values, OVER_10S_MS),
        over_20s: exceeding(values, OVER_20S_MS),
        over_30s: exceeding(values, OVER_30S_MS),
    }
}

fn exceeding(values: &[i64], threshold_ms: i64) -> u64 {
    values.iter().filter(|&&v| v > threshold_ms).count() as u64
}

/// Per-timer exceedance counts for one caller-supplied threshold.
///
/// The threshold is given in whole seconds while timer values are stored in
/// milliseconds; the comparison is strict (`value > threshold * 1000`).
/// Every timer observed in `records` gets an entry, zero when nothing
/// exceeded the cutoff.
pub fn threshold_counts(records: &[LogRecord], threshold_seconds: u64) -> HashMap<String, u64> {
    let threshold_ms = threshold_seconds as i64 * 1000;
    let mut counts: HashMap<String, u64> = HashMap::new();

    for record in records {
        for (timer, value) in extract_timers(record) {
            let entry = counts.entry(timer).or_insert(0);
            if value > threshold_ms {
                *entry += 1;
            }
        }
    }

    counts
}
