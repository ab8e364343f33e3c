use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;
use crate::services::analyzer::{FilterSpec, filter_records, stats, timers};
use crate::utils::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsParams {
    /// Exact, case-sensitive user match
    pub user: Option<String>,
    /// Inclusive range start (YYYY-MM-DD)
    pub date_from: Option<NaiveDate>,
    /// Inclusive range end (YYYY-MM-DD)
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring search
    pub search: Option<String>,
    /// Comma-separated exceedance thresholds in whole seconds, e.g. `10,20,30`.
    /// Defaults to the configured threshold set.
    pub thresholds: Option<String>,
}

impl AnalyticsParams {
    fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            user: self.user.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
            search: self.search.clone(),
        }
    }

    fn threshold_list(&self, default: &[u64]) -> ApiResult<Vec<u64>> {
        let raw = match &self.thresholds {
            Some(raw) => raw,
            None => return Ok(default.to_vec()),
        };

        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u64>().map_err(|_| {
                    ApiError::invalid_input(format!("invalid threshold value: {}", part))
                })
            })
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    #[serde(flatten)]
    pub analytics: stats::AnalyticsData,
    /// Per-threshold (seconds) exceedance counts by timer
    #[schema(value_type = Object)]
    pub threshold_counts: BTreeMap<u64, HashMap<String, u64>>,
}

/// Aggregate timer statistics over the filtered records
#[utoipa::path(
    get,
    path = "/api/analytics",
    params(AnalyticsParams),
    responses(
        (status = 200, description = "Timer statistics and global summary", body = AnalyticsResponse),
        (status = 400, description = "Malformed threshold list")
    ),
    tag = "Analytics"
)]
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<Json<AnalyticsResponse>> {
    let thresholds = params.threshold_list(&state.config.data.default_thresholds_secs)?;
    let records = filter_records(state.logs.records(), &params.filter_spec());

    let analytics = stats::aggregate(&records);
    let threshold_counts = thresholds
        .into_iter()
        .map(|secs| (secs, stats::threshold_counts(&records, secs)))
        .collect();

    Ok(Json(AnalyticsResponse { analytics, threshold_counts }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimerCatalogEntry {
    pub timer: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
}

/// The stopwatch timer catalog: what each conventional timer key measures
#[utoipa::path(
    get,
    path = "/api/analytics/timers",
    responses(
        (status = 200, description = "Timer catalog", body = Vec<TimerCatalogEntry>)
    ),
    tag = "Analytics"
)]
pub async fn list_timers() -> Json<Vec<TimerCatalogEntry>> {
    let entries = timers::known_timers()
        .into_iter()
        .map(|timer| TimerCatalogEntry {
            timer: timer.to_owned(),
            name: timers::timer_name(timer),
            display_name: timers::display_name(timer),
            description: timers::timer_description(timer),
        })
        .collect();
    Json(entries)
}
