use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;
use crate::models::LogRecord;
use crate::services::ExportColumn;
use crate::services::analyzer::{FilterSpec, extract_timers, filter_records};
use crate::services::export::write_csv;
use crate::utils::ApiResult;

#[derive(Debug, Serialize, ToSchema)]
pub struct LogListResponse {
    pub total: usize,
    /// Entries rejected while loading the log export
    pub error_count: usize,
    pub records: Vec<LogRecord>,
}

/// List log records matching the filter criteria
#[utoipa::path(
    get,
    path = "/api/logs",
    params(FilterSpec),
    responses(
        (status = 200, description = "Filtered log records", body = LogListResponse)
    ),
    tag = "Logs"
)]
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Query(spec): Query<FilterSpec>,
) -> ApiResult<Json<LogListResponse>> {
    let records = filter_records(state.logs.records(), &spec);
    tracing::debug!("filter matched {} of {} records", records.len(), state.logs.records().len());

    Ok(Json(LogListResponse {
        total: records.len(),
        error_count: state.logs.error_count(),
        records,
    }))
}

#[derive(Serialize)]
struct LogExportRow {
    id: String,
    user: String,
    path: String,
    status: String,
    created: String,
    modified: String,
    timers: String,
}

impl From<&LogRecord> for LogExportRow {
    fn from(record: &LogRecord) -> Self {
        let timers = extract_timers(record)
            .into_iter()
            .map(|(timer, ms)| format!("{}={}", timer, ms))
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            id: record.id.clone(),
            user: record.user.clone(),
            path: record.path.clone(),
            status: record.status.clone().unwrap_or_default(),
            created: record.metadata.created.date.to_rfc3339(),
            modified: record.metadata.modified.date.to_rfc3339(),
            timers,
        }
    }
}

/// Export the filtered log records as a spreadsheet (CSV)
#[utoipa::path(
    get,
    path = "/api/logs/export",
    params(FilterSpec),
    responses(
        (status = 200, description = "CSV document, first row is the column headers")
    ),
    tag = "Logs"
)]
pub async fn export_logs(
    State(state): State<Arc<AppState>>,
    Query(spec): Query<FilterSpec>,
) -> ApiResult<impl IntoResponse> {
    let records = filter_records(state.logs.records(), &spec);
    let rows: Vec<LogExportRow> = records.iter().map(LogExportRow::from).collect();

    let columns = vec![
        ExportColumn::new("Id", "id").with_width(30),
        ExportColumn::new("User", "user").with_width(20),
        ExportColumn::new("Path", "path").with_width(40),
        ExportColumn::new("Status", "status").with_width(15),
        ExportColumn::new("Created", "created").with_width(25),
        ExportColumn::new("Modified", "modified").with_width(25),
        ExportColumn::new("Timers (ms)", "timers").with_width(50),
    ];

    let bytes = write_csv(&rows, &columns)?;
    let filename = format!("logs-{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok(super::csv_attachment(&filename, bytes))
}
