use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;
use crate::models::QueryResult;
use crate::services::analyzer::queries;
use crate::services::{DatasetEntry, ExportColumn, export::write_csv};
use crate::utils::{ApiError, ApiResult};

/// Entries shown in the per-dimension "slowest queries" charts
const TOP_SLOWEST: usize = 10;

/// List all loaded query datasets
#[utoipa::path(
    get,
    path = "/api/query-datasets",
    responses(
        (status = 200, description = "Dataset names and sizes", body = Vec<DatasetEntry>)
    ),
    tag = "Query Datasets"
)]
pub async fn list_datasets(State(state): State<Arc<AppState>>) -> Json<Vec<DatasetEntry>> {
    Json(state.datasets.list())
}

/// Raw query results of one dataset
#[utoipa::path(
    get,
    path = "/api/query-datasets/{name}",
    params(
        ("name" = String, Path, description = "Dataset name")
    ),
    responses(
        (status = 200, description = "Query results", body = Vec<QueryResult>),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Query Datasets"
)]
pub async fn get_dataset(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<QueryResult>>> {
    let results =
        state.datasets.get(&name).ok_or_else(|| ApiError::dataset_not_found(&name))?;
    Ok(Json(results))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
pub struct SummaryParams {
    /// Restrict the summary to one query category (name prefix before `_`)
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatasetSummaryResponse {
    pub summary: queries::QuerySummary,
    pub index_usage: Vec<queries::IndexUsage>,
    /// All categories present in the dataset, regardless of the filter
    pub categories: Vec<String>,
    pub top_slowest_mongo: Vec<QueryResult>,
    pub top_slowest_code: Vec<QueryResult>,
}

/// Aggregated performance summary of one dataset
#[utoipa::path(
    get,
    path = "/api/query-datasets/{name}/summary",
    params(
        ("name" = String, Path, description = "Dataset name"),
        SummaryParams
    ),
    responses(
        (status = 200, description = "Dataset summary", body = DatasetSummaryResponse),
        (status = 400, description = "Category matches no queries"),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Query Datasets"
)]
pub async fn dataset_summary(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<Json<DatasetSummaryResponse>> {
    let all = state.datasets.get(&name).ok_or_else(|| ApiError::dataset_not_found(&name))?;

    let selected = match &params.category {
        Some(category) => queries::filter_category(&all, category),
        None => all.clone(),
    };

    let summary = queries::summarize(&selected).ok_or_else(|| {
        ApiError::invalid_input(format!(
            "category '{}' matches no queries in dataset '{}'",
            params.category.as_deref().unwrap_or_default(),
            name
        ))
    })?;

    Ok(Json(DatasetSummaryResponse {
        summary,
        index_usage: queries::index_usage(&selected),
        categories: queries::categories(&all),
        top_slowest_mongo: queries::top_slowest(&selected, TOP_SLOWEST, queries::Dimension::Mongo),
        top_slowest_code: queries::top_slowest(&selected, TOP_SLOWEST, queries::Dimension::Code),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadDatasetRequest {
    /// Registry name for the new dataset
    pub name: String,
    /// The dataset document: `{"results": [...]}`
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

/// Upload a new query dataset
///
/// The payload is validated as a whole before anything is admitted; on
/// failure the error names the offending elements and no partial dataset is
/// kept.
#[utoipa::path(
    post,
    path = "/api/query-datasets",
    request_body = UploadDatasetRequest,
    responses(
        (status = 201, description = "Dataset admitted", body = DatasetEntry),
        (status = 400, description = "Shape validation failed"),
        (status = 409, description = "Dataset name already in use")
    ),
    tag = "Query Datasets"
)]
pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadDatasetRequest>,
) -> ApiResult<impl IntoResponse> {
    let query_count = state.datasets.insert(&request.name, &request.payload)?;
    tracing::info!("admitted uploaded dataset '{}' ({} queries)", request.name, query_count);

    let entry = DatasetEntry { name: request.name, query_count };
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Serialize)]
struct QueryExportRow {
    query_name: String,
    avg_mongo_ms: f64,
    avg_code_ms: f64,
    total_avg_ms: f64,
    mongo_times: String,
    code_times: String,
    indexes_used: String,
    index_count: usize,
}

impl From<&QueryResult> for QueryExportRow {
    fn from(result: &QueryResult) -> Self {
        Self {
            query_name: result.query_name.clone(),
            avg_mongo_ms: round2(result.avg_execution_time_mongo),
            avg_code_ms: round2(result.avg_execution_time_code),
            total_avg_ms: round2(result.total_time()),
            mongo_times: join_times(&result.execution_times_mongo),
            code_times: join_times(&result.execution_times_code),
            indexes_used: result.indexes_used.join(", "),
            index_count: result.indexes_used.len(),
        }
    }
}

fn join_times(times: &[f64]) -> String {
    times.iter().map(f64::to_string).collect::<Vec<_>>().join(", ")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Export one dataset's performance table as a spreadsheet (CSV)
#[utoipa::path(
    get,
    path = "/api/query-datasets/{name}/export",
    params(
        ("name" = String, Path, description = "Dataset name")
    ),
    responses(
        (status = 200, description = "CSV document, first row is the column headers"),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Query Datasets"
)]
pub async fn export_dataset(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let results =
        state.datasets.get(&name).ok_or_else(|| ApiError::dataset_not_found(&name))?;
    let rows: Vec<QueryExportRow> = results.iter().map(QueryExportRow::from).collect();

    let columns = vec![
        ExportColumn::new("Query Name", "query_name").with_width(40),
        ExportColumn::new("Avg MongoDB Time (ms)", "avg_mongo_ms").with_width(20),
        ExportColumn::new("Avg Code Time (ms)", "avg_code_ms").with_width(20),
        ExportColumn::new("Total Avg Time (ms)", "total_avg_ms").with_width(20),
        ExportColumn::new("MongoDB Times", "mongo_times").with_width(30),
        ExportColumn::new("Code Times", "code_times").with_width(30),
        ExportColumn::new("Indexes Used", "indexes_used").with_width(50),
        ExportColumn::new("Index Count", "index_count").with_width(15),
    ];

    let bytes = write_csv(&rows, &columns)?;
    let filename = format!(
        "query-results-{}-{}.csv",
        name.replace(char::is_whitespace, "-"),
        Utc::now().format("%Y-%m-%d")
    );
    Ok(super::csv_attachment(&filename, bytes))
}
