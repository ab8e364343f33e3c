//! Logsight backend
//!
//! HTTP backend for the log analytics dashboard: it loads a static log
//! export and named query benchmark datasets into memory, and exposes the
//! aggregation engine (`services::analyzer`) plus spreadsheet export to the
//! browser frontend as a small JSON API.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::services::{DatasetRegistry, LogStore};

/// Shared application state. Log records are immutable after startup; the
/// dataset registry accepts runtime uploads.
pub struct AppState {
    pub config: Config,
    pub logs: LogStore,
    pub datasets: DatasetRegistry,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::logs::list_logs,
        handlers::logs::export_logs,
        handlers::analytics::get_analytics,
        handlers::analytics::list_timers,
        handlers::datasets::list_datasets,
        handlers::datasets::get_dataset,
        handlers::datasets::dataset_summary,
        handlers::datasets::upload_dataset,
        handlers::datasets::export_dataset,
    ),
    components(schemas(
        models::LogRecord,
        models::RecordMetadata,
        models::MongoDate,
        models::QueryResult,
        models::QueryDataset,
        services::DatasetEntry,
        services::analyzer::stats::TimerStat,
        services::analyzer::stats::DateRange,
        services::analyzer::stats::AnalyticsData,
        services::analyzer::queries::QuerySummary,
        services::analyzer::queries::IndexUsage,
        services::analyzer::queries::Dimension,
        handlers::logs::LogListResponse,
        handlers::analytics::AnalyticsResponse,
        handlers::analytics::TimerCatalogEntry,
        handlers::datasets::DatasetSummaryResponse,
        handlers::datasets::UploadDatasetRequest,
    )),
    tags(
        (name = "Logs", description = "Filtered log record access and export"),
        (name = "Analytics", description = "Stopwatch timer statistics"),
        (name = "Query Datasets", description = "Query benchmark datasets")
    )
)]
pub struct ApiDoc;

/// Build the application router with all routes and layers
pub fn build_router(state: Arc<AppState>) -> Router {
    let serve_static = state.config.static_config.enabled;
    let web_root = state.config.static_config.web_root.clone();

    let mut router = Router::new()
        .route("/api/logs", get(handlers::logs::list_logs))
        .route("/api/logs/export", get(handlers::logs::export_logs))
        .route("/api/analytics", get(handlers::analytics::get_analytics))
        .route("/api/analytics/timers", get(handlers::analytics::list_timers))
        .route(
            "/api/query-datasets",
            get(handlers::datasets::list_datasets).post(handlers::datasets::upload_dataset),
        )
        .route("/api/query-datasets/:name", get(handlers::datasets::get_dataset))
        .route("/api/query-datasets/:name/summary", get(handlers::datasets::dataset_summary))
        .route("/api/query-datasets/:name/export", get(handlers::datasets::export_dataset))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    if serve_static {
        router = router.fallback_service(ServeDir::new(web_root));
    }

    router
}
