pub mod analytics;
pub mod datasets;
pub mod logs;

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Wrap CSV bytes as a downloadable attachment
pub(crate) fn csv_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    (headers, bytes).into_response()
}
