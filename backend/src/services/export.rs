//! Spreadsheet export
//!
//! Produces CSV documents from the rows currently displayed in a table: the
//! first row is the configured column headers, followed by one row per
//! record. Columns are addressed by the serialized field name so any
//! `Serialize` row type works.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::utils::ApiResult;

/// One export column: header text, the serialized field it reads, and an
/// optional display width hint (carried for the frontend table, CSV itself
/// has no column widths).
#[derive(Debug, Clone)]
pub struct ExportColumn {
    pub header: String,
    pub key: String,
    pub width: Option<u16>,
}

impl ExportColumn {
    pub fn new(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self { header: header.into(), key: key.into(), width: None }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }
}

/// Serialize `rows` into a CSV document with the configured columns.
///
/// Missing or null fields become empty cells; nested values are rendered as
/// JSON text, mirroring how the table view displays them.
pub fn write_csv<T: Serialize>(rows: &[T], columns: &[ExportColumn]) -> ApiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(columns.iter().map(|col| col.header.as_str()))?;

    for row in rows {
        let value = serde_json::to_value(row)?;
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);
        let record: Vec<String> =
            columns.iter().map(|col| cell_text(obj.get(&col.key))).collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|err| crate::utils::ApiError::internal_error(format!("CSV flush failed: {}", err)))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}
