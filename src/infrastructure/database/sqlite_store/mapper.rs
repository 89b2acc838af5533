use crate::shared::error::AppError;
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row};

pub(super) fn map_document_row(row: &SqliteRow) -> Result<Value, AppError> {
    let data: String = row.try_get("data")?;
    Ok(serde_json::from_str(&data)?)
}

pub(super) fn json_path(field: &str) -> String {
    format!("$.{field}")
}
