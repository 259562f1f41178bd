//! MySQL sample query execution.

use crate::error::PiiScanError;
use crate::models::SampleRows;
use sqlx::mysql::MySqlRow;
use sqlx::types::BigDecimal;
use sqlx::{Column, MySqlPool, Row};

/// Executes a prepared sample query and returns each cell's text.
pub async fn fetch_sample(
    pool: &MySqlPool,
    table: &str,
    query: &str,
) -> Result<SampleRows, PiiScanError> {
    tracing::debug!("Sampling MySQL table '{}'", table);

    let rows = sqlx::query(query)
        .fetch_all(pool)
        .await
        .map_err(|e| PiiScanError::scan_failed(table, "Sample query failed", e))?;

    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| {
            (0..row.columns().len())
                .map(|index| cell_text(row, index))
                .collect()
        })
        .collect();

    Ok(SampleRows { columns, rows })
}

/// Text form of one cell; `None` for NULL, binary and unmapped types.
///
/// MySQL's text protocol reports most values loosely typed, so decoding is
/// attempted in order from the most to the least common representation.
fn cell_text(row: &MySqlRow, index: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<BigDecimal>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<chrono::NaiveTime>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<serde_json::Value>, _>(index) {
        return value.map(|v| v.to_string());
    }
    None
}
