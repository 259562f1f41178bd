//! SQLite sample query execution.
//!
//! SQLite is dynamically typed: a column's declared type says nothing about
//! the storage class of an individual value, so each cell is decoded by
//! trying the storage classes in turn.

use crate::error::PiiScanError;
use crate::models::SampleRows;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool};

/// Executes a prepared sample query and returns each cell's text.
pub async fn fetch_sample(
    pool: &SqlitePool,
    table: &str,
    query: &str,
) -> Result<SampleRows, PiiScanError> {
    tracing::debug!("Sampling SQLite table '{}'", table);

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

    let rows = rows.iter().map(row_to_text).collect();

    Ok(SampleRows { columns, rows })
}

fn row_to_text(row: &SqliteRow) -> Vec<Option<String>> {
    (0..row.columns().len())
        .map(|index| cell_text(row, index))
        .collect()
}

/// Text form of one cell; `None` for NULL and BLOB values.
fn cell_text(row: &SqliteRow, index: usize) -> Option<String> {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v;
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(|n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map(|n| n.to_string());
    }

    tracing::trace!("Skipping cell {} without a text representation", index);
    None
}
