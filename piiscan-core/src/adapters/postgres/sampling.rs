//! PostgreSQL sample query execution.
//!
//! PostgreSQL values are strongly typed on the wire, so a cell's text form is
//! derived from the column's reported type. Arrays are joined element by
//! element. Enums, domains and other user types fall back to their raw value
//! when it is printable text; binary-only types (bytea, interval, geometric)
//! are skipped rather than guessed at.

use crate::error::PiiScanError;
use crate::models::SampleRows;
use sqlx::postgres::types::PgMoney;
use sqlx::postgres::{PgRow, PgValueRef};
use sqlx::types::BigDecimal;
use sqlx::{Column, PgPool, Row, TypeInfo, ValueRef};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Executes a prepared sample query and returns each cell's text.
pub async fn fetch_sample(
    pool: &PgPool,
    table: &str,
    query: &str,
) -> Result<SampleRows, PiiScanError> {
    tracing::debug!("Sampling PostgreSQL table '{}'", table);

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

/// Text form of one cell; `None` for NULL and unmapped types.
fn cell_text(row: &PgRow, index: usize) -> Option<String> {
    let type_name = row
        .columns()
        .get(index)
        .map(|c| c.type_info().name().to_ascii_uppercase())
        .unwrap_or_default();

    let text = match type_name.as_str() {
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" | "CITEXT" | "UNKNOWN" => {
            row.try_get::<Option<String>, _>(index).ok().flatten()
        }
        "INT2" => display(row.try_get::<Option<i16>, _>(index)),
        "INT4" => display(row.try_get::<Option<i32>, _>(index)),
        "INT8" => display(row.try_get::<Option<i64>, _>(index)),
        "FLOAT4" => display(row.try_get::<Option<f32>, _>(index)),
        "FLOAT8" => display(row.try_get::<Option<f64>, _>(index)),
        "BOOL" => display(row.try_get::<Option<bool>, _>(index)),
        "UUID" => display(row.try_get::<Option<uuid::Uuid>, _>(index)),
        "DATE" => display(row.try_get::<Option<chrono::NaiveDate>, _>(index)),
        "TIME" => display(row.try_get::<Option<chrono::NaiveTime>, _>(index)),
        "TIMESTAMP" => display(row.try_get::<Option<chrono::NaiveDateTime>, _>(index)),
        "TIMESTAMPTZ" => {
            display(row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index))
        }
        "JSON" | "JSONB" => display(row.try_get::<Option<serde_json::Value>, _>(index)),
        "NUMERIC" => display(row.try_get::<Option<BigDecimal>, _>(index)),
        "MONEY" => row
            .try_get::<Option<PgMoney>, _>(index)
            .ok()
            .flatten()
            .map(|money| money.to_bigdecimal(2).to_string()),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "CHAR[]" | "NAME[]" => {
            joined(row.try_get::<Option<Vec<Option<String>>>, _>(index))
        }
        "INT2[]" => joined(row.try_get::<Option<Vec<Option<i16>>>, _>(index)),
        "INT4[]" => joined(row.try_get::<Option<Vec<Option<i32>>>, _>(index)),
        "INT8[]" => joined(row.try_get::<Option<Vec<Option<i64>>>, _>(index)),
        "NUMERIC[]" => joined(row.try_get::<Option<Vec<Option<BigDecimal>>>, _>(index)),
        "INET" | "CIDR" => raw_value(row, index)
            .and_then(|value| value.as_bytes().ok())
            .and_then(inet_text),
        "BYTEA" | "INTERVAL" => None,
        _ => raw_value(row, index)
            .and_then(|value| value.as_str().ok())
            .and_then(printable_text),
    };

    if text.is_none() {
        tracing::trace!("No text for cell {} of type {}", index, type_name);
    }
    text
}

fn display<T: ToString>(value: Result<Option<T>, sqlx::Error>) -> Option<String> {
    value.ok().flatten().map(|v| v.to_string())
}

fn joined<T: ToString>(value: Result<Option<Vec<Option<T>>>, sqlx::Error>) -> Option<String> {
    value.ok().flatten().and_then(|elements| join_elements(&elements))
}

/// Non-NULL raw value of a cell.
fn raw_value(row: &PgRow, index: usize) -> Option<PgValueRef<'_>> {
    row.try_get_raw(index).ok().filter(|value| !value.is_null())
}

/// Joins the non-NULL elements of an array cell with `", "`.
///
/// An array holding only NULLs has no text.
pub(crate) fn join_elements<T: ToString>(elements: &[Option<T>]) -> Option<String> {
    let parts: Vec<String> = elements
        .iter()
        .flatten()
        .map(ToString::to_string)
        .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Accepts a raw value as text only when it is non-empty and printable.
pub(crate) fn printable_text(raw: &str) -> Option<String> {
    let printable = !raw.is_empty()
        && raw
            .chars()
            .all(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'));

    printable.then(|| raw.to_string())
}

/// Renders the binary `inet`/`cidr` wire format: family, prefix bits,
/// cidr flag, address length, then the address bytes.
pub(crate) fn inet_text(bytes: &[u8]) -> Option<String> {
    let [family, bits, _is_cidr, len, address @ ..] = bytes else {
        return None;
    };
    if address.len() != usize::from(*len) {
        return None;
    }

    let (ip, full_bits) = match (*family, address.len()) {
        (2, 4) => {
            let octets: [u8; 4] = address.try_into().ok()?;
            (IpAddr::V4(Ipv4Addr::from(octets)), 32)
        }
        (3, 16) => {
            let octets: [u8; 16] = address.try_into().ok()?;
            (IpAddr::V6(Ipv6Addr::from(octets)), 128)
        }
        _ => return None,
    };

    if *bits == full_bits {
        Some(ip.to_string())
    } else {
        Some(format!("{}/{}", ip, bits))
    }
}
