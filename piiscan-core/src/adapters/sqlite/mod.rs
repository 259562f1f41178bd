//! SQLite database adapter.
//!
//! # Module Structure
//! - `connection`: Connection handling (single connection, read-only by default)
//! - `sampling`: Sample query execution and cell text extraction
//!
//! # SQLite-Specific Features
//! - Uses `sqlite_master` for table enumeration
//! - Uses `PRAGMA table_info` for column metadata
//! - Supports both file-based and in-memory databases
//! - No connection pooling (a single connection is sufficient)

pub mod connection;
pub mod sampling;


use super::{AdapterFeature, ConnectionConfig, DatabaseAdapter};
use crate::Result;
use crate::error::PiiScanError;
use crate::models::{ColumnInfo, DatabaseType, SampleRows};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

/// SQLite database adapter.
pub struct SqliteAdapter {
    /// Connection pool (single connection for SQLite)
    pub pool: SqlitePool,
    /// Connection configuration
    pub config: ConnectionConfig,
    /// Original connection string (kept for reference, public for test access)
    pub connection_string: String,
}

impl std::fmt::Debug for SqliteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAdapter")
            .field("config", &self.config)
            .field("is_in_memory", &self.is_in_memory())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(PiiScanError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(PiiScanError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PiiScanError::introspection_failed("Failed to enumerate SQLite tables", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("name").map_err(|e| {
                    PiiScanError::introspection_failed("Failed to read table name", e)
                })
            })
            .collect()
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let pragma = format!("PRAGMA table_info('{}')", table.replace('\'', "''"));

        let rows = sqlx::query(&pragma)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                PiiScanError::introspection_failed(
                    format!("Failed to enumerate columns of table '{}'", table),
                    e,
                )
            })?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name").map_err(|e| {
                    PiiScanError::introspection_failed(
                        format!("Failed to read column name for table '{}'", table),
                        e,
                    )
                })?;
                // Columns declared without a type report an empty string
                let data_type: String = row.try_get("type").unwrap_or_default();
                Ok(ColumnInfo::new(name, data_type))
            })
            .collect()
    }

    async fn fetch_sample(&self, table: &str, query: &str) -> Result<SampleRows> {
        sampling::fetch_sample(&self.pool, table, query).await
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn supports_feature(&self, feature: AdapterFeature) -> bool {
        // SQLite has no server-side statement timeout and uses one connection
        matches!(
            feature,
            AdapterFeature::Introspection
                | AdapterFeature::DataSampling
                | AdapterFeature::ReadOnlyMode
        )
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
