//! MySQL database adapter with connection pooling.
//!
//! # Module Structure
//! - `connection`: Connection pool management and validation
//! - `sampling`: Sample query execution and cell text extraction
//!
//! # Security Guarantees
//! - All operations are read-only (sessions run READ ONLY transactions)
//! - Connection strings are sanitized in error messages
//! - `max_execution_time` bounds every SELECT
//!
//! Introspection is limited to the connection's default database
//! (`DATABASE()`).

mod connection;
mod sampling;


use super::{AdapterFeature, ConnectionConfig, DatabaseAdapter};
use crate::Result;
use crate::error::PiiScanError;
use crate::models::{ColumnInfo, DatabaseType, SampleRows};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

/// MySQL database adapter with connection pooling
pub struct MySqlAdapter {
    /// Connection pool for database operations
    pub pool: MySqlPool,
    /// Connection configuration (pool settings, timeouts, etc.)
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseAdapter for MySqlAdapter {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i64 = sqlx::query_scalar("SELECT CAST(1 AS SIGNED INTEGER)")
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
            r#"
            SELECT CAST(TABLE_NAME AS CHAR) AS table_name
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = DATABASE()
              AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PiiScanError::introspection_failed("Failed to enumerate MySQL tables", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("table_name").map_err(|e| {
                    PiiScanError::introspection_failed("Failed to read table name", e)
                })
            })
            .collect()
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
                   CAST(COLUMN_TYPE AS CHAR) AS data_type
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE()
              AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#,
        )
        .bind(table)
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
                let name: String = row.try_get("column_name").map_err(|e| {
                    PiiScanError::introspection_failed(
                        format!("Failed to read column name for table '{}'", table),
                        e,
                    )
                })?;
                let data_type: String = row.try_get("data_type").unwrap_or_default();
                Ok(ColumnInfo::new(name, data_type))
            })
            .collect()
    }

    async fn fetch_sample(&self, table: &str, query: &str) -> Result<SampleRows> {
        sampling::fetch_sample(&self.pool, table, query).await
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::MySQL
    }

    fn supports_feature(&self, feature: AdapterFeature) -> bool {
        matches!(
            feature,
            AdapterFeature::Introspection
                | AdapterFeature::DataSampling
                | AdapterFeature::ConnectionPooling
                | AdapterFeature::QueryTimeout
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
