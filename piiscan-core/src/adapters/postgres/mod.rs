//! PostgreSQL database adapter with connection pooling.
//!
//! # Module Structure
//! - `connection`: Connection pool management and validation
//! - `sampling`: Sample query execution and type-aware cell text extraction
//!
//! # Security Guarantees
//! - All operations are read-only (sessions default to read-only transactions)
//! - Connection strings are sanitized in error messages
//! - Statement timeouts prevent resource exhaustion
//!
//! Introspection is limited to the session's current schema
//! (`current_schema()`), which is also where unqualified sample queries
//! resolve table names.

mod connection;
mod sampling;


use super::{AdapterFeature, ConnectionConfig, DatabaseAdapter};
use crate::Result;
use crate::error::PiiScanError;
use crate::models::{ColumnInfo, DatabaseType, SampleRows};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// PostgreSQL database adapter with connection pooling
pub struct PostgresAdapter {
    pub pool: PgPool,
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
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
            r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = current_schema()
              AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            PiiScanError::introspection_failed("Failed to enumerate PostgreSQL tables", e)
        })?;

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
            SELECT column_name::text AS column_name,
                   data_type::text AS data_type
            FROM information_schema.columns
            WHERE table_schema = current_schema()
              AND table_name = $1
            ORDER BY ordinal_position
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
                let data_type: String = row.try_get("data_type").map_err(|e| {
                    PiiScanError::introspection_failed(
                        format!("Failed to read column type for table '{}'", table),
                        e,
                    )
                })?;
                Ok(ColumnInfo::new(name, data_type))
            })
            .collect()
    }

    async fn fetch_sample(&self, table: &str, query: &str) -> Result<SampleRows> {
        sampling::fetch_sample(&self.pool, table, query).await
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::PostgreSQL
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
