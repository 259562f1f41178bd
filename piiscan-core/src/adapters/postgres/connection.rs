//! PostgreSQL connection pool management and validation.
//!
//! # Security Features
//! - Validates connection string format and parameters
//! - Enforces connection limits to prevent resource exhaustion
//! - Applies a statement timeout and read-only mode to every pooled session

use super::{ConnectionConfig, PostgresAdapter};
use crate::Result;
use crate::error::PiiScanError;
use sqlx::PgPool;
use url::Url;

impl PostgresAdapter {
    /// Creates a new PostgreSQL adapter with connection pooling.
    ///
    /// The pool connects lazily; use `test_connection` to verify reachability.
    ///
    /// # Errors
    /// Returns error if the connection string is invalid or the pool cannot
    /// be configured.
    pub async fn new(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        Self::validate_connection_string(connection_string)?;
        let config = config.with_target_details(connection_string);
        let pool = Self::create_connection_pool(connection_string, &config)?;

        Ok(Self { pool, config })
    }

    /// Creates the pool with per-session security settings.
    fn create_connection_pool(connection_string: &str, config: &ConnectionConfig) -> Result<PgPool> {
        use sqlx::Executor;

        let statements = session_statements(config);

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections.min(100))
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .test_before_acquire(true)
            // Applied to EVERY new connection in the pool
            .after_connect(move |conn, _meta| {
                let statements = statements.clone();
                Box::pin(async move {
                    for statement in &statements {
                        conn.execute(statement.as_str()).await?;
                    }
                    Ok(())
                })
            })
            .connect_lazy(connection_string)
            .map_err(|e| PiiScanError::Connection {
                context: format!(
                    "Failed to create PostgreSQL connection pool to {}",
                    crate::adapters::redact_database_url(connection_string)
                ),
                source: Box::new(e),
            })
    }

    /// Validates connection string format.
    ///
    /// # Errors
    /// Returns error if connection string is invalid
    pub fn validate_connection_string(connection_string: &str) -> Result<()> {
        let url = Url::parse(connection_string).map_err(|e| {
            PiiScanError::configuration(format!(
                "Invalid PostgreSQL connection string format: {}",
                e
            ))
        })?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(PiiScanError::configuration(
                "Connection string must use postgres:// or postgresql:// scheme",
            ));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(PiiScanError::configuration(
                "Connection string must specify a host",
            ));
        }

        Ok(())
    }
}

/// Session settings run on every new pooled connection.
///
/// Both the statement and the lock timeout follow `config.query_timeout`.
pub(crate) fn session_statements(config: &ConnectionConfig) -> Vec<String> {
    let timeout_ms = config.query_timeout.as_millis();
    let mut statements = vec![
        format!("SET statement_timeout = {}", timeout_ms),
        format!("SET lock_timeout = {}", timeout_ms),
        format!(
            "SET application_name = 'piiscan-{}'",
            env!("CARGO_PKG_VERSION")
        ),
    ];

    if config.read_only {
        statements.push("SET default_transaction_read_only = on".to_string());
    }

    statements
}
