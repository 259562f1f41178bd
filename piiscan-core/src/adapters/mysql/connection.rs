//! MySQL connection pool management and validation.
//!
//! # Security Features
//! - Validates connection string format and parameters
//! - Enforces connection limits to prevent resource exhaustion
//! - Sets appropriate timeouts for all operations

use super::{ConnectionConfig, MySqlAdapter};
use crate::Result;
use crate::error::PiiScanError;
use sqlx::MySqlPool;
use url::Url;

impl MySqlAdapter {
    /// Creates a new MySQL adapter with connection pooling.
    ///
    /// `mariadb://` targets are accepted and connected with the MySQL driver.
    /// The pool connects lazily; use `test_connection` to verify reachability.
    ///
    /// # Errors
    /// Returns error if:
    /// - Connection string format is invalid
    /// - Pool configuration is invalid
    pub async fn new(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        Self::validate_connection_string(connection_string)?;
        let config = config.with_target_details(connection_string);
        let driver_url = normalize_scheme(connection_string);
        let pool = create_mysql_connection_pool(&driver_url, &config)?;

        Ok(Self { pool, config })
    }

    /// Validates connection string format.
    ///
    /// # Errors
    /// Returns error if connection string is invalid
    pub fn validate_connection_string(connection_string: &str) -> Result<()> {
        let url = Url::parse(connection_string).map_err(|e| {
            PiiScanError::configuration(format!("Invalid MySQL connection string format: {}", e))
        })?;

        if !matches!(url.scheme(), "mysql" | "mariadb") {
            return Err(PiiScanError::configuration(
                "Connection string must use mysql:// or mariadb:// scheme",
            ));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(PiiScanError::configuration(
                "Connection string must specify a host",
            ));
        }

        if url.port() == Some(0) {
            return Err(PiiScanError::configuration(
                "Invalid port number: must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Rewrites a `mariadb://` target to the `mysql://` scheme the driver expects.
pub(crate) fn normalize_scheme(connection_string: &str) -> String {
    match connection_string.strip_prefix("mariadb://") {
        Some(rest) => format!("mysql://{}", rest),
        None => connection_string.to_string(),
    }
}

/// Creates a MySQL connection pool with per-session security settings.
fn create_mysql_connection_pool(
    connection_string: &str,
    config: &ConnectionConfig,
) -> Result<MySqlPool> {
    use sqlx::Executor;

    let query_timeout_ms = config.query_timeout.as_millis();
    let read_only = config.read_only;

    sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(config.max_connections.min(100))
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .test_before_acquire(true)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                // Only applies to SELECT statements (MySQL 5.7.8+)
                conn.execute(
                    format!("SET SESSION max_execution_time = {}", query_timeout_ms).as_str(),
                )
                .await?;

                if read_only {
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                }

                conn.execute("SET time_zone = '+00:00'").await?;

                Ok(())
            })
        })
        .connect_lazy(connection_string)
        .map_err(|e| PiiScanError::Connection {
            context: format!(
                "Failed to create MySQL connection pool to {}",
                crate::adapters::redact_database_url(connection_string)
            ),
            source: Box::new(e),
        })
}
