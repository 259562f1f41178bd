//! Database connection configuration.
//!
//! This module provides the `ConnectionConfig` struct for configuring
//! database connections with security-focused defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for database connections.
///
/// # Security
/// This struct intentionally does NOT store passwords or credentials.
/// Credentials stay inside the connection target and are never logged.
///
/// `host`, `port` and `database` describe the target for logs and
/// `Display` only; adapters always connect through the connection string.
///
/// # Example
/// ```rust
/// use piiscan_core::adapters::ConnectionConfig;
/// use std::time::Duration;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_port(5432)
///     .with_database("mydb".to_string())
///     .with_query_timeout(Duration::from_secs(10));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Target host, for display
    pub host: String,
    /// Target port, for display
    pub port: Option<u16>,
    /// Target database name, for display
    pub database: Option<String>,
    /// Connection acquire timeout
    pub connect_timeout: Duration,
    /// Session statement timeout applied by backends that support one
    pub query_timeout: Duration,
    /// Idle connections are closed after this long
    pub idle_timeout: Duration,
    /// Maximum number of connections in pool
    pub max_connections: u32,
    /// Whether to enforce read-only sessions
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            database: None,
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_connections: 10,
            read_only: true,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}{}{})",
            self.host,
            self.port.map_or_else(String::new, |p| format!(":{}", p)),
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{}", db))
        )
    }
}

impl ConnectionConfig {
    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid or unsafe
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_connections == 0 {
            return Err(crate::error::PiiScanError::configuration(
                "max_connections must be greater than 0",
            ));
        }

        if self.max_connections > 100 {
            return Err(crate::error::PiiScanError::configuration(
                "max_connections should not exceed 100 for safety",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::PiiScanError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.query_timeout.is_zero() {
            return Err(crate::error::PiiScanError::configuration(
                "query_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Creates a new connection config with safe defaults.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to set the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Builder method to set the session statement timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Populates host, port and database from a URL-shaped connection target.
    ///
    /// Targets that are not URLs (plain file paths) leave the config unchanged.
    pub fn with_target_details(mut self, connection_string: &str) -> Self {
        if let Ok(url) = url::Url::parse(connection_string) {
            if let Some(host) = url.host_str()
                && !host.is_empty()
            {
                self.host = host.to_string();
            }
            self.port = url.port().or(self.port);
            let database = url.path().trim_start_matches('/');
            if !database.is_empty() {
                self.database = Some(database.to_string());
            }
        }
        self
    }
}
