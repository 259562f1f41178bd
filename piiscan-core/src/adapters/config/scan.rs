//! Scan configuration.
//!
//! Controls how many rows are sampled per table, how many tables are scanned
//! concurrently, and how long a single sample query may run.

use crate::SAMPLE_WINDOW;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on concurrent per-table scans.
pub const MAX_CONCURRENCY: usize = 64;

/// Configuration for content scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Maximum rows inspected per table (never above [`SAMPLE_WINDOW`])
    pub sample_window: u32,
    /// Number of tables scanned concurrently in a whole-database scan
    pub max_concurrency: usize,
    /// Timeout for a single table's sample query
    pub query_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sample_window: SAMPLE_WINDOW,
            max_concurrency: 4,
            query_timeout: Duration::from_secs(30),
        }
    }
}

impl ScanConfig {
    /// Creates a new scan config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the sample window.
    pub fn with_sample_window(mut self, rows: u32) -> Self {
        self.sample_window = rows;
        self
    }

    /// Builder method to set the number of concurrent table scans.
    pub fn with_max_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = workers;
        self
    }

    /// Builder method to set the per-query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Validates scan parameters.
    ///
    /// # Errors
    /// Returns error if any value is zero or out of range.
    pub fn validate(&self) -> crate::Result<()> {
        if self.sample_window == 0 || self.sample_window > SAMPLE_WINDOW {
            return Err(crate::error::PiiScanError::configuration(format!(
                "sample_window must be between 1 and {}",
                SAMPLE_WINDOW
            )));
        }

        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(crate::error::PiiScanError::configuration(format!(
                "max_concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            )));
        }

        if self.query_timeout.is_zero() {
            return Err(crate::error::PiiScanError::configuration(
                "query_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
