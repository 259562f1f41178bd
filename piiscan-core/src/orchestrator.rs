//! Scan orchestration.
//!
//! Every operation opens a [`ConnectionScope`], does its work through the
//! scope's adapter, and closes the scope before returning, on success and
//! on error alike. Whole-database scans fan out over tables with bounded
//! concurrency and record per-table failures instead of aborting.

use crate::Result;
use crate::adapters::{
    AdapterFeature, ConnectionConfig, DatabaseAdapter, ScanConfig, create_adapter,
};
use crate::classifier;
use crate::error::{error_chain, redact_database_url};
use crate::models::{ColumnDescriptor, DatabaseType, Finding, ScanReport, TableFailure};
use crate::scanner;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// An open connection to one scan target, owned by a single request.
pub struct ConnectionScope {
    adapter: Box<dyn DatabaseAdapter>,
}

impl ConnectionScope {
    /// Connects to `target` and verifies the connection.
    ///
    /// # Errors
    /// Returns a configuration or unsupported-feature error for an
    /// unrecognized target, and a connection error if the database cannot be
    /// reached. Nothing is left open on failure.
    pub async fn open(target: &str, config: &ConnectionConfig) -> Result<Self> {
        debug!("Opening connection to {}", redact_database_url(target));
        let adapter = create_adapter(target, config).await?;

        if let Err(e) = adapter.test_connection().await {
            adapter.close().await;
            return Err(e);
        }

        Ok(Self { adapter })
    }

    /// Wraps an adapter that is already connected.
    pub fn from_adapter(adapter: Box<dyn DatabaseAdapter>) -> Self {
        Self { adapter }
    }

    /// The adapter for this scope's connection.
    pub fn adapter(&self) -> &dyn DatabaseAdapter {
        self.adapter.as_ref()
    }

    /// Closes the connection pool.
    pub async fn close(self) {
        self.adapter.close().await;
        debug!("Closed {} connection", self.adapter.database_type());
    }
}

impl std::fmt::Debug for ConnectionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionScope")
            .field("database_type", &self.adapter.database_type())
            .field("config", &self.adapter.connection_config())
            .finish()
    }
}

/// Coordinates classification and scanning against a target database.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    scan: ScanConfig,
    connection: ConnectionConfig,
}

impl Orchestrator {
    /// Creates an orchestrator; database sessions share the scan's query
    /// timeout.
    ///
    /// # Errors
    /// Returns a configuration error if `scan` is out of range.
    pub fn new(scan: ScanConfig) -> Result<Self> {
        scan.validate()?;
        let connection = ConnectionConfig::default().with_query_timeout(scan.query_timeout);
        Ok(Self { scan, connection })
    }

    /// Builder method to replace the connection configuration.
    pub fn with_connection_config(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    /// Scan settings applied to every operation.
    pub fn scan_config(&self) -> &ScanConfig {
        &self.scan
    }

    /// Connection settings used when opening a scope.
    pub fn connection_config(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// Connects to `target` and reports which backend answered.
    ///
    /// # Errors
    /// Returns an error if the target is unrecognized or unreachable.
    pub async fn test_connection(&self, target: &str) -> Result<DatabaseType> {
        let scope = ConnectionScope::open(target, &self.connection).await?;
        let database_type = scope.adapter().database_type();
        scope.close().await;
        Ok(database_type)
    }

    /// Classifies every column of every table in `target` by name.
    ///
    /// # Errors
    /// Returns a connection or introspection error.
    pub async fn classify_metadata(&self, target: &str) -> Result<Vec<ColumnDescriptor>> {
        let scope = ConnectionScope::open(target, &self.connection).await?;
        let result = classify_metadata_with_adapter(scope.adapter()).await;
        scope.close().await;
        result
    }

    /// Scans every table in `target`.
    ///
    /// # Errors
    /// Returns a connection error, or an introspection error if the tables
    /// cannot be listed. Individual table failures are reported in the
    /// [`ScanReport`].
    pub async fn scan_all(&self, target: &str) -> Result<ScanReport> {
        self.scan_all_with_cancel(target, CancellationToken::new())
            .await
    }

    /// Scans every table in `target` until finished or `cancel` fires.
    ///
    /// # Errors
    /// Same as [`Orchestrator::scan_all`].
    pub async fn scan_all_with_cancel(
        &self,
        target: &str,
        cancel: CancellationToken,
    ) -> Result<ScanReport> {
        let scope = ConnectionScope::open(target, &self.connection).await?;
        let result = scan_all_with_adapter(scope.adapter(), &self.scan, &cancel).await;
        scope.close().await;
        result
    }

    /// Scans a single table of `target`.
    ///
    /// # Errors
    /// Returns a scan error if the table does not exist or cannot be read.
    pub async fn scan_one(&self, target: &str, table: &str) -> Result<Vec<Finding>> {
        let scope = ConnectionScope::open(target, &self.connection).await?;
        let result = scan_one_with_adapter(scope.adapter(), table, &self.scan).await;
        scope.close().await;
        result
    }
}

/// Classifies every column reachable through an open adapter.
///
/// # Errors
/// Returns an introspection error if tables or columns cannot be listed.
pub async fn classify_metadata_with_adapter(
    adapter: &dyn DatabaseAdapter,
) -> Result<Vec<ColumnDescriptor>> {
    info!("Starting schema classification on {}", adapter.database_type());
    classifier::classify(adapter).await
}

/// Scans one table through an open adapter.
///
/// # Errors
/// Returns a scan error naming `table` on failure.
pub async fn scan_one_with_adapter(
    adapter: &dyn DatabaseAdapter,
    table: &str,
    config: &ScanConfig,
) -> Result<Vec<Finding>> {
    info!("Scanning table '{}' on {}", table, adapter.database_type());
    let findings = scanner::scan_table(adapter, table, config).await?;
    info!("Table '{}' produced {} findings", table, findings.len());
    Ok(findings)
}

/// Scans queued behind a single connection would spend their query timeout
/// waiting for it, so such adapters get one scan at a time.
fn effective_concurrency(adapter: &dyn DatabaseAdapter, config: &ScanConfig) -> usize {
    if adapter.supports_feature(AdapterFeature::ConnectionPooling) {
        config.max_concurrency
    } else {
        1
    }
}

/// Scans every table through an open adapter.
///
/// At most `config.max_concurrency` tables are sampled at once, and only one
/// when the adapter has a single connection (no `ConnectionPooling`). A table
/// whose scan fails is recorded in `failures` and the rest continue. When
/// `cancel` fires no further tables are dispatched, in-flight scans are
/// abandoned, and every table without a result is listed in
/// `skipped_tables`. Findings are ordered by table enumeration order.
///
/// # Errors
/// Returns a configuration error for an invalid `config`, or an
/// introspection error if the tables cannot be listed.
pub async fn scan_all_with_adapter(
    adapter: &dyn DatabaseAdapter,
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<ScanReport> {
    config.validate()?;
    let started = Instant::now();
    let started_at = chrono::Utc::now();
    let scan_id = uuid::Uuid::new_v4();

    let tables = adapter.list_tables().await?;
    let concurrency = effective_concurrency(adapter, config);
    info!(
        "Starting scan {} of {} tables on {} (concurrency {})",
        scan_id,
        tables.len(),
        adapter.database_type(),
        concurrency
    );

    let mut completed: Vec<(usize, &String, Result<Vec<Finding>>)> =
        Vec::with_capacity(tables.len());
    let mut cancelled = false;
    {
        let mut results = stream::iter(tables.iter().enumerate())
            .map(|(index, table)| async move {
                (index, table, scanner::scan_table(adapter, table, config).await)
            })
            .buffer_unordered(concurrency);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = results.next() => match next {
                    Some(result) => completed.push(result),
                    None => break,
                },
            }
        }
    }

    completed.sort_by_key(|(index, _, _)| *index);

    let finished: BTreeSet<usize> = completed.iter().map(|(index, _, _)| *index).collect();
    let skipped_tables: Vec<String> = tables
        .iter()
        .enumerate()
        .filter(|(index, _)| !finished.contains(index))
        .map(|(_, table)| table.clone())
        .collect();

    let tables_scanned = completed.len();
    let mut findings = Vec::new();
    let mut failures = Vec::new();
    for (_, table, result) in completed {
        match result {
            Ok(table_findings) => findings.extend(table_findings),
            Err(e) => {
                let reason = error_chain(&e);
                warn!("Scan of table '{}' failed: {}", table, reason);
                failures.push(TableFailure {
                    table: table.clone(),
                    reason,
                });
            }
        }
    }

    if cancelled {
        warn!(
            "Scan {} cancelled; {} tables skipped",
            scan_id,
            skipped_tables.len()
        );
    }
    info!(
        "Scan {} finished: {} tables, {} findings, {} failures in {:?}",
        scan_id,
        tables_scanned,
        findings.len(),
        failures.len(),
        started.elapsed()
    );

    Ok(ScanReport {
        scan_id,
        database_type: adapter.database_type(),
        started_at,
        completed_at: chrono::Utc::now(),
        tables_scanned,
        findings,
        failures,
        cancelled,
        skipped_tables,
    })
}
