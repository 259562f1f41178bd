//! In-process adapter for exercising scanning logic without a database.

#![allow(dead_code)]

use async_trait::async_trait;
use piiscan_core::adapters::{AdapterFeature, ConnectionConfig, DatabaseAdapter};
use piiscan_core::error::PiiScanError;
use piiscan_core::{ColumnInfo, DatabaseType, Result, SampleRows};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// How a fake table answers a sample query.
#[derive(Clone)]
pub enum Behavior {
    Rows,
    Denied,
    Hang,
    /// Fires the token, then never answers
    CancelAndHang(CancellationToken),
}

#[derive(Clone)]
pub struct FakeTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub behavior: Behavior,
}

impl FakeTable {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            behavior: Behavior::Rows,
        }
    }

    pub fn row(mut self, cells: &[Option<&str>]) -> Self {
        self.rows
            .push(cells.iter().map(|c| c.map(str::to_string)).collect());
        self
    }

    pub fn repeat_row(mut self, cells: &[Option<&str>], times: usize) -> Self {
        for _ in 0..times {
            self = self.row(cells);
        }
        self
    }

    pub fn behaving(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

pub struct FakeAdapter {
    pub tables: Vec<FakeTable>,
    pub dialect: &'static str,
    pub queries: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<AtomicBool>,
    /// Advertises `ConnectionPooling` when set
    pub pooled: bool,
    in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl FakeAdapter {
    pub fn new(tables: Vec<FakeTable>) -> Self {
        Self {
            tables,
            dialect: "sqlite",
            queries: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            pooled: false,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn pooled(mut self) -> Self {
        self.pooled = true;
        self
    }

    /// Highest number of sample queries that were running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn with_dialect(mut self, dialect: &'static str) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn table(&self, name: &str) -> Option<&FakeTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

fn denied(table: &str) -> PiiScanError {
    PiiScanError::scan_failed(
        table,
        "Sample query failed",
        std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("permission denied for table {}", table),
        ),
    )
}

#[async_trait]
impl DatabaseAdapter for FakeAdapter {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let table = self.table(table).ok_or_else(|| {
            PiiScanError::introspection_failed(
                "Failed to enumerate columns",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such table"),
            )
        })?;
        Ok(table
            .columns
            .iter()
            .map(|c| ColumnInfo::new(c.as_str(), "TEXT"))
            .collect())
    }

    async fn fetch_sample(&self, table: &str, query: &str) -> Result<SampleRows> {
        self.queries.lock().unwrap().push(query.to_string());

        let Some(fake) = self.table(table) else {
            return Err(PiiScanError::scan_failed(
                table,
                "Sample query failed",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such table"),
            ));
        };

        match &fake.behavior {
            Behavior::Rows => {
                let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(running, Ordering::SeqCst);
                // Let sibling scans start before this one answers
                for _ in 0..4 {
                    tokio::task::yield_now().await;
                }
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                Ok(SampleRows {
                    columns: fake.columns.clone(),
                    rows: fake.rows.clone(),
                })
            }
            Behavior::Denied => Err(denied(table)),
            Behavior::Hang => std::future::pending().await,
            Behavior::CancelAndHang(token) => {
                token.cancel();
                std::future::pending().await
            }
        }
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn dialect_hint(&self) -> &'static str {
        self.dialect
    }

    fn supports_feature(&self, feature: AdapterFeature) -> bool {
        match feature {
            AdapterFeature::Introspection | AdapterFeature::DataSampling => true,
            AdapterFeature::ConnectionPooling => self.pooled,
            _ => false,
        }
    }

    fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::default()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
