//! Core library for PIIScan.
//!
//! PIIScan finds personally identifiable information in relational
//! databases in two ways: by classifying column names against a fixed set of
//! PII categories, and by sampling a bounded window of rows from each table
//! and matching every cell against the category rules.
//!
//! # Security Guarantees
//! - All database operations are read-only
//! - Credentials are never stored in returned data or logged
//! - Connection strings are sanitized in every error message
//! - At most [`SAMPLE_WINDOW`] rows are read from any table
//!
//! # Architecture
//! - [`patterns`]: the ordered PII category registry
//! - [`query`]: dialect-aware sample query construction
//! - [`adapters`]: per-backend introspection and sampling behind one trait
//! - [`classifier`] and [`scanner`]: schema and content detection
//! - [`orchestrator`]: connection scoping and whole-database scans

pub mod adapters;
pub mod classifier;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod patterns;
pub mod query;
pub mod scanner;

/// Maximum number of rows inspected per table during a content scan.
pub const SAMPLE_WINDOW: u32 = 1000;

// Re-export commonly used types
pub use adapters::{
    AdapterFeature, ConnectionConfig, DatabaseAdapter, ScanConfig, create_adapter,
};
pub use error::{PiiScanError, Result};
pub use logging::init_logging;
pub use models::{
    ColumnDescriptor, ColumnInfo, DatabaseType, Finding, SampleRows, ScanReport, TableFailure,
};
pub use orchestrator::{ConnectionScope, Orchestrator};
pub use patterns::PiiCategory;
pub use query::{Dialect, SampleQueryBuilder, build_sample_query};
