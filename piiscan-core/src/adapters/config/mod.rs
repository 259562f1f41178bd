//! Configuration types for database adapters and scans.
//!
//! - `ConnectionConfig`: pool sizing, timeouts, read-only enforcement
//! - `ScanConfig`: sample window, fan-out, and per-query timeout
//!
//! # Security
//! These configuration structs intentionally do NOT store passwords or credentials.

mod connection;
mod scan;

pub use connection::ConnectionConfig;
pub use scan::{MAX_CONCURRENCY, ScanConfig};
