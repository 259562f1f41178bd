//! Data models for classification and scan results.
//!
//! Everything here is transient: built during one request, serialized for the
//! caller, and dropped.

use crate::patterns::PiiCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Backend identifier used to select SQL dialect details.
    pub const fn dialect_hint(self) -> &'static str {
        match self {
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
            Self::SQLite => "sqlite",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PostgreSQL => write!(f, "PostgreSQL"),
            Self::MySQL => write!(f, "MySQL"),
            Self::SQLite => write!(f, "SQLite"),
        }
    }
}

/// A column as reported by database introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type, verbatim from the database
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column description.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Rows fetched by a sample query, reduced to the text form of each cell.
///
/// `None` marks SQL NULL or a value without a text representation (for
/// example a BLOB); such cells are never matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRows {
    /// Result-set column names, in position order
    pub columns: Vec<String>,
    /// One entry per row, aligned with `columns`
    pub rows: Vec<Vec<Option<String>>>,
}

impl SampleRows {
    /// Number of rows fetched.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows were fetched.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Schema-level classification of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub table: String,
    pub column: String,
    #[serde(rename = "type")]
    pub data_type: String,
    /// Category inferred from the column name, if any
    pub pii_type: Option<PiiCategory>,
}

/// A single PII match inside a sampled cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub table: String,
    pub column: String,
    /// The raw cell text that matched
    pub value: String,
    pub pii_type: PiiCategory,
}

/// A table that could not be scanned during a whole-database scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFailure {
    pub table: String,
    pub reason: String,
}

/// Result of scanning every table in a database.
///
/// Scans are best effort: `findings` holds everything that was collected,
/// `failures` lists the tables whose scan failed, and `skipped_tables` the
/// tables that were never scanned because the operation was cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: uuid::Uuid,
    pub database_type: DatabaseType,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    /// Number of tables whose scan finished, successfully or not
    pub tables_scanned: usize,
    /// Findings in table-enumeration order
    pub findings: Vec<Finding>,
    pub failures: Vec<TableFailure>,
    pub cancelled: bool,
    pub skipped_tables: Vec<String>,
}

impl ScanReport {
    /// Returns true if every table was scanned without error.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failures.is_empty() && self.skipped_tables.is_empty()
    }

    /// Number of findings per category, in registry order.
    pub fn category_counts(&self) -> BTreeMap<PiiCategory, usize> {
        let mut counts = BTreeMap::new();
        for finding in &self.findings {
            counts
                .entry(finding.pii_type)
                .and_modify(|n: &mut usize| *n = n.saturating_add(1))
                .or_insert(1);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(table: &str, category: PiiCategory) -> Finding {
        Finding {
            table: table.to_string(),
            column: "c".to_string(),
            value: "v".to_string(),
            pii_type: category,
        }
    }

    fn report(findings: Vec<Finding>) -> ScanReport {
        ScanReport {
            scan_id: uuid::Uuid::new_v4(),
            database_type: DatabaseType::SQLite,
            started_at: chrono::Utc::now(),
            completed_at: chrono::Utc::now(),
            tables_scanned: 2,
            findings,
            failures: Vec::new(),
            cancelled: false,
            skipped_tables: Vec::new(),
        }
    }

    #[test]
    fn test_column_descriptor_json_shape() {
        let descriptor = ColumnDescriptor {
            table: "users".to_string(),
            column: "id".to_string(),
            data_type: "INTEGER".to_string(),
            pii_type: None,
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"table": "users", "column": "id", "type": "INTEGER", "pii_type": null})
        );
    }

    #[test]
    fn test_finding_json_shape() {
        let json = serde_json::to_value(finding("users", PiiCategory::Email)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"table": "users", "column": "c", "value": "v", "pii_type": "email"})
        );
    }

    #[test]
    fn test_report_category_counts() {
        let report = report(vec![
            finding("users", PiiCategory::Phone),
            finding("users", PiiCategory::Email),
            finding("orders", PiiCategory::Email),
        ]);

        let counts = report.category_counts();
        assert_eq!(counts.get(&PiiCategory::Email), Some(&2));
        assert_eq!(counts.get(&PiiCategory::Phone), Some(&1));
        assert_eq!(counts.keys().next(), Some(&PiiCategory::Email));

        assert!(report.is_complete());
    }

    #[test]
    fn test_report_incomplete_on_failure() {
        let mut report = report(Vec::new());
        report.failures.push(TableFailure {
            table: "audit".to_string(),
            reason: "permission denied".to_string(),
        });
        assert!(!report.is_complete());
    }

    #[test]
    fn test_dialect_hints() {
        assert_eq!(DatabaseType::PostgreSQL.dialect_hint(), "postgresql");
        assert_eq!(DatabaseType::MySQL.dialect_hint(), "mysql");
        assert_eq!(DatabaseType::SQLite.to_string(), "SQLite");
    }
}
