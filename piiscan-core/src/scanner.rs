//! Content-level PII scanning.
//!
//! Samples a bounded window of rows from a table and reports every
//! (row, column, category) match. Cells without a text form are skipped.

use crate::Result;
use crate::adapters::{DatabaseAdapter, ScanConfig};
use crate::error::PiiScanError;
use crate::models::{Finding, SampleRows};
use crate::patterns::matching_categories;
use crate::query::SampleQueryBuilder;
use std::time::Instant;
use tracing::{debug, trace};

/// Matches sampled rows against the pattern registry.
///
/// At most `window` rows are inspected even if `sample` holds more. Findings
/// follow row order, then column position, then registry order.
pub fn scan_rows(table: &str, sample: &SampleRows, window: usize) -> Vec<Finding> {
    let mut findings = Vec::new();

    for row in sample.rows.iter().take(window) {
        for (column, cell) in sample.columns.iter().zip(row) {
            let Some(text) = cell else {
                trace!("Skipping empty cell in {}.{}", table, column);
                continue;
            };

            findings.extend(matching_categories(text).map(|pii_type| Finding {
                table: table.to_string(),
                column: column.clone(),
                value: text.clone(),
                pii_type,
            }));
        }
    }

    findings
}

/// Samples `table` through `adapter` and returns its findings.
///
/// # Errors
/// Returns a scan error naming `table` if the sample query fails or exceeds
/// `config.query_timeout`, and a configuration error if `config` is out of
/// range or no query can be built for the table name or the adapter's dialect.
pub async fn scan_table(
    adapter: &dyn DatabaseAdapter,
    table: &str,
    config: &ScanConfig,
) -> Result<Vec<Finding>> {
    config.validate()?;
    let started = Instant::now();
    let builder =
        SampleQueryBuilder::from_hint(adapter.dialect_hint())?.with_window(config.sample_window);
    let query = builder.build(table)?;

    let sample = tokio::time::timeout(config.query_timeout, adapter.fetch_sample(table, &query))
        .await
        .map_err(|elapsed| PiiScanError::scan_failed(table, "Sample query timed out", elapsed))??;

    let window = usize::try_from(builder.window()).unwrap_or(usize::MAX);
    let findings = scan_rows(table, &sample, window);

    debug!(
        "Scanned {} rows of table '{}': {} findings in {:?}",
        sample.len().min(window),
        table,
        findings.len(),
        started.elapsed()
    );

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PiiCategory;

    fn sample(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> SampleRows {
        SampleRows {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        }
    }

    #[test]
    fn test_scan_rows_reports_each_match() {
        let rows = sample(
            &["name", "contact"],
            vec![
                vec![Some("Asha"), Some("asha@example.com")],
                vec![Some("Ravi"), Some("9876543210")],
                vec![None, Some("no pii here")],
            ],
        );

        let findings = scan_rows("contacts", &rows, 1000);
        assert_eq!(
            findings,
            vec![
                Finding {
                    table: "contacts".to_string(),
                    column: "contact".to_string(),
                    value: "asha@example.com".to_string(),
                    pii_type: PiiCategory::Email,
                },
                Finding {
                    table: "contacts".to_string(),
                    column: "contact".to_string(),
                    value: "9876543210".to_string(),
                    pii_type: PiiCategory::Phone,
                },
            ]
        );
    }

    #[test]
    fn test_scan_rows_one_cell_many_categories() {
        let rows = sample(
            &["notes"],
            vec![vec![Some("mail a@b.co or call 9876543210, PAN ABCDE1234F")]],
        );

        let categories: Vec<_> = scan_rows("t", &rows, 1000)
            .into_iter()
            .map(|f| f.pii_type)
            .collect();
        assert_eq!(
            categories,
            vec![PiiCategory::Email, PiiCategory::Phone, PiiCategory::Pan]
        );
    }

    #[test]
    fn test_scan_rows_respects_window() {
        let rows = sample(
            &["ssn"],
            (0..5).map(|_| vec![Some("123-45-6789")]).collect(),
        );

        assert_eq!(scan_rows("people", &rows, 3).len(), 3);
        assert!(scan_rows("people", &rows, 0).is_empty());
    }

    #[test]
    fn test_scan_rows_empty_sample() {
        assert!(scan_rows("empty", &SampleRows::default(), 1000).is_empty());
    }

    #[test]
    fn test_twelve_digit_run_is_not_pii() {
        let rows = sample(&["account"], vec![vec![Some("123456789012")]]);
        assert!(scan_rows("accounts", &rows, 1000).is_empty());
    }
}
