//! Schema-level PII classification.
//!
//! Labels every column of every table by its name alone. No row data is
//! read; only introspection queries reach the database.

use crate::Result;
use crate::adapters::DatabaseAdapter;
use crate::models::ColumnDescriptor;
use crate::patterns::PiiCategory;
use std::time::Instant;
use tracing::{debug, info};

/// Classifies a column by name.
///
/// Returns the first category, in registry order, whose identifier occurs
/// anywhere in the lower-cased name.
///
/// # Example
/// ```rust
/// use piiscan_core::classifier::classify_column;
/// use piiscan_core::PiiCategory;
///
/// assert_eq!(classify_column("User_Email"), Some(PiiCategory::Email));
/// assert_eq!(classify_column("id"), None);
/// ```
pub fn classify_column(name: &str) -> Option<PiiCategory> {
    let lowered = name.to_lowercase();
    PiiCategory::ALL
        .into_iter()
        .find(|category| lowered.contains(category.as_str()))
}

/// Describes and classifies every column of every table visible to `adapter`.
///
/// Tables follow the adapter's enumeration order and columns their ordinal
/// order; tables without columns contribute nothing.
///
/// # Errors
/// Returns an introspection error if tables or columns cannot be listed.
pub async fn classify(adapter: &dyn DatabaseAdapter) -> Result<Vec<ColumnDescriptor>> {
    let started = Instant::now();
    let tables = adapter.list_tables().await?;
    let mut descriptors = Vec::new();

    for table in &tables {
        let columns = adapter.list_columns(table).await?;
        debug!("Classifying {} columns of table '{}'", columns.len(), table);

        descriptors.extend(columns.into_iter().map(|column| {
            let pii_type = classify_column(&column.name);
            ColumnDescriptor {
                table: table.clone(),
                column: column.name,
                data_type: column.data_type,
                pii_type,
            }
        }));
    }

    let flagged = descriptors.iter().filter(|d| d.pii_type.is_some()).count();
    info!(
        "Classified {} columns across {} tables ({} flagged) in {:?}",
        descriptors.len(),
        tables.len(),
        flagged,
        started.elapsed()
    );

    Ok(descriptors)
}
