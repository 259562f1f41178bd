//! JSON output for command results.

use piiscan_core::Result;
use piiscan_core::error::PiiScanError;
use serde::Serialize;
use std::path::Path;

/// Serializes `value` as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| PiiScanError::Serialization {
        context: "Failed to serialize result as JSON".to_string(),
        source: e,
    })
}

/// Writes `value` as pretty JSON to `output_path`, or to stdout when no
/// path is given.
pub async fn write_json<T: Serialize>(value: &T, output_path: Option<&Path>) -> Result<()> {
    let json_data = to_json(value)?;

    match output_path {
        Some(path) => {
            tokio::fs::write(path, format!("{}\n", json_data))
                .await
                .map_err(|e| PiiScanError::Io {
                    context: format!("Failed to write to {}", path.display()),
                    source: e,
                })?;
            tracing::info!("Output written to {}", path.display());
        }
        None => println!("{}", json_data),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use piiscan_core::{ColumnDescriptor, PiiCategory};

    fn descriptor() -> ColumnDescriptor {
        ColumnDescriptor {
            table: "users".to_string(),
            column: "user_email".to_string(),
            data_type: "TEXT".to_string(),
            pii_type: Some(PiiCategory::Email),
        }
    }

    #[test]
    fn test_descriptor_json_shape() {
        let json = to_json(&vec![descriptor()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["table"], "users");
        assert_eq!(value[0]["column"], "user_email");
        assert_eq!(value[0]["type"], "TEXT");
        assert_eq!(value[0]["pii_type"], "email");
    }

    #[tokio::test]
    async fn test_write_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json(&vec![descriptor()], Some(&path)).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"pii_type\": \"email\""));
        assert!(written.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_write_json_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = write_json(&vec![descriptor()], Some(&path))
            .await
            .unwrap_err();
        assert!(matches!(err, PiiScanError::Io { .. }));
    }
}
