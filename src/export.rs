//! Tabular export of one run's records
//!
//! The run driver hands each batch to an [`Exporter`]; the bundled
//! implementation writes one CSV file per run, named by a UTC timestamp, so
//! repeated chunked invocations never clobber each other's output.

use crate::error::{Error, Result};
use crate::types::CandidateRecord;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Characters that are invalid in spreadsheet column names
const INVALID_COLUMN_CHARS: &str = r#"[\\/?"*:\[\]]"#;

/// Maximum length of a sanitized column name
const MAX_COLUMN_LEN: usize = 31;

/// Receives the batch of records collected by one run.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Write one run's batch, returning the path of the file created, or
    /// `None` when the batch was empty and no file was produced.
    async fn export(&self, batch: &[CandidateRecord]) -> Result<Option<PathBuf>>;
}

/// CSV exporter writing `candidates_<timestamp>.csv` files into a directory.
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    /// Create an exporter targeting the given directory (created on demand).
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl Exporter for CsvExporter {
    async fn export(&self, batch: &[CandidateRecord]) -> Result<Option<PathBuf>> {
        if batch.is_empty() {
            info!("no data for this run, skipping export file creation");
            return Ok(None);
        }

        fs::create_dir_all(&self.output_dir)?;

        let invalid = Regex::new(INVALID_COLUMN_CHARS)
            .map_err(|e| Error::Export(format!("invalid column pattern: {e}")))?;

        // Column union across the batch, in first-seen order
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for record in batch {
            for key in record.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("candidates_{timestamp}.csv"));

        let mut writer = csv::Writer::from_path(&path)?;
        let header: Vec<String> = columns
            .iter()
            .map(|name| sanitize_column_name(&invalid, name))
            .collect();
        writer.write_record(&header)?;

        for record in batch {
            let row: Vec<String> = columns.iter().map(|name| cell(record.get(name))).collect();
            writer.write_record(&row)?;
        }
        writer.flush()?;

        info!(
            path = %path.display(),
            rows = batch.len(),
            "created export file for this run"
        );
        Ok(Some(path))
    }
}

/// Replace invalid characters with `_`, truncate to the column length limit
/// and trim surrounding whitespace.
pub fn sanitize_column_name(invalid: &Regex, name: &str) -> String {
    let cleaned = invalid.replace_all(name, "_");
    let truncated: String = cleaned.chars().take(MAX_COLUMN_LEN).collect();
    truncated.trim().to_string()
}

// Missing fields and nulls become empty cells; strings stay bare; any other
// scalar renders through its JSON display form
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: serde_json::Value) -> CandidateRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn invalid() -> Regex {
        Regex::new(INVALID_COLUMN_CHARS).unwrap()
    }

    #[test]
    fn sanitizer_replaces_invalid_characters() {
        assert_eq!(
            sanitize_column_name(&invalid(), r#"Rate: [hourly/daily]?"#),
            "Rate_ _hourly_daily__"
        );
    }

    #[test]
    fn sanitizer_truncates_to_31_chars_then_trims() {
        let long = "a".repeat(40);
        assert_eq!(sanitize_column_name(&invalid(), &long).len(), 31);

        // Truncation happens before trimming
        let padded = format!("{:<31}x", "name");
        let cleaned = sanitize_column_name(&invalid(), &padded);
        assert_eq!(cleaned, "name");
    }

    #[tokio::test]
    async fn empty_batch_produces_no_file() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path());

        let path = exporter.export(&[]).await.unwrap();
        assert_eq!(path, None);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn writes_one_timestamped_csv_per_run() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path());

        let batch = vec![record(json!({"Candidate Serial": "A1", "Name": "Ada"}))];
        let path = exporter.export(&batch).await.unwrap().unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("candidates_"), "got {name}");
        assert!(name.ends_with(".csv"));

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Candidate Serial,Name"));
        assert_eq!(lines.next(), Some("A1,Ada"));
    }

    #[tokio::test]
    async fn header_is_the_column_union_in_first_seen_order() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path());

        let batch = vec![
            record(json!({"Candidate Serial": "A", "Name": "Ada"})),
            record(json!({"Candidate Serial": "B", "Email": "b@example.com"})),
        ];
        let path = exporter.export(&batch).await.unwrap().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Candidate Serial,Name,Email"));
        assert_eq!(lines.next(), Some("A,Ada,"));
        assert_eq!(lines.next(), Some("B,,b@example.com"));
    }

    #[tokio::test]
    async fn nulls_and_scalars_render_as_cells() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path());

        let batch = vec![record(json!({
            "id": "X",
            "Score": 87,
            "Active": true,
            "Middle Name": null
        }))];
        let path = exporter.export(&batch).await.unwrap().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().contains("X,87,true,"));
    }

    #[tokio::test]
    async fn output_directory_is_created_on_demand() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("exports/runs");
        let exporter = CsvExporter::new(&nested);

        let batch = vec![record(json!({"id": "A"}))];
        let path = exporter.export(&batch).await.unwrap().unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
