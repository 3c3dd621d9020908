//! Submission sinks: where a completed application is durably recorded.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::{SubmissionError, SubmissionRow};

/// Records one submission row. The wizard only ever inserts.
pub trait SubmissionSink {
    fn insert(&mut self, row: &SubmissionRow) -> Result<(), SubmissionError>;
}

/// Inserts rows through a PostgREST-style `POST {url}/rest/v1/{table}`.
pub struct HttpSink {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpSink {
    pub fn new(base_url: &str, table: &str, api_key: impl Into<String>) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SubmissionSink for HttpSink {
    fn insert(&mut self, row: &SubmissionRow) -> Result<(), SubmissionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(SubmissionError::Rejected { status: status.as_u16(), body })
    }
}

/// Appends rows to a CSV ledger, writing the header when the file is new.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every row recorded so far, oldest first. A missing ledger is empty.
    pub fn read_rows(path: &Path) -> Result<Vec<SubmissionRow>, SubmissionError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(path).map_err(|e| SubmissionError::Storage(e.to_string()))?;
        reader
            .deserialize()
            .map(|record| record.map_err(|e| SubmissionError::Storage(e.to_string())))
            .collect()
    }
}

impl SubmissionSink for CsvSink {
    fn insert(&mut self, row: &SubmissionRow) -> Result<(), SubmissionError> {
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SubmissionError::Storage(e.to_string()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(needs_header).from_writer(file);
        writer.serialize(row).map_err(|e| SubmissionError::Storage(e.to_string()))?;
        writer.flush().map_err(|e| SubmissionError::Storage(e.to_string()))
    }
}

/// Keeps rows in memory; can be told to fail. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<SubmissionRow>,
    pub fail_with: Option<SubmissionError>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: SubmissionError) -> Self {
        Self { rows: Vec::new(), fail_with: Some(error) }
    }
}

impl SubmissionSink for MemorySink {
    fn insert(&mut self, row: &SubmissionRow) -> Result<(), SubmissionError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.rows.push(row.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(name: &str) -> SubmissionRow {
        SubmissionRow {
            name: name.to_string(),
            email: "ada@example.com".to_string(),
            phone: "5195550100".to_string(),
            message: "Pre-Approval Application\n\nVehicle Type: suv".to_string(),
            notes: "{\n  \"age\": 35\n}".to_string(),
            status: "new".to_string(),
        }
    }

    #[test]
    fn test_csv_sink_appends_with_single_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leads.csv");
        let mut sink = CsvSink::new(&path);
        sink.insert(&row("Ada Lovelace")).unwrap();
        sink.insert(&row("Grace Hopper")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("name,email,phone,message,notes,status").count(), 1);

        let rows = CsvSink::read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], row("Ada Lovelace"));
        assert_eq!(rows[1].name, "Grace Hopper");
    }

    #[test]
    fn test_read_rows_missing_ledger() {
        let dir = tempdir().unwrap();
        assert!(CsvSink::read_rows(&dir.path().join("none.csv")).unwrap().is_empty());
    }

    #[test]
    fn test_memory_sink_failure_records_nothing() {
        let mut sink = MemorySink::failing(SubmissionError::Transport("offline".into()));
        assert!(sink.insert(&row("Ada")).is_err());
        assert!(sink.rows.is_empty());
    }

    #[test]
    fn test_http_sink_endpoint() {
        let sink = HttpSink::new("https://db.example.com/", "contact_submissions", "key").unwrap();
        assert_eq!(sink.endpoint(), "https://db.example.com/rest/v1/contact_submissions");
    }

    #[test]
    fn test_http_sink_unreachable_is_transport_error() {
        let mut sink = HttpSink::new("http://127.0.0.1:9", "contact_submissions", "key").unwrap();
        assert!(matches!(sink.insert(&row("Ada")), Err(SubmissionError::Transport(_))));
    }
}
