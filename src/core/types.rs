//! Core type definitions used throughout MalDetect.

use crate::core::error::ScanFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A file selected for upload.
///
/// Two items with the same `(name, size)` pair are the same selection,
/// whatever their paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadItem {
    /// File name as sent to the server
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Where the bytes live; read only at upload time
    pub path: PathBuf,
}

impl UploadItem {
    /// Create a new upload item.
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            path: path.into(),
        }
    }

    /// Build an item from a path on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, metadata.len(), path))
    }

    /// Whether this item identifies the same selection as `other`.
    pub fn same_identity(&self, other: &UploadItem) -> bool {
        self.name == other.name && self.size == other.size
    }
}

impl PartialEq for UploadItem {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Eq for UploadItem {}

/// Model family the server should use for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Random forest (server default)
    Rf,
    /// Decision tree
    Dt,
    /// Support vector machine
    Svm,
    /// Naive Bayes
    Nb,
    /// Multi-layer perceptron
    Mlp,
}

impl Algorithm {
    /// Get the selector sent in the `algo` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Rf => "rf",
            Algorithm::Dt => "dt",
            Algorithm::Svm => "svm",
            Algorithm::Nb => "nb",
            Algorithm::Mlp => "mlp",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict attached to a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanLabel {
    /// Model considers the file clean
    Benign,
    /// Model considers the file malicious
    Malicious,
    /// The file could not be scanned
    Error,
}

impl ScanLabel {
    /// Get the wire/export representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanLabel::Benign => "benign",
            ScanLabel::Malicious => "malicious",
            ScanLabel::Error => "error",
        }
    }
}

impl std::fmt::Display for ScanLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanLabel::Benign => write!(f, "Benign"),
            ScanLabel::Malicious => write!(f, "Malicious"),
            ScanLabel::Error => write!(f, "Error"),
        }
    }
}

/// Result of scanning one upload item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// File name
    pub filename: String,
    /// File size in bytes
    pub size: u64,
    /// Verdict
    pub label: ScanLabel,
    /// Probability of being malicious (0.0 - 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_malicious: Option<f64>,
    /// Algorithm the server used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Failure message for `error` outcomes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Any other fields the server returned for this file
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ScanOutcome {
    /// Create a successful outcome for `item`.
    pub fn scanned(item: &UploadItem, label: ScanLabel, confidence_malicious: Option<f64>) -> Self {
        Self {
            filename: item.name.clone(),
            size: item.size,
            label,
            confidence_malicious,
            algorithm: None,
            error: None,
            extra: BTreeMap::new(),
        }
    }

    /// Create an `error` outcome recording why `item` could not be scanned.
    pub fn failed(item: &UploadItem, failure: &ScanFailure) -> Self {
        Self {
            filename: item.name.clone(),
            size: item.size,
            label: ScanLabel::Error,
            confidence_malicious: None,
            algorithm: None,
            error: Some(failure.to_string()),
            extra: BTreeMap::new(),
        }
    }

    /// Set the algorithm.
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    /// Whether the outcome is a detection.
    pub fn is_malicious(&self) -> bool {
        self.label == ScanLabel::Malicious
    }

    /// Whether the outcome records a failure.
    pub fn is_error(&self) -> bool {
        self.label == ScanLabel::Error || self.error.is_some()
    }

    /// Confidence rendered as a percentage with one decimal, e.g. `91.0%`.
    pub fn confidence_percent(&self) -> Option<String> {
        self.confidence_malicious
            .map(|c| format!("{:.1}%", c * 100.0))
    }
}

/// Lifecycle of the bulk-scan pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    /// No run has started yet
    Idle,
    /// A run is iterating the queue
    Running,
    /// The last run processed every item
    Completed,
    /// The last run stopped on an error outside the per-item boundary
    Aborted,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "Idle"),
            PipelineState::Running => write!(f, "Running"),
            PipelineState::Completed => write!(f, "Completed"),
            PipelineState::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Finished bulk-scan run, handed to report generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier
    pub run_id: String,
    /// Algorithm requested for every upload
    pub algorithm: Option<Algorithm>,
    /// Final pipeline state
    pub state: PipelineState,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run ended
    pub finished_at: DateTime<Utc>,
    /// Items processed
    pub processed: u64,
    /// Items labeled malicious
    pub threats: u64,
    /// Items that failed to scan
    pub errors: u64,
    /// Result log in queue order
    pub outcomes: Vec<ScanOutcome>,
}

impl RunReport {
    /// Run duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_item_identity() {
        let a = UploadItem::new("a.exe", 1024, "/one/a.exe");
        let b = UploadItem::new("a.exe", 1024, "/two/a.exe");
        let c = UploadItem::new("a.exe", 2048, "/one/a.exe");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_label_serde() {
        let json = serde_json::to_string(&ScanLabel::Malicious).unwrap();
        assert_eq!(json, "\"malicious\"");
        let label: ScanLabel = serde_json::from_str("\"benign\"").unwrap();
        assert_eq!(label, ScanLabel::Benign);
    }

    #[test]
    fn test_failed_outcome() {
        let item = UploadItem::new("b.txt", 512, "b.txt");
        let outcome = ScanOutcome::failed(&item, &ScanFailure::Transport { status: 500 });
        assert_eq!(outcome.label, ScanLabel::Error);
        assert_eq!(outcome.error.as_deref(), Some("HTTP 500"));
        assert_eq!(outcome.size, 512);
        assert!(outcome.is_error());
        assert!(outcome.confidence_percent().is_none());
    }

    #[test]
    fn test_confidence_percent() {
        let item = UploadItem::new("a.exe", 1024, "a.exe");
        let outcome = ScanOutcome::scanned(&item, ScanLabel::Malicious, Some(0.91));
        assert_eq!(outcome.confidence_percent().as_deref(), Some("91.0%"));
        assert!(outcome.is_malicious());
    }

    #[test]
    fn test_outcome_json_omits_empty_fields() {
        let item = UploadItem::new("a.exe", 1024, "a.exe");
        let outcome = ScanOutcome::scanned(&item, ScanLabel::Benign, Some(0.1)).with_algorithm("rf");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["label"], "benign");
        assert_eq!(value["algorithm"], "rf");
        assert!(value.get("error").is_none());
    }
}
