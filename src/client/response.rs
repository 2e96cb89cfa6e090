//! Wire formats of the scanning server and their classification.
//!
//! The server's JSON is loosely shaped (errors and results share one
//! object), so every reply is turned into either a typed success or a
//! [`ScanFailure`] here, before anything else looks at it.

use crate::core::error::ScanFailure;
use crate::core::types::{ScanLabel, ScanOutcome, UploadItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /api/bulk-scan`.
#[derive(Debug, Deserialize)]
struct BulkScanReply {
    #[serde(default)]
    results: Vec<RemoteResult>,
    #[serde(default)]
    error: Option<String>,
}

/// One entry of `results`.
#[derive(Debug, Deserialize)]
struct RemoteResult {
    filename: String,
    label: ScanLabel,
    #[serde(default)]
    confidence_malicious: Option<f64>,
    #[serde(default, alias = "algo")]
    algorithm: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// Only the `error` field, for non-2xx bodies.
#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: Option<String>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Classify a bulk-scan reply for `item`.
///
/// Order matters: the HTTP status is checked before the body, so a 500
/// carrying `{"error": ...}` is still reported as `HTTP 500`.
pub fn classify_bulk_reply(
    status: u16,
    body: &str,
    item: &UploadItem,
) -> Result<ScanOutcome, ScanFailure> {
    if !is_success(status) {
        return Err(ScanFailure::Transport { status });
    }

    let reply: BulkScanReply = serde_json::from_str(body)
        .map_err(|e| ScanFailure::MalformedResponse(e.to_string()))?;

    if let Some(message) = reply.error {
        return Err(ScanFailure::ServerReported(message));
    }

    let remote = reply
        .results
        .into_iter()
        .find(|r| r.filename == item.name)
        .ok_or_else(|| ScanFailure::MissingResult {
            filename: item.name.clone(),
        })?;

    let mut extra = remote.extra;
    // Local identity wins over anything the server echoed back.
    extra.remove("size");

    Ok(ScanOutcome {
        filename: item.name.clone(),
        size: item.size,
        label: remote.label,
        confidence_malicious: remote.confidence_malicious,
        algorithm: remote.algorithm,
        error: None,
        extra,
    })
}

/// Model that produced a single-file verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub algo: Option<String>,
}

/// Server-side statistics about the uploaded bytes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileStats {
    pub sha256: String,
    pub file_size: f64,
    pub entropy: f64,
    #[serde(default)]
    pub strings_mean_len: Option<f64>,
    #[serde(default)]
    pub strings_std_len: Option<f64>,
    #[serde(default)]
    pub strings_count: Option<f64>,
}

/// Reply of `POST /api/scan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleScanReport {
    pub label: ScanLabel,
    pub confidence_malicious: f64,
    #[serde(default)]
    pub model: ModelInfo,
    #[serde(default)]
    pub stats: Option<FileStats>,
    #[serde(default)]
    pub algo: Option<String>,
    #[serde(default)]
    pub feature_vector_length: Option<u64>,
}

impl SingleScanReport {
    /// Confidence as a percentage, two decimals.
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence_malicious * 100.0)
    }

    /// Risk band shown next to the probability bar.
    pub fn risk(&self) -> RiskLevel {
        RiskLevel::from_confidence(self.confidence_malicious)
    }
}

/// Coarse banding of the malicious probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `>= 60%` is high, `>= 30%` is medium.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.6 {
            RiskLevel::High
        } else if confidence >= 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Classify a single-scan reply.
///
/// Unlike bulk scans the server's own message is preferred on failure,
/// falling back to the status code when the body has none.
pub fn classify_single_reply(status: u16, body: &str) -> Result<SingleScanReport, ScanFailure> {
    if !is_success(status) {
        let message = serde_json::from_str::<ErrorReply>(body)
            .ok()
            .and_then(|r| r.error);
        return Err(match message {
            Some(message) => ScanFailure::ServerReported(message),
            None => ScanFailure::Transport { status },
        });
    }

    if let Ok(ErrorReply {
        error: Some(message),
    }) = serde_json::from_str::<ErrorReply>(body)
    {
        return Err(ScanFailure::ServerReported(message));
    }

    serde_json::from_str(body).map_err(|e| ScanFailure::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, size: u64) -> UploadItem {
        UploadItem::new(name, size, name)
    }

    #[test]
    fn test_bulk_success_merges_local_identity() {
        let body = r#"{"results": [
            {"filename": "other.bin", "label": "benign", "confidence_malicious": 0.1},
            {"filename": "a.exe", "label": "malicious", "confidence_malicious": 0.91,
             "algorithm": "rf", "size": 1, "sha256": "abc"}
        ]}"#;

        let outcome = classify_bulk_reply(200, body, &item("a.exe", 1024)).unwrap();
        assert_eq!(outcome.filename, "a.exe");
        assert_eq!(outcome.size, 1024);
        assert_eq!(outcome.label, ScanLabel::Malicious);
        assert_eq!(outcome.confidence_malicious, Some(0.91));
        assert_eq!(outcome.algorithm.as_deref(), Some("rf"));
        assert_eq!(outcome.extra["sha256"], "abc");
        assert!(!outcome.extra.contains_key("size"));
    }

    #[test]
    fn test_bulk_algo_alias() {
        let body = r#"{"results": [{"filename": "a", "label": "benign", "algo": "svm"}]}"#;
        let outcome = classify_bulk_reply(200, body, &item("a", 3)).unwrap();
        assert_eq!(outcome.algorithm.as_deref(), Some("svm"));
    }

    #[test]
    fn test_bulk_non_2xx_is_transport() {
        let err = classify_bulk_reply(500, r#"{"error": "boom"}"#, &item("b.txt", 512)).unwrap_err();
        assert_eq!(err, ScanFailure::Transport { status: 500 });
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_bulk_error_field_is_server_reported() {
        let err = classify_bulk_reply(200, r#"{"error": "Empty file"}"#, &item("e", 0)).unwrap_err();
        assert_eq!(err, ScanFailure::ServerReported("Empty file".to_string()));
    }

    #[test]
    fn test_bulk_missing_result() {
        let body = r#"{"results": [{"filename": "x", "label": "benign"}]}"#;
        let err = classify_bulk_reply(200, body, &item("y", 1)).unwrap_err();
        assert_eq!(err.kind(), "missing_result");
    }

    #[test]
    fn test_bulk_malformed() {
        let err = classify_bulk_reply(200, "<html>", &item("y", 1)).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn test_single_success() {
        let body = r#"{
            "label": "malicious", "confidence_malicious": 0.734,
            "model": {"name": "RandomForestClassifier", "version": "1.0", "algo": "rf"},
            "algo": "rf", "feature_vector_length": 261,
            "stats": {"sha256": "deadbeef", "file_size": 2048.0, "entropy": 7.2,
                      "strings_mean_len": 8.0, "strings_std_len": 2.0, "strings_count": 40.0}
        }"#;
        let report = classify_single_reply(200, body).unwrap();
        assert_eq!(report.label, ScanLabel::Malicious);
        assert_eq!(report.confidence_percent(), "73.40%");
        assert_eq!(report.risk(), RiskLevel::High);
        assert_eq!(report.model.version.as_deref(), Some("1.0"));
        assert_eq!(report.stats.unwrap().sha256, "deadbeef");
    }

    #[test]
    fn test_single_error_prefers_message() {
        let err = classify_single_reply(400, r#"{"error": "No file selected"}"#).unwrap_err();
        assert_eq!(err, ScanFailure::ServerReported("No file selected".to_string()));

        let err = classify_single_reply(502, "Bad Gateway").unwrap_err();
        assert_eq!(err, ScanFailure::Transport { status: 502 });
    }

    #[test]
    fn test_risk_bands() {
        assert_eq!(RiskLevel::from_confidence(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_confidence(0.3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_confidence(0.29), RiskLevel::Low);
    }
}
