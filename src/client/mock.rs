//! Scripted scan client for tests and offline dry runs.

use super::ScanClient;
use crate::core::error::ScanFailure;
use crate::core::types::{Algorithm, ScanLabel, ScanOutcome, UploadItem};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// What the mock answers for a given filename.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Scan succeeds with this label and confidence
    Verdict { label: ScanLabel, confidence: f64 },
    /// Scan fails
    Fail(ScanFailure),
}

/// Client that answers from a filename-keyed script.
///
/// Unscripted files are reported benign with zero confidence.
pub struct MockScanClient {
    replies: HashMap<String, MockReply>,
    latency: Duration,
    calls: Mutex<Vec<String>>,
}

impl MockScanClient {
    /// Create a new mock client with an empty script.
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script a verdict for `filename`.
    pub fn with_verdict(mut self, filename: &str, label: ScanLabel, confidence: f64) -> Self {
        self.replies
            .insert(filename.to_string(), MockReply::Verdict { label, confidence });
        self
    }

    /// Script a failure for `filename`.
    pub fn with_failure(mut self, filename: &str, failure: ScanFailure) -> Self {
        self.replies
            .insert(filename.to_string(), MockReply::Fail(failure));
        self
    }

    /// Simulate network latency on every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Filenames scanned so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockScanClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScanClient for MockScanClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn scan_one(
        &self,
        item: &UploadItem,
        algorithm: Option<Algorithm>,
    ) -> Result<ScanOutcome, ScanFailure> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(item.name.clone());
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let algo = algorithm.unwrap_or(Algorithm::Rf);
        match self.replies.get(&item.name) {
            Some(MockReply::Verdict { label, confidence }) => {
                Ok(ScanOutcome::scanned(item, *label, Some(*confidence)).with_algorithm(algo.as_str()))
            }
            Some(MockReply::Fail(failure)) => Err(failure.clone()),
            None => Ok(ScanOutcome::scanned(item, ScanLabel::Benign, Some(0.0))
                .with_algorithm(algo.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_script() {
        let client = MockScanClient::new()
            .with_verdict("a.exe", ScanLabel::Malicious, 0.91)
            .with_failure("b.txt", ScanFailure::Transport { status: 500 });

        let a = UploadItem::new("a.exe", 1024, "a.exe");
        let b = UploadItem::new("b.txt", 512, "b.txt");
        let c = UploadItem::new("c.pdf", 10, "c.pdf");

        let outcome = client.scan_one(&a, None).await.unwrap();
        assert_eq!(outcome.label, ScanLabel::Malicious);
        assert_eq!(outcome.algorithm.as_deref(), Some("rf"));

        let err = client.scan_one(&b, None).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");

        let outcome = client.scan_one(&c, Some(Algorithm::Svm)).await.unwrap();
        assert_eq!(outcome.label, ScanLabel::Benign);
        assert_eq!(outcome.algorithm.as_deref(), Some("svm"));

        assert_eq!(client.calls(), vec!["a.exe", "b.txt", "c.pdf"]);
    }
}
