//! Health and dashboard reply types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reply of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    /// Whether the server reported itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Reply of `GET /api/dashboard/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub statistics: Statistics,
    #[serde(default)]
    pub recent_scans: Vec<RecentScan>,
    #[serde(default)]
    pub model_performance: Vec<ModelPerformance>,
}

/// Headline counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub total_scans: u64,
    pub malicious_count: u64,
    pub benign_count: u64,
    pub malicious_percentage: f64,
    /// Scan count per algorithm
    #[serde(default)]
    pub algorithm_usage: BTreeMap<String, u64>,
    /// Scan count per day over the last month, oldest first
    #[serde(default)]
    pub daily_scans: Vec<DailyCount>,
}

/// Scans on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

/// One row of the server's scan history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentScan {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub scan_timestamp: Option<String>,
    pub filename: String,
    pub algorithm: String,
    pub label: String,
    pub confidence: f64,
    pub file_size: u64,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// Evaluation metrics of one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub algorithm: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashboard() {
        let body = r#"{
            "statistics": {"total_scans": 10, "malicious_count": 4, "benign_count": 6,
                           "malicious_percentage": 40.0},
            "recent_scans": [{"id": 7, "scan_timestamp": "2024-05-01T10:00:00",
                              "filename": "a.exe", "algorithm": "rf", "label": "malicious",
                              "confidence": 0.9, "file_size": 1024, "sha256": "ff"}],
            "model_performance": [{"algorithm": "rf", "accuracy": 0.95, "precision": 0.94,
                                   "recall": 0.93, "f1_score": 0.935}]
        }"#;

        let stats: DashboardStats = serde_json::from_str(body).unwrap();
        assert_eq!(stats.statistics.total_scans, 10);
        assert_eq!(stats.recent_scans[0].filename, "a.exe");
        assert_eq!(stats.model_performance[0].algorithm, "rf");
        assert!(stats.statistics.algorithm_usage.is_empty());
    }

    #[test]
    fn test_parse_usage_and_null_timestamp() {
        let body = r#"{
            "statistics": {"total_scans": 3, "malicious_count": 1, "benign_count": 2,
                           "malicious_percentage": 33.3,
                           "algorithm_usage": {"rf": 2, "svm": 1},
                           "daily_scans": [{"date": "2024-05-01", "count": 3}]},
            "recent_scans": [{"id": 1, "scan_timestamp": null, "filename": "b.bin",
                              "algorithm": "svm", "label": "benign", "confidence": 0.2,
                              "file_size": 10, "sha256": null}]
        }"#;

        let stats: DashboardStats = serde_json::from_str(body).unwrap();
        assert_eq!(stats.statistics.algorithm_usage["rf"], 2);
        assert_eq!(stats.statistics.daily_scans[0].count, 3);
        assert!(stats.recent_scans[0].scan_timestamp.is_none());
        assert!(stats.model_performance.is_empty());
    }

    #[test]
    fn test_health() {
        let health: HealthStatus = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert!(health.is_ok());
    }
}
