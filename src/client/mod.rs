//! Clients for the MalDetect scanning server.
//!
//! The bulk-scan pipeline only depends on the [`ScanClient`] trait:
//! - [`HttpScanClient`] talks to a real server over multipart HTTP
//! - [`MockScanClient`] replays scripted replies for tests and dry runs

mod dashboard;
mod http;
mod mock;
mod response;

pub use dashboard::{
    DailyCount, DashboardStats, HealthStatus, ModelPerformance, RecentScan, Statistics,
};
pub use http::HttpScanClient;
pub use mock::{MockReply, MockScanClient};
pub use response::{
    classify_bulk_reply, classify_single_reply, FileStats, ModelInfo, RiskLevel, SingleScanReport,
};

use crate::core::error::ScanFailure;
use crate::core::types::{Algorithm, ScanOutcome, UploadItem};
use async_trait::async_trait;

/// Per-file endpoint used by bulk scans.
pub const BULK_SCAN_PATH: &str = "/api/bulk-scan";
/// Single-file endpoint with model and file statistics.
pub const SCAN_PATH: &str = "/api/scan";
/// Liveness endpoint.
pub const HEALTH_PATH: &str = "/api/health";
/// Aggregate statistics endpoint.
pub const DASHBOARD_STATS_PATH: &str = "/api/dashboard/stats";

/// Uploads one file and classifies the server's reply.
///
/// Implementations never retry; every failure is returned to the caller.
#[async_trait]
pub trait ScanClient: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &str;

    /// Scan a single queued file.
    async fn scan_one(
        &self,
        item: &UploadItem,
        algorithm: Option<Algorithm>,
    ) -> Result<ScanOutcome, ScanFailure>;
}
