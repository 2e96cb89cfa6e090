//! Bulk-scan progress tracking and reporting.

use crate::core::error::Result;
use crate::core::types::{Algorithm, RunReport, ScanOutcome};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Label shown once every item has been processed.
pub const COMPLETE_LABEL: &str = "Scan complete!";

/// Scan progress information.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// 1-based position of the item being scanned
    pub position: usize,
    /// Items in the run
    pub total: usize,
    /// Items finished so far
    pub processed: u64,
    /// Items labeled malicious
    pub threats: u64,
    /// Items that failed
    pub errors: u64,
    /// Status line, e.g. `Scanning a.exe...`
    pub label: String,
    /// Run start time
    pub start_time: Instant,
    /// Whether the run is complete
    pub is_complete: bool,
}

impl ScanProgress {
    /// Calculate elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Items processed per second, zero before any time has passed.
    pub fn items_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.processed as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Completion percentage by position.
    pub fn percentage(&self) -> f64 {
        if self.is_complete || self.total == 0 {
            100.0
        } else {
            (self.position as f64 / self.total as f64) * 100.0
        }
    }

    /// `position / total`, as shown under the progress bar.
    pub fn count_text(&self) -> String {
        format!("{} / {}", self.position, self.total)
    }

    /// Estimate remaining time from the current rate.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        let total = self.total as u64;
        if self.processed == 0 || self.processed >= total {
            return None;
        }
        let rate = self.items_per_second();
        if rate > 0.0 {
            Some(Duration::from_secs_f64((total - self.processed) as f64 / rate))
        } else {
            None
        }
    }
}

/// Counters for one bulk-scan run.
///
/// Readable from other tasks while the run is in progress.
pub struct ProgressTracker {
    total: usize,
    position: AtomicUsize,
    processed: AtomicU64,
    threats: AtomicU64,
    errors: AtomicU64,
    label: RwLock<String>,
    start_time: Instant,
    is_complete: AtomicBool,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ProgressTracker {
    /// Create a tracker for a run over `total` items.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            position: AtomicUsize::new(0),
            processed: AtomicU64::new(0),
            threats: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            label: RwLock::new(String::new()),
            start_time: Instant::now(),
            is_complete: AtomicBool::new(false),
        }
    }

    /// Mark `name` as the item at 1-based `position`.
    pub fn set_current(&self, position: usize, name: &str) {
        self.position.store(position, Ordering::Relaxed);
        self.set_label(format!("Scanning {}...", name));
    }

    /// Count a finished item.
    pub fn record(&self, outcome: &ScanOutcome) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        if outcome.is_malicious() {
            self.threats.fetch_add(1, Ordering::Relaxed);
        }
        if outcome.is_error() {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Mark the run as complete.
    pub fn complete(&self) {
        self.position.store(self.total, Ordering::Relaxed);
        self.set_label(COMPLETE_LABEL.to_string());
        self.is_complete.store(true, Ordering::SeqCst);
    }

    fn set_label(&self, label: String) {
        let mut current = self.label.write().unwrap_or_else(|e| e.into_inner());
        *current = label;
    }

    /// Get current progress snapshot.
    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            position: self.position.load(Ordering::Relaxed),
            total: self.total,
            processed: self.processed.load(Ordering::Relaxed),
            threats: self.threats.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            label: self
                .label
                .read()
                .map(|l| l.clone())
                .unwrap_or_else(|e| e.into_inner().clone()),
            start_time: self.start_time,
            is_complete: self.is_complete.load(Ordering::SeqCst),
        }
    }
}

/// Receives pipeline transitions.
///
/// An error returned from any hook is not contained per item: it aborts
/// the run.
pub trait ScanView: Send + Sync {
    fn on_run_started(&self, _total: usize, _algorithm: Option<Algorithm>) -> Result<()> {
        Ok(())
    }

    fn on_progress(&self, _progress: &ScanProgress) -> Result<()> {
        Ok(())
    }

    fn on_item_finished(&self, _index: usize, _outcome: &ScanOutcome) -> Result<()> {
        Ok(())
    }

    fn on_run_finished(&self, _report: &RunReport) -> Result<()> {
        Ok(())
    }
}

/// View that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopView;

impl ScanView for NoopView {}

/// Console progress reporter.
pub struct ConsoleProgressReporter {
    last_line_length: AtomicUsize,
    verbose: bool,
}

impl Default for ConsoleProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProgressReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self {
            last_line_length: AtomicUsize::new(0),
            verbose: false,
        }
    }

    /// Enable verbose output.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Render a progress line.
    pub fn format_line(progress: &ScanProgress) -> String {
        let status = if progress.is_complete {
            "Complete"
        } else {
            "Scanning"
        };

        format!(
            "\r[{}] {:.1}% | {} | Threats: {} | Rate: {:.2}/s | {}",
            status,
            progress.percentage(),
            progress.count_text(),
            progress.threats,
            progress.items_per_second(),
            progress.label
        )
    }
}

impl ScanView for ConsoleProgressReporter {
    fn on_run_started(&self, total: usize, algorithm: Option<Algorithm>) -> Result<()> {
        let algo = algorithm.map(|a| a.to_string()).unwrap_or_else(|| "server default".into());
        eprintln!("Scanning {} file(s) with {}", total, algo);
        Ok(())
    }

    fn on_progress(&self, progress: &ScanProgress) -> Result<()> {
        let message = Self::format_line(progress);

        // Clear previous line and print new one
        let last_len = self.last_line_length.load(Ordering::Relaxed);
        let padding = if message.len() < last_len {
            " ".repeat(last_len - message.len())
        } else {
            String::new()
        };

        eprint!("{}{}", message, padding);
        self.last_line_length.store(message.len(), Ordering::Relaxed);

        if progress.is_complete {
            eprintln!();
        }
        Ok(())
    }

    fn on_item_finished(&self, _index: usize, outcome: &ScanOutcome) -> Result<()> {
        if !self.verbose {
            return Ok(());
        }
        if outcome.is_malicious() {
            eprintln!(
                "\n  [!] Malicious: {} ({})",
                outcome.filename,
                outcome.confidence_percent().unwrap_or_else(|| "-".into())
            );
        } else if let Some(ref error) = outcome.error {
            eprintln!("\n  [x] Failed: {} - {}", outcome.filename, error);
        }
        Ok(())
    }
}
