//! Sequential bulk-scan pipeline.
//!
//! Files are uploaded strictly one after another, in queue order, with a
//! short pause between uploads. A failure to scan one file is recorded as
//! an `error` outcome and the run carries on; only an error raised outside
//! that per-item boundary (for example by the view) aborts the run.

use super::progress::{NoopView, ProgressTracker, ScanProgress, ScanView};
use super::queue::UploadQueue;
use crate::client::ScanClient;
use crate::core::config::PipelineConfig;
use crate::core::error::{Error, Result};
use crate::core::types::{Algorithm, PipelineState, RunReport, ScanOutcome, UploadItem};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

/// Clears the running flag however the run ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Bulk-scan state machine: `Idle -> Running -> Completed | Aborted`.
pub struct ScanPipeline {
    client: Arc<dyn ScanClient>,
    view: Arc<dyn ScanView>,
    queue: Mutex<UploadQueue>,
    results: RwLock<Vec<ScanOutcome>>,
    state: RwLock<PipelineState>,
    tracker: RwLock<Arc<ProgressTracker>>,
    running: AtomicBool,
    inter_item_delay: Duration,
}

impl ScanPipeline {
    /// Create a pipeline with the default pacing and no view.
    pub fn new(client: Arc<dyn ScanClient>) -> Self {
        Self {
            client,
            view: Arc::new(NoopView),
            queue: Mutex::new(UploadQueue::new()),
            results: RwLock::new(Vec::new()),
            state: RwLock::new(PipelineState::Idle),
            tracker: RwLock::new(Arc::new(ProgressTracker::default())),
            running: AtomicBool::new(false),
            inter_item_delay: PipelineConfig::default().inter_item_delay(),
        }
    }

    /// Apply pipeline settings.
    pub fn with_config(mut self, config: &PipelineConfig) -> Self {
        self.inter_item_delay = config.inter_item_delay();
        self
    }

    /// Attach a view.
    pub fn with_view(mut self, view: Arc<dyn ScanView>) -> Self {
        self.view = view;
        self
    }

    /// Override the pause between uploads.
    pub fn with_inter_item_delay(mut self, delay: Duration) -> Self {
        self.inter_item_delay = delay;
        self
    }

    fn lock_queue(&self) -> Result<MutexGuard<'_, UploadQueue>> {
        self.queue.lock().map_err(|_| Error::lock_poisoned("upload queue"))
    }

    fn warn_if_running(&self, action: &str) {
        if self.is_running() {
            log::warn!("Queue {} during a running scan; applies to the next run", action);
        }
    }

    /// Queue files, skipping duplicates. Returns how many were added.
    pub fn add_files<I>(&self, files: I) -> Result<usize>
    where
        I: IntoIterator<Item = UploadItem>,
    {
        self.warn_if_running("add");
        Ok(self.lock_queue()?.add(files))
    }

    /// Remove the queued file at `index`.
    pub fn remove_file(&self, index: usize) -> Result<UploadItem> {
        self.warn_if_running("remove");
        self.lock_queue()?.remove(index)
    }

    /// Empty the queue.
    pub fn clear_files(&self) -> Result<()> {
        self.warn_if_running("clear");
        self.lock_queue()?.clear();
        Ok(())
    }

    /// Copy of the queued files.
    pub fn queued(&self) -> Result<Vec<UploadItem>> {
        Ok(self.lock_queue()?.snapshot())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
            .read()
            .map(|s| *s)
            .unwrap_or(PipelineState::Aborted)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Result log of the current or last run.
    pub fn results(&self) -> Result<Vec<ScanOutcome>> {
        self.results
            .read()
            .map(|r| r.clone())
            .map_err(|_| Error::lock_poisoned("result log"))
    }

    /// Progress of the current or last run.
    pub fn progress(&self) -> Result<ScanProgress> {
        self.tracker
            .read()
            .map(|t| t.snapshot())
            .map_err(|_| Error::lock_poisoned("progress tracker"))
    }

    fn set_state(&self, state: PipelineState) -> Result<()> {
        let mut current = self
            .state
            .write()
            .map_err(|_| Error::lock_poisoned("pipeline state"))?;
        *current = state;
        Ok(())
    }

    /// Scan every queued file in order.
    ///
    /// Returns `Ok(None)` without doing anything if a run is already in
    /// progress, and `Error::EmptySelection` if the queue is empty.
    pub async fn start(&self, algorithm: Option<Algorithm>) -> Result<Option<RunReport>> {
        // The run iterates exactly this snapshot.
        let items = self.lock_queue()?.snapshot();
        if items.is_empty() {
            return Err(Error::EmptySelection);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Bulk scan already running; start ignored");
            return Ok(None);
        }
        let _guard = RunningGuard(&self.running);

        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();

        match self.run(&run_id, &items, algorithm, started_at).await {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                log::error!("Bulk scan {} aborted: {}", run_id, e);
                if let Ok(mut state) = self.state.write() {
                    *state = PipelineState::Aborted;
                }
                Err(match e {
                    Error::UnhandledPipeline(_) => e,
                    other => Error::UnhandledPipeline(other.to_string()),
                })
            }
        }
    }

    async fn run(
        &self,
        run_id: &str,
        items: &[UploadItem],
        algorithm: Option<Algorithm>,
        started_at: DateTime<Utc>,
    ) -> Result<RunReport> {
        self.set_state(PipelineState::Running)?;
        self.results
            .write()
            .map_err(|_| Error::lock_poisoned("result log"))?
            .clear();

        let tracker = Arc::new(ProgressTracker::new(items.len()));
        *self
            .tracker
            .write()
            .map_err(|_| Error::lock_poisoned("progress tracker"))? = Arc::clone(&tracker);

        log::info!(
            "Bulk scan {} started: {} file(s) via {} client, algorithm {}",
            run_id,
            items.len(),
            self.client.name(),
            algorithm.map(|a| a.as_str()).unwrap_or("default")
        );
        self.view.on_run_started(items.len(), algorithm)?;

        for (index, item) in items.iter().enumerate() {
            tracker.set_current(index + 1, &item.name);
            self.view.on_progress(&tracker.snapshot())?;

            log::debug!("Uploading {} ({} bytes)", item.name, item.size);
            let outcome = match self.client.scan_one(item, algorithm).await {
                Ok(outcome) => outcome,
                Err(failure) => {
                    log::warn!("Scan of {} failed: {}", item.name, failure);
                    ScanOutcome::failed(item, &failure)
                }
            };

            tracker.record(&outcome);
            self.results
                .write()
                .map_err(|_| Error::lock_poisoned("result log"))?
                .push(outcome.clone());

            self.view.on_item_finished(index, &outcome)?;
            self.view.on_progress(&tracker.snapshot())?;

            if !self.inter_item_delay.is_zero() {
                tokio::time::sleep(self.inter_item_delay).await;
            }
        }

        tracker.complete();
        self.view.on_progress(&tracker.snapshot())?;
        self.set_state(PipelineState::Completed)?;

        let progress = tracker.snapshot();
        let report = RunReport {
            run_id: run_id.to_string(),
            algorithm,
            state: PipelineState::Completed,
            started_at,
            finished_at: Utc::now(),
            processed: progress.processed,
            threats: progress.threats,
            errors: progress.errors,
            outcomes: self.results()?,
        };

        log::info!(
            "Bulk scan {} completed: {} processed, {} threat(s), {} error(s) in {:.1}s",
            run_id,
            report.processed,
            report.threats,
            report.errors,
            report.duration_secs()
        );
        self.view.on_run_finished(&report)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockScanClient;
    use crate::core::error::ScanFailure;
    use crate::core::types::ScanLabel;
    use std::sync::atomic::AtomicUsize;

    fn item(name: &str, size: u64) -> UploadItem {
        UploadItem::new(name, size, name)
    }

    fn pipeline(client: MockScanClient) -> ScanPipeline {
        ScanPipeline::new(Arc::new(client)).with_inter_item_delay(Duration::ZERO)
    }

    #[derive(Default)]
    struct RecordingView {
        labels: Mutex<Vec<(String, f64)>>,
        finished: AtomicUsize,
    }

    impl ScanView for RecordingView {
        fn on_progress(&self, progress: &ScanProgress) -> Result<()> {
            self.labels
                .lock()
                .unwrap()
                .push((progress.label.clone(), progress.percentage()));
            Ok(())
        }

        fn on_run_finished(&self, _report: &RunReport) -> Result<()> {
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingView;

    impl ScanView for FailingView {
        fn on_item_finished(&self, _index: usize, _outcome: &ScanOutcome) -> Result<()> {
            Err(Error::Internal("view detached".to_string()))
        }
    }

    #[tokio::test]
    async fn test_run_yields_outcome_per_item_in_order() {
        let pipeline = pipeline(MockScanClient::new());
        pipeline
            .add_files(vec![item("c", 3), item("a", 1), item("b", 2)])
            .unwrap();

        let report = pipeline.start(None).await.unwrap().unwrap();
        let names: Vec<_> = report.outcomes.iter().map(|o| o.filename.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(report.processed, 3);
        assert_eq!(report.state, PipelineState::Completed);
        assert_eq!(pipeline.state(), PipelineState::Completed);
        assert_eq!(pipeline.results().unwrap().len(), 3);
        assert!(!pipeline.is_running());

        let progress = pipeline.progress().unwrap();
        assert!(progress.is_complete);
        assert_eq!(progress.processed, 3);
        assert_eq!(progress.label, "Scan complete!");
    }

    #[tokio::test]
    async fn test_empty_queue_is_rejected() {
        let pipeline = pipeline(MockScanClient::new());
        let err = pipeline.start(None).await.unwrap_err();
        assert!(matches!(err, Error::EmptySelection));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(pipeline.results().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_failures_still_complete() {
        let client = MockScanClient::new()
            .with_failure("a", ScanFailure::Transport { status: 503 })
            .with_failure("b", ScanFailure::ServerReported("Empty file".into()))
            .with_failure(
                "c",
                ScanFailure::MissingResult {
                    filename: "c".into(),
                },
            );
        let pipeline = pipeline(client);
        pipeline
            .add_files(vec![item("a", 1), item("b", 2), item("c", 3)])
            .unwrap();

        let report = pipeline.start(Some(Algorithm::Svm)).await.unwrap().unwrap();
        assert_eq!(report.state, PipelineState::Completed);
        assert_eq!(report.errors, 3);
        assert!(report.outcomes.iter().all(|o| o.label == ScanLabel::Error));
        assert_eq!(report.outcomes[2].error.as_deref(), Some("No result found for file"));
    }

    #[tokio::test]
    async fn test_mixed_scenario() {
        let client = MockScanClient::new()
            .with_verdict("a.exe", ScanLabel::Malicious, 0.91)
            .with_failure("b.txt", ScanFailure::Transport { status: 500 });
        let view = Arc::new(RecordingView::default());
        let pipeline = pipeline(client).with_view(view.clone());
        pipeline
            .add_files(vec![item("a.exe", 1024), item("b.txt", 512)])
            .unwrap();

        let report = pipeline.start(Some(Algorithm::Rf)).await.unwrap().unwrap();
        assert_eq!(report.threats, 1);
        assert_eq!(report.state, PipelineState::Completed);
        assert_eq!(report.outcomes[0].label, ScanLabel::Malicious);
        assert_eq!(report.outcomes[0].confidence_malicious, Some(0.91));
        assert_eq!(report.outcomes[1].label, ScanLabel::Error);
        assert_eq!(report.outcomes[1].error.as_deref(), Some("HTTP 500"));

        let labels = view.labels.lock().unwrap();
        assert_eq!(labels[0], ("Scanning a.exe...".to_string(), 50.0));
        assert_eq!(labels.last().unwrap(), &("Scan complete!".to_string(), 100.0));
        assert_eq!(view.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_while_running_is_noop() {
        let client = MockScanClient::new().with_latency(Duration::from_millis(30));
        let pipeline = pipeline(client);
        pipeline.add_files(vec![item("a", 1), item("b", 2)]).unwrap();

        let (first, second) = tokio::join!(pipeline.start(None), pipeline.start(None));
        assert_eq!(first.unwrap().unwrap().outcomes.len(), 2);
        assert!(second.unwrap().is_none());
        assert_eq!(pipeline.results().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_view_error_aborts_run() {
        let pipeline = pipeline(MockScanClient::new()).with_view(Arc::new(FailingView));
        pipeline.add_files(vec![item("a", 1), item("b", 2)]).unwrap();

        let err = pipeline.start(None).await.unwrap_err();
        assert!(matches!(err, Error::UnhandledPipeline(_)));
        assert_eq!(err.to_string(), "Bulk scan failed: Internal error: view detached");
        assert_eq!(pipeline.state(), PipelineState::Aborted);
        assert!(!pipeline.is_running());
        assert_eq!(pipeline.results().unwrap().len(), 1);
    }

    /// Empties the pipeline's queue as soon as a run starts.
    #[derive(Default)]
    struct ClearingView {
        pipeline: Mutex<Option<Arc<ScanPipeline>>>,
    }

    impl ScanView for ClearingView {
        fn on_run_started(&self, _total: usize, _algorithm: Option<Algorithm>) -> Result<()> {
            if let Some(pipeline) = self.pipeline.lock().unwrap().as_ref() {
                pipeline.clear_files()?;
            }
            Ok(())
        }

        fn on_run_finished(&self, _report: &RunReport) -> Result<()> {
            self.pipeline.lock().unwrap().take();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_clear_after_start_does_not_shrink_run() {
        let view = Arc::new(ClearingView::default());
        let pipeline = Arc::new(pipeline(MockScanClient::new()).with_view(view.clone()));
        *view.pipeline.lock().unwrap() = Some(Arc::clone(&pipeline));
        pipeline.add_files(vec![item("a", 1), item("b", 2)]).unwrap();

        let report = pipeline.start(None).await.unwrap().unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.processed, 2);
        assert!(pipeline.queued().unwrap().is_empty());

        let err = pipeline.start(None).await.unwrap_err();
        assert!(matches!(err, Error::EmptySelection));
        assert_eq!(pipeline.state(), PipelineState::Completed);
    }

    #[tokio::test]
    async fn test_new_run_replaces_result_log() {
        let pipeline = pipeline(MockScanClient::new());
        pipeline.add_files(vec![item("a", 1), item("b", 2)]).unwrap();
        pipeline.start(None).await.unwrap();

        pipeline.remove_file(0).unwrap();
        let report = pipeline.start(None).await.unwrap().unwrap();
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(pipeline.results().unwrap()[0].filename, "b");
    }

    #[tokio::test]
    async fn test_queue_edits_during_run_apply_next_time() {
        let client = Arc::new(MockScanClient::new().with_latency(Duration::from_millis(20)));
        let pipeline = ScanPipeline::new(client.clone()).with_inter_item_delay(Duration::ZERO);
        pipeline.add_files(vec![item("a", 1), item("b", 2)]).unwrap();

        let edit = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            pipeline.add_files(vec![item("late", 9)]).unwrap();
        };
        let (report, _) = tokio::join!(pipeline.start(None), edit);

        assert_eq!(report.unwrap().unwrap().outcomes.len(), 2);
        assert_eq!(pipeline.queued().unwrap().len(), 3);
        assert_eq!(client.calls(), vec!["a", "b"]);
    }
}
