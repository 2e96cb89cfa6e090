//! Bulk scanning.
//!
//! This module provides:
//! - The upload queue of selected files
//! - The sequential scan pipeline that uploads them one by one
//! - Progress tracking and the view hooks the pipeline reports through

pub mod pipeline;
pub mod progress;
pub mod queue;

pub use pipeline::ScanPipeline;
pub use progress::{ConsoleProgressReporter, NoopView, ProgressTracker, ScanProgress, ScanView};
pub use queue::UploadQueue;
