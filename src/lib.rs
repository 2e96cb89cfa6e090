//! MalDetect: client for a machine-learning malware scanning server
//!
//! This crate uploads files to a MalDetect server, one at a time, and turns
//! the server's verdicts into console tables, CSV spreadsheets, HTML and
//! JSON reports. It includes the sequential bulk-scan pipeline, single-file
//! scans with model details, and server health and dashboard queries.

pub mod client;
pub mod core;
pub mod scanner;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use crate::client::{HttpScanClient, ScanClient};
pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result, ScanFailure};
pub use crate::core::types::*;
pub use crate::scanner::{ScanPipeline, UploadQueue};
