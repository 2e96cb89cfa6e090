//! User interface components.
//!
//! This module provides:
//! - CLI interface
//! - Report generation (HTML, CSV, JSON, console table)

pub mod cli;
pub mod report;

pub use cli::Cli;
pub use report::{generate_report, CsvExporter, HtmlReporter, ReportFormat, ResultSummary};
