//! Report generation for bulk-scan results.
//!
//! This module provides export functionality in multiple formats:
//! - HTML reports
//! - CSV spreadsheets
//! - JSON export
//! - A plain-text table for the console

pub mod csv;
pub mod html;
pub mod summary;
pub mod table;

use crate::core::error::{Error, Result};
use crate::core::types::RunReport;
use chrono::NaiveDate;
use std::path::Path;

pub use self::csv::CsvExporter;
pub use html::HtmlReporter;
pub use summary::ResultSummary;
pub use table::render_table;

/// Report format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Csv,
    Json,
}

impl ReportFormat {
    /// Date-stamped default filename for this format.
    pub fn default_file_name(&self, date: NaiveDate) -> String {
        use crate::utils::format::dated_file_name;
        match self {
            ReportFormat::Csv => dated_file_name("maldetect-bulk-scan", date, "csv"),
            ReportFormat::Html => dated_file_name("maldetect-report", date, "html"),
            ReportFormat::Json => dated_file_name("maldetect-report", date, "json"),
        }
    }
}

/// Generate a report from a finished run.
pub fn generate_report(report: &RunReport, format: ReportFormat, output_path: &Path) -> Result<()> {
    if report.outcomes.is_empty() {
        return Err(Error::NoResults);
    }

    match format {
        ReportFormat::Html => {
            let reporter = HtmlReporter::new();
            reporter.generate(report, output_path)
        }
        ReportFormat::Csv => {
            let exporter = CsvExporter::new();
            exporter.export(&report.outcomes, output_path)
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            std::fs::write(output_path, json).map_err(|e| Error::file_write(output_path, e))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PipelineState, ScanLabel, ScanOutcome, UploadItem};
    use chrono::Utc;
    use tempfile::TempDir;

    fn run_report() -> RunReport {
        let item = UploadItem::new("a.exe", 1024, "a.exe");
        RunReport {
            run_id: "run-1".into(),
            algorithm: None,
            state: PipelineState::Completed,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            processed: 1,
            threats: 1,
            errors: 0,
            outcomes: vec![ScanOutcome::scanned(&item, ScanLabel::Malicious, Some(0.91))],
        }
    }

    #[test]
    fn test_default_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            ReportFormat::Csv.default_file_name(date),
            "maldetect-bulk-scan-2024-05-01.csv"
        );
        assert_eq!(
            ReportFormat::Html.default_file_name(date),
            "maldetect-report-2024-05-01.html"
        );
    }

    #[test]
    fn test_generate_all_formats() {
        let dir = TempDir::new().unwrap();
        let report = run_report();
        let today = Utc::now().date_naive();

        for format in [ReportFormat::Csv, ReportFormat::Html, ReportFormat::Json] {
            let path = dir.path().join(format.default_file_name(today));
            generate_report(&report, format, &path).unwrap();
            assert!(path.exists());
        }

        let json_path = dir.path().join(ReportFormat::Json.default_file_name(today));
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(value["outcomes"][0]["label"], "malicious");
    }

    #[test]
    fn test_empty_run_refused() {
        let dir = TempDir::new().unwrap();
        let mut report = run_report();
        report.outcomes.clear();
        let err = generate_report(&report, ReportFormat::Json, &dir.path().join("r.json")).unwrap_err();
        assert!(matches!(err, Error::NoResults));
    }
}
