//! CSV export functionality.
//!
//! Every field is quoted and rows are separated by `\n`, so the files
//! open cleanly in spreadsheets whatever the file names contain.

use crate::client::RecentScan;
use crate::core::error::{Error, Result};
use crate::core::types::ScanOutcome;
use crate::utils::format_bytes;
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Header of the bulk-scan results export.
pub const RESULTS_HEADER: [&str; 6] = ["Filename", "Size", "Result", "Confidence", "Algorithm", "Error"];

/// Header of the dashboard history export.
pub const DASHBOARD_HEADER: [&str; 7] = [
    "Timestamp",
    "Filename",
    "Algorithm",
    "Result",
    "Confidence",
    "Size",
    "SHA256",
];

/// CSV exporter for scan results.
pub struct CsvExporter {
    /// Delimiter byte
    delimiter: u8,
    /// Include header row
    include_header: bool,
}

impl CsvExporter {
    /// Create a new CSV exporter.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
        }
    }

    /// Set the delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to include headers.
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    fn writer<W: Write>(&self, inner: W) -> Writer<W> {
        WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner)
    }

    fn write_results<W: Write>(&self, wtr: &mut Writer<W>, outcomes: &[ScanOutcome]) -> Result<()> {
        if self.include_header {
            wtr.write_record(RESULTS_HEADER)?;
        }

        for outcome in outcomes {
            let size = format_bytes(outcome.size);
            let confidence = outcome.confidence_percent().unwrap_or_default();
            wtr.write_record([
                outcome.filename.as_str(),
                size.as_str(),
                outcome.label.as_str(),
                confidence.as_str(),
                outcome.algorithm.as_deref().unwrap_or(""),
                outcome.error.as_deref().unwrap_or(""),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Render the results export as a string.
    pub fn render(&self, outcomes: &[ScanOutcome]) -> Result<String> {
        if outcomes.is_empty() {
            return Err(Error::NoResults);
        }

        let mut wtr = self.writer(Vec::new());
        self.write_results(&mut wtr, outcomes)?;
        let bytes = wtr.into_inner().map_err(|e| Error::Io(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::Internal(e.to_string()))
    }

    /// Export scan results to CSV.
    pub fn export(&self, outcomes: &[ScanOutcome], output_path: &Path) -> Result<()> {
        if outcomes.is_empty() {
            return Err(Error::NoResults);
        }

        let file = File::create(output_path).map_err(|e| Error::file_write(output_path, e))?;
        let mut wtr = self.writer(file);
        self.write_results(&mut wtr, outcomes)
    }

    /// Export the dashboard's recent scans to CSV.
    pub fn export_recent_scans(&self, scans: &[RecentScan], output_path: &Path) -> Result<()> {
        if scans.is_empty() {
            return Err(Error::NoResults);
        }

        let file = File::create(output_path).map_err(|e| Error::file_write(output_path, e))?;
        let mut wtr = self.writer(file);

        if self.include_header {
            wtr.write_record(DASHBOARD_HEADER)?;
        }
        for scan in scans {
            wtr.write_record([
                scan.scan_timestamp.clone().unwrap_or_default(),
                scan.filename.clone(),
                scan.algorithm.clone(),
                scan.label.clone(),
                scan.confidence.to_string(),
                scan.file_size.to_string(),
                scan.sha256.clone().unwrap_or_default(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}
