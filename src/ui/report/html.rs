//! HTML report generator.
//!
//! Generates a standalone, styled HTML report for a bulk-scan run.

use super::summary::ResultSummary;
use crate::core::error::{Error, Result};
use crate::core::types::{RunReport, ScanLabel};
use crate::utils::{escape_html, format_bytes};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// HTML report generator. The output is a single file with its styles inline.
#[derive(Debug, Default)]
pub struct HtmlReporter;

impl HtmlReporter {
    /// Create a new HTML reporter.
    pub fn new() -> Self {
        Self
    }

    /// Generate an HTML report.
    pub fn generate(&self, report: &RunReport, output_path: &Path) -> Result<()> {
        let html = self.render(report)?;
        let mut file = File::create(output_path).map_err(|e| Error::file_write(output_path, e))?;
        file.write_all(html.as_bytes())
            .map_err(|e| Error::file_write(output_path, e))?;
        Ok(())
    }

    /// Render the HTML content.
    pub fn render(&self, report: &RunReport) -> Result<String> {
        if report.outcomes.is_empty() {
            return Err(Error::NoResults);
        }

        let summary = ResultSummary::from_outcomes(&report.outcomes);

        let mut rows = String::new();
        for outcome in &report.outcomes {
            let status_class = match outcome.label {
                ScanLabel::Malicious => "status-malicious",
                ScanLabel::Benign => "status-benign",
                ScanLabel::Error => "status-error",
            };
            rows.push_str(&format!(
                "<tr><td><code>{}</code></td><td>{}</td><td><span class=\"{}\">{}</span></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&outcome.filename),
                format_bytes(outcome.size),
                status_class,
                outcome.label.as_str(),
                outcome.confidence_percent().unwrap_or_else(|| "-".to_string()),
                escape_html(outcome.algorithm.as_deref().unwrap_or("-")),
                escape_html(outcome.error.as_deref().unwrap_or("-")),
            ));
        }

        let algorithm = report
            .algorithm
            .map(|a| a.as_str().to_uppercase())
            .unwrap_or_else(|| "Server default".to_string());

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>MalDetect Bulk Scan Report - {run_id}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <header>
            <h1>MalDetect Bulk Scan Report</h1>
            <p class="subtitle">Generated on {generated_at}</p>
        </header>

        <section class="summary">
            <h2>Summary</h2>
            <div class="stats-grid">
                <div class="stat-card">
                    <span class="stat-value">{total}</span>
                    <span class="stat-label">Total Files</span>
                </div>
                <div class="stat-card malicious">
                    <span class="stat-value">{malicious}</span>
                    <span class="stat-label">Threats Detected</span>
                </div>
                <div class="stat-card benign">
                    <span class="stat-value">{benign}</span>
                    <span class="stat-label">Clean Files</span>
                </div>
                <div class="stat-card error">
                    <span class="stat-value">{errors}</span>
                    <span class="stat-label">Errors</span>
                </div>
                <div class="stat-card">
                    <span class="stat-value">{threat_rate}</span>
                    <span class="stat-label">Threat Rate</span>
                </div>
            </div>
            <p class="run-meta">Run {run_id} &middot; Algorithm {algorithm} &middot; {state} in {duration:.1}s</p>
        </section>

        <section class="results">
            <h2>Detailed Results</h2>
            <table class="results">
                <thead><tr><th>Filename</th><th>Size</th><th>Result</th><th>Confidence</th><th>Algorithm</th><th>Error</th></tr></thead>
                <tbody>
{rows}                </tbody>
            </table>
        </section>

        <footer>
            <p>Generated by MalDetect v{version}</p>
        </footer>
    </div>
</body>
</html>"#,
            run_id = escape_html(&report.run_id),
            css = STYLES,
            generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            total = summary.total,
            malicious = summary.malicious,
            benign = summary.benign,
            errors = summary.errors,
            threat_rate = summary.threat_rate_text(),
            algorithm = algorithm,
            state = report.state,
            duration = report.duration_secs(),
            rows = rows,
            version = env!("CARGO_PKG_VERSION"),
        ))
    }
}

const STYLES: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: system-ui, 'Segoe UI', Roboto, sans-serif; background: #f4f6f8; color: #2d3748; line-height: 1.5; }
        .container { max-width: 1100px; margin: 0 auto; padding: 24px; }
        header { background: #1f2937; color: #fff; border-radius: 8px; padding: 28px; margin-bottom: 24px; text-align: center; }
        header h1 { font-size: 2em; }
        .subtitle { opacity: 0.8; }
        section { background: #fff; border-radius: 8px; padding: 24px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
        h2 { font-size: 1.2em; color: #4a5568; margin-bottom: 16px; }
        .stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 12px; }
        .stat-card { background: #f7fafc; border-radius: 6px; padding: 14px; text-align: center; }
        .stat-value { display: block; font-size: 1.8em; font-weight: 700; }
        .stat-label { display: block; font-size: 0.8em; color: #718096; text-transform: uppercase; }
        .stat-card.malicious .stat-value, .status-malicious { color: #c53030; }
        .stat-card.benign .stat-value, .status-benign { color: #2f855a; }
        .stat-card.error .stat-value, .status-error { color: #c05621; }
        .status-malicious, .status-benign, .status-error { font-weight: 600; }
        .run-meta { margin-top: 14px; font-size: 0.9em; color: #718096; }
        table.results { width: 100%; border-collapse: collapse; }
        table.results th, table.results td { padding: 9px 12px; text-align: left; border-bottom: 1px solid #e2e8f0; }
        table.results th { background: #f7fafc; }
        code { font-family: ui-monospace, Menlo, monospace; word-break: break-all; }
        footer { text-align: center; color: #a0aec0; font-size: 0.85em; padding: 12px; }
        "#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ScanFailure;
    use crate::core::types::{PipelineState, ScanOutcome, UploadItem};
    use chrono::Utc;

    fn report(outcomes: Vec<ScanOutcome>) -> RunReport {
        RunReport {
            run_id: "run-1".into(),
            algorithm: None,
            state: PipelineState::Completed,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            processed: outcomes.len() as u64,
            threats: 0,
            errors: 0,
            outcomes,
        }
    }

    #[test]
    fn test_render_escapes_and_fills_missing() {
        let evil = UploadItem::new("<script>.exe", 2048, "x");
        let broken = UploadItem::new("b.txt", 512, "b.txt");
        let html = HtmlReporter::new()
            .render(&report(vec![
                ScanOutcome::scanned(&evil, ScanLabel::Malicious, Some(0.91)).with_algorithm("rf"),
                ScanOutcome::failed(&broken, &ScanFailure::Transport { status: 500 }),
            ]))
            .unwrap();

        assert!(html.contains("&lt;script&gt;.exe"));
        assert!(!html.contains("<script>.exe"));
        assert!(html.contains("<td>91.0%</td>"));
        assert!(html.contains("<td>-</td><td>-</td><td>HTTP 500</td>"));
        assert!(html.contains("50.0%"));
        assert!(html.contains("Generated on "));
    }

    #[test]
    fn test_empty_report_refused() {
        let err = HtmlReporter::new().render(&report(Vec::new())).unwrap_err();
        assert!(matches!(err, Error::NoResults));
    }

    #[test]
    fn test_generate_writes_standalone_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.html");
        let item = UploadItem::new("a.exe", 1024, "a.exe");

        HtmlReporter::new()
            .generate(
                &report(vec![ScanOutcome::scanned(&item, ScanLabel::Benign, Some(0.0))]),
                &path,
            )
            .unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("table.results"));
        assert!(html.contains("<td>0.0%</td>"));
    }
}
