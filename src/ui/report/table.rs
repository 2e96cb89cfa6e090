//! Plain-text results table for the console.

use crate::core::types::{ScanLabel, ScanOutcome};
use crate::utils::format::truncate;
use crate::utils::format_bytes;

const NAME_WIDTH: usize = 32;
const DETAIL_WIDTH: usize = 40;

fn marker(label: ScanLabel) -> &'static str {
    match label {
        ScanLabel::Malicious => "[!]",
        ScanLabel::Benign => "[+]",
        ScanLabel::Error => "[x]",
    }
}

/// Render one line per outcome under a header row.
pub fn render_table(outcomes: &[ScanOutcome]) -> String {
    let mut out = format!(
        "    {:<name$}  {:>10}  {:<9}  {:>10}  {:<9}  {}\n",
        "Filename",
        "Size",
        "Status",
        "Confidence",
        "Algorithm",
        "Details",
        name = NAME_WIDTH
    );

    for outcome in outcomes {
        let algorithm = outcome
            .algorithm
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "-".to_string());
        let details = outcome
            .error
            .as_deref()
            .map(|e| truncate(e, DETAIL_WIDTH))
            .unwrap_or_default();

        out.push_str(&format!(
            "{} {:<name$}  {:>10}  {:<9}  {:>10}  {:<9}  {}\n",
            marker(outcome.label),
            truncate(&outcome.filename, NAME_WIDTH),
            format_bytes(outcome.size),
            outcome.label.to_string(),
            outcome.confidence_percent().unwrap_or_else(|| "-".to_string()),
            algorithm,
            details,
            name = NAME_WIDTH
        ));
    }

    out
}
