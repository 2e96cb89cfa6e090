//! Aggregate counts over a result log.

use crate::core::types::{ScanLabel, ScanOutcome};
use serde::Serialize;

/// Totals shown on the summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub total: usize,
    pub malicious: usize,
    pub benign: usize,
    pub errors: usize,
}

impl ResultSummary {
    /// Count outcomes by label.
    pub fn from_outcomes(outcomes: &[ScanOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome.label {
                ScanLabel::Malicious => summary.malicious += 1,
                ScanLabel::Benign => summary.benign += 1,
                ScanLabel::Error => summary.errors += 1,
            }
        }
        summary
    }

    /// Percentage of outcomes labeled malicious; `0.0` for an empty log.
    pub fn threat_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.malicious as f64 / self.total as f64 * 100.0
        }
    }

    /// Threat rate with one decimal, e.g. `40.0%`.
    pub fn threat_rate_text(&self) -> String {
        format!("{:.1}%", self.threat_rate())
    }
}
