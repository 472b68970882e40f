use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::AssertionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseOutcome {
    Passed,
    /// An assertion did not hold.
    Failed,
    /// The harness itself failed (transport, decoding, panic).
    Aborted,
}

impl CaseOutcome {
    pub fn label(self) -> &'static str {
        match self {
            CaseOutcome::Passed => "PASS",
            CaseOutcome::Failed => "FAIL",
            CaseOutcome::Aborted => "ABORT",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub outcome: CaseOutcome,
    pub duration_ms: u128,
    pub failures: Vec<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<AssertionResult>,
}

/// Summary report for a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub started_at: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub duration_ms: u128,
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    pub fn new(base_url: impl Into<String>, started_at: u64) -> Self {
        Self {
            base_url: base_url.into(),
            started_at,
            ..Default::default()
        }
    }

    pub fn push(&mut self, case: CaseReport) {
        self.total += 1;
        match case.outcome {
            CaseOutcome::Passed => self.passed += 1,
            CaseOutcome::Failed => self.failed += 1,
            CaseOutcome::Aborted => self.aborted += 1,
        }
        self.cases.push(case);
    }

    pub fn is_success(&self) -> bool {
        self.passed == self.total
    }

    /// Percentage of passed cases; an empty run counts as fully successful.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.passed as f64 * 100.0 / self.total as f64
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| Error::Encode {
            what: "run report",
            source,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "adcheck against {}", self.base_url);
        let _ = writeln!(out);

        for case in &self.cases {
            let _ = writeln!(
                out,
                "{:<5} {} ({} ms)",
                case.outcome.label(),
                case.name,
                case.duration_ms
            );
            for failure in &case.failures {
                let _ = writeln!(out, "      - {failure}");
            }
            if let Some(error) = &case.error {
                let _ = writeln!(out, "      ! {error}");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} total, {} passed, {} failed, {} aborted ({:.1}% success) in {} ms",
            self.total,
            self.passed,
            self.failed,
            self.aborted,
            self.success_rate(),
            self.duration_ms
        );
        out
    }
}
