//! Pass/fail decision for a check run.
//!
//! The run fails when the analyzer reported any error, or when warnings are
//! configured to fail the build and at least one issue of any kind was found.

use serde::{Deserialize, Serialize};

/// Counters collected by the analyzer and formatter steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub analyzer_errors: usize,
    pub analyzer_warnings: usize,
    pub format_warnings: usize,
}

impl Summary {
    /// Total of all three counters.
    pub fn issue_count(&self) -> usize {
        self.analyzer_errors + self.analyzer_warnings + self.format_warnings
    }
}

/// Outcome of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed { message: String },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Passed => None,
            Verdict::Failed { message } => Some(message.as_str()),
        }
    }
}

/// Apply the decision rule.
pub fn evaluate(summary: &Summary, fail_on_warnings: bool) -> Verdict {
    let issues = summary.issue_count();
    if summary.analyzer_errors > 0 || (fail_on_warnings && issues > 0) {
        Verdict::Failed {
            message: issues_found(issues),
        }
    } else {
        Verdict::Passed
    }
}

/// "1 issue found." / "N issues found."
pub fn issues_found(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{} issue{} found.", count, plural)
}
