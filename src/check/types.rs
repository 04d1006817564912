//! Core types for check results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Classify an analyzer severity token.
    ///
    /// Only the exact token `ERROR` is an error; `WARNING`, `INFO`, `HINT`
    /// and anything else the analyzer invents count as warnings.
    pub fn from_token(token: &str) -> Self {
        if token == "ERROR" {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which external tool produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Analyze,
    Format,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Analyze => "analyze",
            Step::Format => "format",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of analyzer machine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    /// Diagnostic type, e.g. `LINT` or `STATIC_WARNING`
    pub kind: String,
    /// Lint or diagnostic identifier
    pub code: String,
    /// Path with the working-directory prefix stripped
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub length: Option<usize>,
    pub message: String,
    pub url: String,
}

/// A file the formatter would rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatIssue {
    pub file: String,
    pub url: String,
}

/// Fixed message attached to every formatter finding.
pub const FORMAT_MESSAGE: &str = "Invalid format.";

/// A renderer-agnostic build annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub step: Step,
    pub severity: Severity,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Analyzer diagnostic type (`LINT`, `HINT`, `COMPILE_TIME_ERROR`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Length of the highlighted range, in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    pub message: String,
    pub url: String,
}

impl Annotation {
    /// Message text with the documentation link appended.
    pub fn full_message(&self) -> String {
        format!("{} For more details, see {}", self.message, self.url)
    }
}

impl From<&Finding> for Annotation {
    fn from(f: &Finding) -> Self {
        Annotation {
            step: Step::Analyze,
            severity: f.severity,
            file: f.file.clone(),
            line: Some(f.line),
            column: Some(f.column),
            code: Some(f.code.clone()),
            kind: Some(f.kind.clone()),
            length: f.length,
            message: f.message.clone(),
            url: f.url.clone(),
        }
    }
}

impl From<&FormatIssue> for Annotation {
    fn from(issue: &FormatIssue) -> Self {
        Annotation {
            step: Step::Format,
            severity: Severity::Warning,
            file: issue.file.clone(),
            line: None,
            column: None,
            code: None,
            kind: None,
            length: None,
            message: FORMAT_MESSAGE.to_string(),
            url: issue.url.clone(),
        }
    }
}

/// A line of analyzer output that does not match the machine format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed analyzer output on line {line}: missing {field} (field {index})")]
    MissingField {
        line: usize,
        field: &'static str,
        index: usize,
    },
    #[error("malformed analyzer output on line {line}: invalid {field} {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Errors that abort a check run.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("working directory {} is not accessible: {source}", .path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read output of {program}: {source}")]
    Capture {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),
}

/// What to do with an analyzer line that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop the run with the parse error
    #[default]
    Abort,
    /// Log a warning and continue with the next line
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_token() {
        assert_eq!(Severity::from_token("ERROR"), Severity::Error);
        assert_eq!(Severity::from_token("WARNING"), Severity::Warning);
        assert_eq!(Severity::from_token("INFO"), Severity::Warning);
        assert_eq!(Severity::from_token("HINT"), Severity::Warning);
        // Case matters
        assert_eq!(Severity::from_token("error"), Severity::Warning);
    }

    #[test]
    fn test_format_issue_annotation() {
        let issue = FormatIssue {
            file: "lib/main.dart".to_string(),
            url: "https://example.invalid/formatting".to_string(),
        };
        let a = Annotation::from(&issue);
        assert_eq!(a.severity, Severity::Warning);
        assert_eq!(a.step, Step::Format);
        assert_eq!(a.line, None);
        assert_eq!(a.kind, None);
        assert_eq!(
            a.full_message(),
            "Invalid format. For more details, see https://example.invalid/formatting"
        );
    }

    #[test]
    fn test_finding_annotation_keeps_kind_and_length() {
        let finding = Finding {
            severity: Severity::Warning,
            kind: "HINT".to_string(),
            code: "unused_import".to_string(),
            file: "/lib/a.dart".to_string(),
            line: 1,
            column: 8,
            length: Some(21),
            message: "Unused import.".to_string(),
            url: "https://example.invalid/unused_import".to_string(),
        };
        let a = Annotation::from(&finding);
        assert_eq!(a.step, Step::Analyze);
        assert_eq!(a.kind.as_deref(), Some("HINT"));
        assert_eq!(a.length, Some(21));
        assert_eq!(a.code.as_deref(), Some("unused_import"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::MissingField {
            line: 3,
            field: "message",
            index: 7,
        };
        assert_eq!(
            err.to_string(),
            "malformed analyzer output on line 3: missing message (field 7)"
        );
    }

    #[test]
    fn test_malformed_policy_yaml() {
        let p: MalformedPolicy = serde_yaml::from_str("skip").unwrap();
        assert_eq!(p, MalformedPolicy::Skip);
        assert_eq!(MalformedPolicy::default(), MalformedPolicy::Abort);
    }
}
