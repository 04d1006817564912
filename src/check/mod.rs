//! Analyzer and formatter checks.
//!
//! Each check runs an external Dart tool, parses its output line by line and
//! hands every finding to a [`Reporter`](crate::report::Reporter).

pub mod analyzer;
pub mod docs;
pub mod formatter;
mod runner;
mod types;

pub use analyzer::AnalyzerParser;
pub use docs::{DocKind, DocsResolver};
pub use runner::Runner;
pub use types::{
    Annotation, CheckError, Finding, FormatIssue, MalformedPolicy, ParseError, Severity, Step,
    FORMAT_MESSAGE,
};
