//! Output formatting for dartgate results.
//!
//! Supports three output formats:
//! - GitHub: workflow commands (`::error file=...::message`) rendered inline by Actions
//! - Pretty: colored terminal output for local runs
//! - JSON: one structured document for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::str::FromStr;

use crate::check::{Annotation, Severity, Step};
use crate::config::CommandSpec;
use crate::gate::{Summary, Verdict};

/// Receives check progress and findings as they are produced.
pub trait Reporter {
    /// Called before a tool's findings are reported.
    fn begin_step(&mut self, step: Step, command: &CommandSpec) -> io::Result<()>;

    /// Report a single finding.
    fn annotate(&mut self, annotation: &Annotation) -> io::Result<()>;

    /// Report the aggregated result.
    fn finish(&mut self, summary: &Summary, verdict: &Verdict) -> io::Result<()>;

    /// Report a run that aborted before a verdict.
    fn error(&mut self, message: &str) -> io::Result<()>;
}

/// Selectable output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Github,
    Pretty,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(OutputFormat::Github),
            "pretty" => Ok(OutputFormat::Pretty),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "invalid format {:?}, must be 'github', 'pretty', or 'json'",
                s
            )),
        }
    }
}

/// Build a reporter writing to `out`.
pub fn reporter<'a, W: Write + 'a>(
    format: OutputFormat,
    out: W,
    working_directory: &str,
) -> Box<dyn Reporter + 'a> {
    match format {
        OutputFormat::Github => Box::new(GithubReporter::new(out)),
        OutputFormat::Pretty => Box::new(PrettyReporter::new(out)),
        OutputFormat::Json => Box::new(JsonReporter::new(out, working_directory)),
    }
}

// =============================================================================
// GitHub workflow commands
// =============================================================================

/// Escape a workflow command message.
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape a workflow command property value.
pub fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// Render an annotation as a workflow command line.
pub fn workflow_command(annotation: &Annotation) -> String {
    let mut props = vec![format!("file={}", escape_property(&annotation.file))];
    if let Some(line) = annotation.line {
        props.push(format!("line={}", line));
    }
    if let Some(col) = annotation.column {
        props.push(format!("col={}", col));
    }
    format!(
        "::{} {}::{}",
        annotation.severity,
        props.join(","),
        escape_data(&annotation.full_message())
    )
}

/// Writes GitHub Actions workflow commands.
pub struct GithubReporter<W: Write> {
    out: W,
}

impl<W: Write> GithubReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for GithubReporter<W> {
    fn begin_step(&mut self, _step: Step, command: &CommandSpec) -> io::Result<()> {
        writeln!(self.out, "[command]{}", command)
    }

    fn annotate(&mut self, annotation: &Annotation) -> io::Result<()> {
        writeln!(self.out, "{}", workflow_command(annotation))
    }

    fn finish(&mut self, _summary: &Summary, verdict: &Verdict) -> io::Result<()> {
        if let Some(message) = verdict.message() {
            writeln!(self.out, "::error::{}", escape_data(message))?;
        }
        self.out.flush()
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "::error::{}", escape_data(message))?;
        self.out.flush()
    }
}

// =============================================================================
// Pretty format
// =============================================================================

/// Writes colored human-readable output.
pub struct PrettyReporter<W: Write> {
    out: W,
    header_written: bool,
}

impl<W: Write> PrettyReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    fn header(&mut self) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        self.header_written = true;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "  {} v{}",
            "dartgate".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(self.out)
    }
}

impl<W: Write> Reporter for PrettyReporter<W> {
    fn begin_step(&mut self, step: Step, command: &CommandSpec) -> io::Result<()> {
        self.header()?;
        writeln!(
            self.out,
            "  {} {}",
            format!("{:<8}", step.as_str()).bold(),
            command.to_string().dimmed()
        )
    }

    fn annotate(&mut self, a: &Annotation) -> io::Result<()> {
        let tag = match a.severity {
            Severity::Error => "ERROR".red(),
            Severity::Warning => "WARN ".yellow(),
        };
        let code = a.code.as_deref().unwrap_or("format");
        let mut location = a.file.clone();
        if let Some(line) = a.line {
            location.push_str(&format!(":{}", line));
            if let Some(col) = a.column {
                location.push_str(&format!(":{}", col));
            }
        }

        writeln!(
            self.out,
            "    {}   {} {}",
            tag,
            format!("{:<24}", code).dimmed(),
            location.blue()
        )?;
        writeln!(self.out, "            {}", a.message)?;
        writeln!(self.out, "            {}", a.url.dimmed())
    }

    fn finish(&mut self, summary: &Summary, verdict: &Verdict) -> io::Result<()> {
        self.header()?;
        writeln!(self.out)?;
        let status = if verdict.passed() {
            "✓ PASS".green()
        } else {
            "✗ FAIL".red()
        };
        writeln!(
            self.out,
            "  {}  {}",
            status,
            crate::gate::issues_found(summary.issue_count())
        )?;
        writeln!(
            self.out,
            "  {}",
            format!(
                "analyzer errors: {}  analyzer warnings: {}  format warnings: {}",
                summary.analyzer_errors, summary.analyzer_warnings, summary.format_warnings
            )
            .dimmed()
        )?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        self.header()?;
        writeln!(self.out, "  {} {}", "✗ ERROR".red(), message)?;
        self.out.flush()
    }
}

// =============================================================================
// JSON format
// =============================================================================

/// JSON report document.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub working_directory: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Absent when the run aborted before all steps completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    pub annotations: Vec<Annotation>,
}

/// Collects annotations and writes one JSON document at the end.
pub struct JsonReporter<W: Write> {
    out: W,
    working_directory: String,
    annotations: Vec<Annotation>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W, working_directory: &str) -> Self {
        Self {
            out,
            working_directory: working_directory.to_string(),
            annotations: Vec::new(),
        }
    }

    fn write(&mut self, report: &JsonReport) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn begin_step(&mut self, _step: Step, _command: &CommandSpec) -> io::Result<()> {
        Ok(())
    }

    fn annotate(&mut self, annotation: &Annotation) -> io::Result<()> {
        self.annotations.push(annotation.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &Summary, verdict: &Verdict) -> io::Result<()> {
        let report = JsonReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            working_directory: self.working_directory.clone(),
            passed: verdict.passed(),
            message: verdict.message().map(str::to_string),
            error: None,
            issue_count: Some(summary.issue_count()),
            summary: Some(*summary),
            annotations: std::mem::take(&mut self.annotations),
        };
        self.write(&report)
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        let report = JsonReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            working_directory: self.working_directory.clone(),
            passed: false,
            message: None,
            error: Some(message.to_string()),
            issue_count: None,
            summary: None,
            annotations: std::mem::take(&mut self.annotations),
        };
        self.write(&report)
    }
}
