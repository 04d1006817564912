//! Check runner that orchestrates the analyzer and formatter steps.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::gate::Summary;
use crate::process::{capture, CapturedOutput};
use crate::report::Reporter;

use super::analyzer::{output_lines, AnalyzerParser};
use super::docs::DocsResolver;
use super::formatter;
use super::{Annotation, CheckError, MalformedPolicy, Severity, Step};

/// Runs both tools against a working directory and reports their findings.
pub struct Runner {
    working_dir: PathBuf,
    config: Config,
    docs: DocsResolver,
    parallel: bool,
}

impl Runner {
    /// Create a new runner for an already resolved working directory.
    pub fn new<P: AsRef<Path>>(working_dir: P, config: Config) -> Self {
        let docs = DocsResolver::new(&config.docs);
        let parallel = config.parallel;
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            config,
            docs,
            parallel,
        }
    }

    /// Set whether the two tools run concurrently.
    ///
    /// Findings are still reported analyzer first, formatter second.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run both steps and return the aggregated counters.
    ///
    /// The first failing step aborts the run; findings already handed to the
    /// reporter stay reported.
    pub async fn run(&self, reporter: &mut dyn Reporter) -> Result<Summary, CheckError> {
        self.check_working_dir()?;
        let cwd = self.working_dir.as_path();

        let (analyzer_errors, analyzer_warnings, format_warnings) = if self.parallel {
            let (analysis, format) = futures::try_join!(
                capture(&self.config.analyzer, cwd),
                capture(&self.config.formatter, cwd)
            )?;
            self.begin(Step::Analyze, reporter)?;
            let (errors, warnings) = self.analyze_step(&analysis, reporter)?;
            self.begin(Step::Format, reporter)?;
            let format_warnings = self.format_step(&format, reporter)?;
            (errors, warnings, format_warnings)
        } else {
            self.begin(Step::Analyze, reporter)?;
            let analysis = capture(&self.config.analyzer, cwd).await?;
            let (errors, warnings) = self.analyze_step(&analysis, reporter)?;
            self.begin(Step::Format, reporter)?;
            let format = capture(&self.config.formatter, cwd).await?;
            let format_warnings = self.format_step(&format, reporter)?;
            (errors, warnings, format_warnings)
        };

        Ok(Summary {
            analyzer_errors,
            analyzer_warnings,
            format_warnings,
        })
    }

    fn check_working_dir(&self) -> Result<(), CheckError> {
        let metadata =
            std::fs::metadata(&self.working_dir).map_err(|source| CheckError::WorkingDirectory {
                path: self.working_dir.clone(),
                source,
            })?;
        if !metadata.is_dir() {
            return Err(CheckError::WorkingDirectory {
                path: self.working_dir.clone(),
                source: std::io::Error::other("not a directory"),
            });
        }
        Ok(())
    }

    fn begin(&self, step: Step, reporter: &mut dyn Reporter) -> Result<(), CheckError> {
        let command = match step {
            Step::Analyze => &self.config.analyzer,
            Step::Format => &self.config.formatter,
        };
        reporter
            .begin_step(step, command)
            .map_err(CheckError::Report)
    }

    fn analyze_step(
        &self,
        output: &CapturedOutput,
        reporter: &mut dyn Reporter,
    ) -> Result<(usize, usize), CheckError> {
        log::debug!("analyze: tool exited with {}", output.status);
        self.report_analysis(&output.text, reporter)
    }

    fn format_step(
        &self,
        output: &CapturedOutput,
        reporter: &mut dyn Reporter,
    ) -> Result<usize, CheckError> {
        log::debug!("format: tool exited with {}", output.status);
        self.report_format(&output.text, reporter)
    }

    /// Report analyzer output and return `(errors, warnings)`.
    pub fn report_analysis(
        &self,
        output: &str,
        reporter: &mut dyn Reporter,
    ) -> Result<(usize, usize), CheckError> {
        let working_dir = self.working_dir.to_string_lossy();
        let parser = AnalyzerParser::new(&working_dir, &self.docs);
        let mut errors = 0;
        let mut warnings = 0;

        for (number, line) in output_lines(output) {
            let finding = match parser.parse_line(number, line) {
                Ok(finding) => finding,
                Err(e) => match self.config.on_malformed {
                    MalformedPolicy::Abort => return Err(e.into()),
                    MalformedPolicy::Skip => {
                        log::warn!("skipping {}", e);
                        continue;
                    }
                },
            };

            reporter
                .annotate(&Annotation::from(&finding))
                .map_err(CheckError::Report)?;
            match finding.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
            }
        }

        Ok((errors, warnings))
    }

    /// Report formatter output and return the warning count.
    pub fn report_format(
        &self,
        output: &str,
        reporter: &mut dyn Reporter,
    ) -> Result<usize, CheckError> {
        let mut warnings = 0;
        for issue in formatter::parse_output(output, &self.config.docs.format_url) {
            reporter
                .annotate(&Annotation::from(&issue))
                .map_err(CheckError::Report)?;
            warnings += 1;
        }
        Ok(warnings)
    }
}
