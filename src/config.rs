//! Configuration file schema for dartgate.
//!
//! The config file is optional; every field has a default matching the
//! analyzer and formatter invocations a stock Dart project expects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::check::docs::CODE_PLACEHOLDER;
use crate::check::MalformedPolicy;

/// Config file names looked up in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["dartgate.yaml", ".dartgate.yaml"];

/// Errors loading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fail when warnings alone are found (overridden by the CLI input)
    #[serde(default)]
    pub fail_on_warnings: bool,
    /// Run analyzer and formatter concurrently
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
    #[serde(default = "CommandSpec::analyzer")]
    pub analyzer: CommandSpec,
    #[serde(default = "CommandSpec::formatter")]
    pub formatter: CommandSpec,
    #[serde(default)]
    pub docs: DocsConfig,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        validate(&config)?;
        Ok(config)
    }

    /// Load the config for a working directory.
    ///
    /// An explicit path must exist. Otherwise the first default name found in
    /// `working_dir` is used, falling back to built-in defaults.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log::debug!("loading config from {}", path.display());
            return Self::parse_file(path);
        }
        match discover(working_dir) {
            Some(path) => {
                log::debug!("discovered config {}", path.display());
                Self::parse_file(path)
            }
            None => {
                log::debug!("no config file in {}, using defaults", working_dir.display());
                Ok(Self::default())
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fail_on_warnings: false,
            parallel: false,
            on_malformed: MalformedPolicy::default(),
            analyzer: CommandSpec::analyzer(),
            formatter: CommandSpec::formatter(),
            docs: DocsConfig::default(),
        }
    }
}

/// An external program and its arguments.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(program: S, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Analyzer in machine output mode over the whole tree.
    pub fn analyzer() -> Self {
        Self::new(
            "dartanalyzer",
            &["--format", "machine", "--options", "analysis_options.yaml", "."],
        )
    }

    /// Formatter in dry-run mode over the whole tree.
    pub fn formatter() -> Self {
        Self::new("dartfmt", &["format", "--dry-run", "."])
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Documentation link settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// Template for lint rules; `{code}` is the identifier
    #[serde(default = "default_lint_url")]
    pub lint_url: String,
    /// Template for built-in diagnostics; `{code}` is the lowercased identifier
    #[serde(default = "default_diagnostic_url")]
    pub diagnostic_url: String,
    #[serde(default = "default_format_url")]
    pub format_url: String,
    /// Exact identifier to URL
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            lint_url: default_lint_url(),
            diagnostic_url: default_diagnostic_url(),
            format_url: default_format_url(),
            overrides: HashMap::new(),
        }
    }
}

fn default_lint_url() -> String {
    "https://dart-lang.github.io/linter/lints/{code}.html".to_string()
}

fn default_diagnostic_url() -> String {
    "https://dart.dev/tools/diagnostic-messages#{code}".to_string()
}

fn default_format_url() -> String {
    "https://flutter.dev/docs/development/tools/formatting".to_string()
}

/// Find a config file in a directory.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Validate a parsed config.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    for (name, cmd) in [("analyzer", &config.analyzer), ("formatter", &config.formatter)] {
        if cmd.program.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{}.program must not be empty", name)));
        }
    }
    for (name, template) in [
        ("docs.lint_url", &config.docs.lint_url),
        ("docs.diagnostic_url", &config.docs.diagnostic_url),
    ] {
        if !template.contains(CODE_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "{} must contain the {} placeholder",
                name, CODE_PLACEHOLDER
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.fail_on_warnings);
        assert!(!config.parallel);
        assert_eq!(config.on_malformed, MalformedPolicy::Abort);
        assert_eq!(
            config.analyzer.to_string(),
            "dartanalyzer --format machine --options analysis_options.yaml ."
        );
        assert_eq!(config.formatter.to_string(), "dartfmt format --dry-run .");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
fail_on_warnings: true
on_malformed: skip
formatter:
  program: dart
  args: [format, --output=none, .]
docs:
  overrides:
    unused_import: https://dart.dev/tools/diagnostic-messages#unused_import
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.fail_on_warnings);
        assert_eq!(config.on_malformed, MalformedPolicy::Skip);
        assert_eq!(config.formatter.to_string(), "dart format --output=none .");
        assert_eq!(config.analyzer, CommandSpec::analyzer());
        assert_eq!(config.docs.overrides.len(), 1);
        assert_eq!(config.docs.lint_url, default_lint_url());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<Config, _> = serde_yaml::from_str("fail_on_warning: true");
        assert!(result.is_err());
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dartgate.yaml");
        fs::write(&path, "docs:\n  lint_url: https://example.invalid/lints\n").unwrap();
        let err = Config::parse_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("docs.lint_url"));
    }

    #[test]
    fn test_load_discovers_in_working_dir() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Config::load(None, temp.path()).unwrap(), Config::default());

        fs::write(temp.path().join(".dartgate.yaml"), "parallel: true\n").unwrap();
        assert!(Config::load(None, temp.path()).unwrap().parallel);
    }

    #[test]
    fn test_load_explicit_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        let err = Config::load(Some(&missing), temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
