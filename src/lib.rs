//! Dartgate - CI quality gate for Dart projects.
//!
//! Dartgate runs the Dart analyzer and formatter against a project, turns
//! every finding into a build annotation and decides whether the build
//! passes.
//!
//! # Architecture
//!
//! - `process`: launches a tool and captures stdout and stderr into one buffer
//! - `check`: parses analyzer and formatter output and drives both steps
//! - `gate`: aggregates counters and applies the pass/fail rule
//! - `report`: GitHub workflow commands, pretty terminal output, JSON
//! - `config`: optional `dartgate.yaml` settings
//! - `cli`: argument parsing and the `check` / `init` commands

pub mod check;
pub mod cli;
pub mod config;
pub mod gate;
pub mod process;
pub mod report;

pub use check::{Annotation, CheckError, DocsResolver, Finding, Runner, Severity, Step};
pub use config::Config;
pub use gate::{Summary, Verdict};
pub use report::{OutputFormat, Reporter};
