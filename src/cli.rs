//! Command-line interface for dartgate.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::check::Runner;
use crate::config::Config;
use crate::gate::{self, Verdict};
use crate::report::{self, OutputFormat, Reporter};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// CI quality gate for Dart projects.
///
/// Runs the Dart analyzer and formatter against a project, reports every
/// finding as a build annotation and fails when errors (or, optionally,
/// warnings) are found.
#[derive(Parser)]
#[command(name = "dartgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the analyzer and formatter checks
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Create a dartgate config file from a template
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Base directory the working directory is resolved against
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// Project directory, relative to the workspace
    #[arg(short = 'C', long, env = "INPUT_WORKING-DIRECTORY", default_value = ".")]
    pub working_directory: PathBuf,

    /// Fail when only warnings are found (only "true" enables it)
    #[arg(
        long,
        env = "INPUT_FAIL-ON-WARNINGS",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_input_bool
    )]
    pub fail_on_warnings: Option<bool>,

    /// Path to config file (default: dartgate.yaml in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: github, pretty, or json
    #[arg(short, long, default_value = "github")]
    pub format: String,

    /// Run analyzer and formatter concurrently
    #[arg(long)]
    pub parallel: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "dartgate.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Action inputs are strings; only the exact text `true` is true.
fn parse_input_bool(s: &str) -> Result<bool, String> {
    Ok(s.trim() == "true")
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Stock analyzer and formatter invocations, errors fail the build",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "strict",
        description: "Warnings and format issues also fail the build",
        content: include_str!("templates/strict.yaml"),
    },
];

/// Resolve the project directory from the workspace base and sub-path.
///
/// An absolute sub-path replaces the base. The result is absolute and
/// lexically normalized; symlinks are left alone.
pub fn resolve_working_directory(base: &Path, sub: &Path) -> io::Result<PathBuf> {
    let joined = base.join(sub);
    let absolute = if joined.is_absolute() {
        joined
    } else {
        std::env::current_dir()?.join(joined)
    };
    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Run the check command, reporting to stdout.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let stdout = io::stdout();
    run_check_to(args, stdout.lock())
}

/// Run the check command, reporting to `out`, and return the exit code.
pub fn run_check_to<W: Write>(args: &CheckArgs, out: W) -> anyhow::Result<i32> {
    let format: OutputFormat = match args.format.parse() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let working_dir = resolve_working_directory(&args.workspace, &args.working_directory)?;
    log::debug!("working directory: {}", working_dir.display());

    let mut reporter = report::reporter(format, out, &working_dir.to_string_lossy());

    match check(args, &working_dir, reporter.as_mut()) {
        Ok(verdict) if verdict.passed() => Ok(EXIT_SUCCESS),
        Ok(_) => Ok(EXIT_FAILED),
        Err(e) => {
            reporter.error(&e.to_string())?;
            Ok(EXIT_ERROR)
        }
    }
}

fn check(
    args: &CheckArgs,
    working_dir: &Path,
    reporter: &mut dyn Reporter,
) -> anyhow::Result<Verdict> {
    let config = Config::load(args.config.as_deref(), working_dir)?;
    let fail_on_warnings = args.fail_on_warnings.unwrap_or(config.fail_on_warnings);
    let parallel = args.parallel || config.parallel;

    let runner = Runner::new(working_dir, config).parallel(parallel);
    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(runner.run(reporter))?;

    log::debug!(
        "analyzer: {} errors, {} warnings; formatter: {} warnings",
        summary.analyzer_errors,
        summary.analyzer_warnings,
        summary.format_warnings
    );

    let verdict = gate::evaluate(&summary, fail_on_warnings);
    reporter.finish(&summary, &verdict)?;
    Ok(verdict)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'dartgate init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let config: Config = serde_yaml::from_str(template.content)?;

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    for line in describe(&config) {
        println!("  {}", line);
    }
    println!();
    println!("Install the Dart SDK tools above on the CI runner, or point");
    println!("analyzer/formatter at the commands your SDK provides, then run:");
    println!("  dartgate check --format pretty");

    Ok(EXIT_SUCCESS)
}

/// What a config will do when `check` runs, one line per setting.
fn describe(config: &Config) -> Vec<String> {
    let gate = if config.fail_on_warnings {
        "any issue fails the build"
    } else {
        "analyzer errors fail the build"
    };
    vec![
        format!("analyzer:  {}", config.analyzer),
        format!("formatter: {}", config.formatter),
        format!("gate:      {}", gate),
    ]
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
        let config: Config = serde_yaml::from_str(template.content)?;
        for line in describe(&config) {
            println!("  {:<20}   {}", "", line);
        }
    }

    println!();
    println!("Usage:");
    println!("  dartgate init --template <name>");

    Ok(EXIT_SUCCESS)
}
