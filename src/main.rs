//! Dartgate CLI entry point.

use clap::Parser;
use dartgate::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match &cli.command {
        Commands::Check(args) => cli::run_check(args),
        Commands::Init(args) => cli::run_init(args),
    };

    // Errors that escape a command never reached a reporter
    let exit_code = result.unwrap_or_else(|e| {
        log::debug!("{:?}", e);
        eprintln!("Error: {:#}", e);
        EXIT_ERROR
    });

    std::process::exit(exit_code);
}
