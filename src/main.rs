//! npm-outdated - check installed npm packages against the registry
//!
//! Reports every declared dependency whose installed version is missing,
//! behind the highest version its range allows, or behind the `latest` tag.
//!
//! Exit codes:
//! - 0: everything is up to date
//! - 1: at least one dependency is outdated or missing
//! - 2: fatal error, or a failed lookup with `--strict`

use clap::Parser;
use npm_outdated::cli::CliArgs;
use npm_outdated::config::ScanConfig;
use npm_outdated::output::create_presenter;
use npm_outdated::scanner::scan_project;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code when at least one dependency is outdated
const EXIT_OUTDATED: u8 = 1;

/// Exit code for fatal errors and strict lookup failures
const EXIT_ERROR: u8 = 2;

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("npm_outdated=debug")
    } else if quiet {
        EnvFilter::new("npm_outdated=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("npm_outdated=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose, args.quiet);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = ScanConfig::from_cli(&args)?;
    colored::control::set_override(config.color);
    tracing::debug!(?config, "starting scan");

    let report = scan_project(&config).await?;

    let presenter = create_presenter(&config.output_config());
    let mut stdout = io::stdout().lock();
    presenter.present(&report.result, &mut stdout)?;
    stdout.flush()?;

    if config.strict && report.has_failures() {
        eprintln!("Lookups failed:");
        for failure in &report.failures {
            eprintln!("  - {} ({}): {}", failure.name, failure.kind(), failure.error);
        }
        return Ok(ExitCode::from(EXIT_ERROR));
    }

    if report.has_outdated() {
        Ok(ExitCode::from(EXIT_OUTDATED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
