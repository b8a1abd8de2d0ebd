//! Volley CLI entry point

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use volley::config::cli::Cli;
use volley::config::cli_convert::build_run_config;
use volley::config::validator::validate_config;
use volley::output::{text, write_result_files_stdout};
use volley::StressRunner;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    init_logging(cli.debug);

    let config = build_run_config(&cli)?;
    validate_config(&config).context("Configuration validation failed")?;

    if cli.dry_run {
        println!("{}", config);
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let output = config.output.clone();
    let report = runtime.block_on(StressRunner::new(config).run())?;

    text::print_report(&report);
    write_result_files_stdout(&output, &report.global_records)?;

    Ok(())
}

/// Diagnostics go to stderr; RUST_LOG overrides the level
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
