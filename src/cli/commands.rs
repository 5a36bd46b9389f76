//! Command implementations
//!
//! Loads the layered configuration, installs logging, runs the selected
//! batch driver and prints the run summary.

use super::args::{Args, CommonArgs, Commands};
use crate::config::Config;
use crate::constants::RUN_STAMP_FORMAT;
use crate::logging;
use crate::models::{CruiseId, InstrumentDataset, RunStats};
use crate::processor::DatasetProcessor;
use crate::processor::batch::FleetScope;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use colored::*;
use std::time::Instant;
use tracing::info;

/// Run the selected command, returning the run statistics
pub fn run(args: Args) -> Result<RunStats> {
    let command = args
        .command
        .context("No command given; run with --help for usage")?;
    let common = command.common();
    let started = Instant::now();
    let run_start = Local::now().naive_local();
    let run_stamp = run_start.format(RUN_STAMP_FORMAT).to_string();

    let config = load_configuration(common)?;
    let log_file = logging::init(
        &config.logging,
        &config.output.log_dir,
        &run_stamp,
        common.verbose,
        common.quiet,
    )
    .context("Failed to initialize logging")?;
    if let Some(path) = log_file {
        info!("Writing run log to {}", path.display());
    }

    let stats = execute(&command, config, run_start)?;

    if !common.quiet {
        print_summary(&stats, started.elapsed().as_secs_f64());
    }
    Ok(stats)
}

/// Load configuration using layered approach (defaults -> file -> args)
fn load_configuration(common: &CommonArgs) -> Result<Config> {
    // Determine config file path
    let default_config_path = if common.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &common.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    let config = Config::load_layered(config_file).context("Failed to load configuration")?;
    let mut config = common.apply_overrides(config);

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    config.resolve_log_dir(&cwd);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn execute(command: &Commands, config: Config, run_start: NaiveDateTime) -> Result<RunStats> {
    let common = command.common();
    let mut processor = DatasetProcessor::new(config, run_start)
        .with_strategy(common.strategy)
        .with_progress(!common.quiet);

    match command {
        Commands::Dataset(args) => {
            let dataset = InstrumentDataset::new(
                CruiseId::new(&args.cruise),
                args.instrument.clone(),
                args.path.clone(),
            );
            processor
                .run_dataset(&dataset)
                .with_context(|| format!("Failed to process {}", args.path.display()))?;
        }
        Commands::Cruise(args) => {
            let cruises = args.cruise_ids().context("Failed to read cruise list")?;
            info!("Processing {} cruises", cruises.len());
            processor
                .process_cruises(&cruises, args.path.as_deref())
                .context("Cruise run aborted")?;
        }
        Commands::Fleet(args) => {
            let prefix = args.vessel_prefix();
            if let Some(vessel) = processor.config().vessels.get(&prefix) {
                info!("Processing {} fleet ({})", vessel.name, prefix);
            }
            let scope = FleetScope {
                serial: args.serial,
                multibeam: args.multibeam,
            };
            processor
                .process_fleet(&prefix, scope)
                .with_context(|| format!("Fleet run for {} aborted", prefix))?;
        }
    }

    Ok(processor.stats().clone())
}

/// Run summary on stderr, keeping stdout for SQL
fn print_summary(stats: &RunStats, elapsed_secs: f64) {
    eprintln!();
    eprintln!("{}", "Date parsing complete".bright_green().bold());
    eprintln!("   • Cruises visited: {}", stats.cruises_visited);
    eprintln!(
        "   • Datasets emitted: {}",
        stats.datasets_emitted.to_string().bright_cyan()
    );
    eprintln!("   • Files decoded: {}", stats.files_decoded);
    eprintln!("   • SQL statements: {}", stats.statements);
    if stats.files_skipped > 0 {
        eprintln!("   • Files skipped: {}", stats.files_skipped);
    }
    if stats.datasets_empty > 0 {
        eprintln!("   • Empty datasets: {}", stats.datasets_empty);
    }
    if stats.datasets_unrecognized > 0 {
        eprintln!(
            "   • Unrecognized datasets: {}",
            stats.datasets_unrecognized.to_string().yellow()
        );
    }
    if stats.datasets_failed > 0 {
        eprintln!(
            "   • Failed datasets: {}",
            stats.datasets_failed.to_string().bright_red()
        );
    }
    if stats.cruises_skipped > 0 {
        eprintln!(
            "   • Cruises skipped: {}",
            stats.cruises_skipped.to_string().yellow()
        );
    }
    eprintln!("   • Processing time: {:.2}s", elapsed_secs);
}
