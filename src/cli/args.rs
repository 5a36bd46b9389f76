//! Command-line argument definitions
//!
//! One subcommand per batch scope: a single instrument directory, one or
//! more cruises, or every cruise of a vessel. Output routing flags are
//! shared by all three.

use crate::config::Config;
use crate::error::{DateParseError, Result};
use crate::format::DecodingStrategy;
use crate::models::{CruiseId, VesselPrefix};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

/// CLI arguments for the cruise filename dater
///
/// Recovers acquisition timestamps from raw instrument filenames and emits
/// per-file and per-dataset SQL updates plus a date range CSV log.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cruise-dateparse",
    version,
    about = "Derive acquisition date ranges from raw cruise instrument filenames",
    long_about = "Scans instrument directories of oceanographic cruises, decodes the timestamp \
                  embedded in each raw filename using the vessel's naming convention, and emits \
                  SQL updates for every file and for the dataset's start and end dates."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process a single instrument directory
    Dataset(DatasetArgs),
    /// Process every instrument directory of one or more cruises
    Cruise(CruiseArgs),
    /// Process every cruise of one vessel
    Fleet(FleetArgs),
}

impl Commands {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Commands::Dataset(args) => &args.common,
            Commands::Cruise(args) => &args.common,
            Commands::Fleet(args) => &args.common,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct DatasetArgs {
    /// Cruise identifier, e.g. RR1905
    #[arg(value_name = "CRUISE")]
    pub cruise: String,

    /// Instrument name; `multibeam` selects the multibeam format
    #[arg(value_name = "INSTRUMENT")]
    pub instrument: String,

    /// Directory holding the instrument's raw files
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Parser)]
pub struct CruiseArgs {
    /// Cruise identifiers
    #[arg(value_name = "CRUISE")]
    pub cruises: Vec<String>,

    /// File listing one cruise identifier per line
    #[arg(short = 'f', long = "list", value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Serial-instrument root to use instead of the vessel table location
    #[arg(short = 'p', long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CruiseArgs {
    /// Cruise ids from the command line followed by those from `--list`
    pub fn cruise_ids(&self) -> Result<Vec<CruiseId>> {
        let mut ids: Vec<CruiseId> = self.cruises.iter().map(|c| CruiseId::new(c)).collect();

        if let Some(list) = &self.list {
            let content = fs::read_to_string(list)?;
            ids.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(CruiseId::new),
            );
        }

        if ids.is_empty() {
            return Err(DateParseError::configuration(
                "No cruises given; pass cruise ids or --list FILE",
            ));
        }
        Ok(ids)
    }
}

#[derive(Debug, Clone, Parser)]
pub struct FleetArgs {
    /// Vessel prefix, e.g. RR or SKQ
    #[arg(value_name = "PREFIX")]
    pub prefix: String,

    /// Process serial-instrument datasets (the default)
    #[arg(long = "serial")]
    pub serial: bool,

    /// Process raw multibeam datasets
    #[arg(long = "multibeam")]
    pub multibeam: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl FleetArgs {
    pub fn vessel_prefix(&self) -> VesselPrefix {
        VesselPrefix::new(self.prefix.trim().to_uppercase())
    }
}

/// Output routing and logging flags shared by every subcommand.
///
/// With none of `-u`, `-m`, `-l` given, all three outputs are produced.
#[derive(Debug, Clone, Parser)]
pub struct CommonArgs {
    /// Print generated SQL to standard output
    #[arg(short = 'u', long = "print-sql")]
    pub print_sql: bool,

    /// Write the date range update SQL file and print MIN/MAX dates
    #[arg(short = 'm', long = "range-sql")]
    pub range_sql: bool,

    /// Write the per-file update SQL file
    #[arg(short = 'l', long = "file-sql")]
    pub file_sql: bool,

    /// Append date ranges to the per-run CSV log
    #[arg(long = "csv")]
    pub csv: bool,

    /// Directory for SQL, CSV and log files
    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Decode every dataset with this strategy
    #[arg(long = "strategy", value_enum, value_name = "STRATEGY")]
    pub strategy: Option<DecodingStrategy>,

    /// Path to configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CommonArgs {
    /// Layer command-line flags over a loaded configuration
    pub fn apply_overrides(&self, config: Config) -> Config {
        let mut config = if self.print_sql || self.range_sql || self.file_sql {
            config.with_output_toggles(self.print_sql, self.range_sql, self.file_sql)
        } else {
            config
        };
        if self.csv {
            config = config.with_csv();
        }
        if let Some(log_dir) = &self.log_dir {
            config = config.with_log_dir(log_dir);
        }
        config
    }
}
