//! Configuration management and validation.
//!
//! Holds the vessel table (one entry per cruise prefix: storage root,
//! instrument subdirectory, cruise directory layout and the serial-instrument
//! filename format), the output routing toggles and logging settings.
//! Built-in defaults are layered with an optional TOML file and then with
//! command-line overrides.

use crate::constants::{APP_NAME, DEFAULT_LOG_DIR, MULTIBEAM_RAW_DIR};
use crate::error::{DateParseError, Result};
use crate::format::DecodingStrategy;
use crate::models::{CruiseId, VesselPrefix};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const SIO_ROOT: &str = "/mnt/gdc/data/r2r/scratch/edu.ucsd.sio";
const HLY_ROOT: &str = "/mnt/gdc/data/r2r/scratch/mil.uscg";
const OSU_ROOT: &str = "/mnt/gdc/data/r2r/scratch/edu.oregonstate";
const UAF_ROOT: &str = "/mnt/gdc/data/r2r/scratch/edu.uaf";
const UW_ROOT: &str = "/mnt/gdc/data/r2r/scratch/edu.washington";
const UMN_ROOT: &str = "/mnt/gdc/data/r2r/scratch/edu.umn";
const UME_ROOT: &str = "/mnt/gdc/data/r2r/scratch/edu.maine";

/// How cruise directories are named under a vessel root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CruiseLayout {
    /// `RR1905.tar` next to the extracted `RR1905/`
    Tar,
    /// `SKQ201910S.tar/SKQ201910S/`
    TarNested,
    /// Lowercase directory names, e.g. `oc1906a`
    Lowercase,
    /// Directory named exactly after the cruise
    Plain,
}

/// Where one cruise lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CruiseLocation {
    pub cruise: CruiseId,
    /// Directory holding the serial-instrument tree
    pub serial_root: PathBuf,
    /// Directory holding the extracted archive (multibeam tree)
    pub archive_root: PathBuf,
}

/// Static configuration for one vessel prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselConfig {
    /// Ship name, e.g. `Revelle`
    pub name: String,

    /// Directory containing every cruise of this vessel
    pub root: PathBuf,

    /// Serial-instrument directory relative to a cruise root
    pub instrument_dir: String,

    /// Raw multibeam directory relative to a cruise archive root
    #[serde(default = "default_multibeam_dir")]
    pub multibeam_dir: String,

    pub cruise_layout: CruiseLayout,

    /// Filename format of serial-instrument datasets, if known
    #[serde(default)]
    pub serial_strategy: Option<DecodingStrategy>,

    /// Qualifying pattern for serial-instrument filenames
    #[serde(default)]
    pub serial_pattern: Option<String>,

    /// Accept every regular file when no serial pattern is configured
    #[serde(default)]
    pub pass_through: bool,
}

fn default_multibeam_dir() -> String {
    MULTIBEAM_RAW_DIR.to_string()
}

impl VesselConfig {
    fn new(
        name: &str,
        root: &str,
        instrument_dir: &str,
        cruise_layout: CruiseLayout,
        serial_strategy: Option<DecodingStrategy>,
        serial_pattern: Option<&str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            root: PathBuf::from(root),
            instrument_dir: instrument_dir.to_string(),
            multibeam_dir: default_multibeam_dir(),
            cruise_layout,
            serial_strategy,
            serial_pattern: serial_pattern.map(str::to_string),
            pass_through: false,
        }
    }

    fn with_pass_through(mut self) -> Self {
        self.pass_through = true;
        self
    }

    /// Regex selecting cruise directory entries under `root`
    pub fn cruise_dir_regex(&self, prefix: &VesselPrefix) -> Result<Regex> {
        let escaped = regex::escape(prefix.as_str());
        let pattern = match self.cruise_layout {
            CruiseLayout::Tar | CruiseLayout::TarNested => format!("^{}.*tar$", escaped),
            CruiseLayout::Lowercase => format!(r"^{}\d*\w$", escaped.to_lowercase()),
            CruiseLayout::Plain => format!(r"^{}\d+\w*$", escaped),
        };
        Regex::new(&pattern).map_err(|source| DateParseError::InvalidPattern { pattern, source })
    }

    /// Locate a cruise from a directory entry found under `root`
    pub fn locate_entry(&self, entry: &str) -> CruiseLocation {
        match self.cruise_layout {
            CruiseLayout::Tar => {
                let stem = strip_archive_suffix(entry);
                CruiseLocation {
                    cruise: CruiseId::new(stem),
                    serial_root: self.root.join(stem),
                    archive_root: self.root.join(entry).join(stem),
                }
            }
            CruiseLayout::TarNested => {
                let stem = strip_archive_suffix(entry);
                let nested = self.root.join(entry).join(stem);
                CruiseLocation {
                    cruise: CruiseId::new(stem),
                    serial_root: nested.clone(),
                    archive_root: nested,
                }
            }
            CruiseLayout::Lowercase | CruiseLayout::Plain => CruiseLocation {
                cruise: CruiseId::new(entry),
                serial_root: self.root.join(entry),
                archive_root: self.root.join(entry),
            },
        }
    }

    /// Locate a cruise by identifier without listing `root`
    pub fn locate(&self, cruise: &CruiseId) -> CruiseLocation {
        let entry = match self.cruise_layout {
            CruiseLayout::Tar | CruiseLayout::TarNested => format!("{}.tar", cruise),
            CruiseLayout::Lowercase => cruise.as_str().to_lowercase(),
            CruiseLayout::Plain => cruise.as_str().to_string(),
        };
        self.locate_entry(&entry)
    }

    /// Serial-instrument root of a located cruise
    pub fn instrument_root(&self, location: &CruiseLocation) -> PathBuf {
        location.serial_root.join(&self.instrument_dir)
    }

    /// Raw multibeam directory of a located cruise
    pub fn multibeam_root(&self, location: &CruiseLocation) -> PathBuf {
        location.archive_root.join(&self.multibeam_dir)
    }
}

/// `RR1905.tar` -> `RR1905`; names without the suffix lose their last
/// four characters, matching how extracted directories are named
fn strip_archive_suffix(entry: &str) -> &str {
    if let Some(stem) = entry.strip_suffix(".tar") {
        return stem;
    }
    let cut = entry
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &entry[..cut]
}

/// Vessel prefix -> vessel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VesselTable {
    vessels: BTreeMap<String, VesselConfig>,
}

impl VesselTable {
    pub fn get(&self, prefix: &VesselPrefix) -> Option<&VesselConfig> {
        self.vessels.get(prefix.as_str())
    }

    /// Look up a cruise's vessel, failing for unconfigured prefixes
    pub fn lookup(&self, cruise: &CruiseId) -> Result<(VesselPrefix, &VesselConfig)> {
        let prefix = cruise.prefix();
        match self.vessels.get(prefix.as_str()) {
            Some(vessel) => Ok((prefix, vessel)),
            None => Err(DateParseError::UnknownVessel {
                cruise: cruise.to_string(),
                prefix: prefix.to_string(),
            }),
        }
    }

    pub fn insert(&mut self, prefix: impl Into<String>, vessel: VesselConfig) {
        self.vessels.insert(prefix.into(), vessel);
    }

    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }
}

impl Default for VesselTable {
    fn default() -> Self {
        use CruiseLayout::*;
        use DecodingStrategy::*;

        let sio_serial = "data/SerialInstruments";
        let sio_raw = Some(r"\w+\.raw$");
        let scs_raw = Some(r"\w+\.Raw$");

        let mut vessels = BTreeMap::new();
        vessels.insert(
            "HLY".to_string(),
            VesselConfig::new(
                "Healy",
                HLY_ROOT,
                "data/sensor/serial_logger",
                Tar,
                Some(UnderscoreCompact),
                sio_raw,
            ),
        );
        for (prefix, name) in [("SP", "Sproul"), ("RR", "Revelle"), ("SR", "SallyRide")] {
            vessels.insert(
                prefix.to_string(),
                VesselConfig::new(name, SIO_ROOT, sio_serial, Tar, Some(UnderscoreCompact), sio_raw),
            );
        }
        // FLIP has no serial-instrument naming rule; only multibeam resolves
        vessels.insert(
            "FL".to_string(),
            VesselConfig::new("Flip", SIO_ROOT, sio_serial, Tar, None, None),
        );
        vessels.insert(
            "OC".to_string(),
            VesselConfig::new("Oceanus", OSU_ROOT, "das", Lowercase, Some(UnderscoreSplit), scs_raw),
        );
        vessels.insert(
            "TN".to_string(),
            VesselConfig::new("Thompson", UW_ROOT, "scs", Plain, Some(UnderscoreSplit), scs_raw),
        );
        vessels.insert(
            "SKQ".to_string(),
            VesselConfig::new("Sikuliaq", UAF_ROOT, "lds/raw", TarNested, Some(DotIso), None)
                .with_pass_through(),
        );
        vessels.insert(
            "BH".to_string(),
            VesselConfig::new(
                "BlueHeron",
                UMN_ROOT,
                "adcp",
                Plain,
                Some(JulianDay),
                Some(r"^\w{4}\d{5}_\d+\.raw$"),
            ),
        );
        vessels.insert(
            "RC".to_string(),
            VesselConfig::new(
                "RachelCarson",
                UME_ROOT,
                "scs",
                Plain,
                Some(IsoDash),
                Some(r"^[\w-]+_\d{8}-\d{4}\w*\.Raw$"),
            ),
        );

        Self { vessels }
    }
}

/// Output routing and artifact location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for SQL and CSV artifacts
    pub log_dir: PathBuf,

    /// Print generated SQL to the console
    #[serde(default)]
    pub print_sql: bool,

    /// Write the cruise range update SQL to a file
    #[serde(default)]
    pub range_sql: bool,

    /// Write per-file update SQL to a file
    #[serde(default)]
    pub file_sql: bool,

    /// Append date ranges to the per-run CSV log
    #[serde(default)]
    pub csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            print_sql: false,
            range_sql: false,
            file_sql: false,
            csv: false,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set
    pub level: String,

    /// Also write the run log to a file under the output directory
    #[serde(default = "default_true")]
    pub log_file: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: true,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub vessels: VesselTable,
    pub output: OutputConfig,
    pub logging: LoggingConfig,

    /// Skip `events` subdirectories during cruise and fleet runs
    #[serde(default)]
    pub skip_events_dir: bool,
}

/// On-disk configuration; every section optional
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    vessels: BTreeMap<String, VesselConfig>,
    output: Option<OutputConfig>,
    logging: Option<LoggingConfig>,
    skip_events_dir: Option<bool>,
}

impl Config {
    /// Default config file location, `~/.config/cruise-dateparse/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DateParseError::configuration("Could not determine config directory"))?;
        Ok(config_dir.join(APP_NAME).join("config.toml"))
    }

    /// Load built-in defaults overlaid with a TOML file when one is given
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_file {
            let content = std::fs::read_to_string(path).map_err(|e| {
                DateParseError::configuration(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            config.apply_toml(&content).map_err(|e| {
                DateParseError::configuration(format!(
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            debug!("Applied config file {}", path.display());
        }

        Ok(config)
    }

    /// Overlay a TOML document on this configuration
    pub fn apply_toml(&mut self, content: &str) -> std::result::Result<(), toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        for (prefix, vessel) in file.vessels {
            self.vessels.insert(prefix.to_uppercase(), vessel);
        }
        if let Some(output) = file.output {
            self.output = output;
        }
        if let Some(logging) = file.logging {
            self.logging = logging;
        }
        if let Some(skip) = file.skip_events_dir {
            self.skip_events_dir = skip;
        }
        Ok(())
    }

    /// Set the artifact directory
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.output.log_dir = log_dir.into();
        self
    }

    /// Set the output routing toggles
    pub fn with_output_toggles(mut self, print_sql: bool, range_sql: bool, file_sql: bool) -> Self {
        self.output.print_sql = print_sql;
        self.output.range_sql = range_sql;
        self.output.file_sql = file_sql;
        self
    }

    /// Enable the date range CSV log
    pub fn with_csv(mut self) -> Self {
        self.output.csv = true;
        self
    }

    /// Make the artifact directory absolute against `base`
    pub fn resolve_log_dir(&mut self, base: &Path) {
        if self.output.log_dir.is_relative() {
            self.output.log_dir = base.join(&self.output.log_dir);
        }
    }

    /// Validate every vessel entry; failures are fatal at startup
    pub fn validate(&self) -> Result<()> {
        if self.vessels.is_empty() {
            return Err(DateParseError::configuration("Vessel table is empty"));
        }

        for (prefix, vessel) in &self.vessels.vessels {
            if prefix.is_empty() || prefix.chars().any(|c| c.is_ascii_digit()) {
                return Err(DateParseError::configuration(format!(
                    "Invalid vessel prefix '{}'",
                    prefix
                )));
            }
            if vessel.root.as_os_str().is_empty() {
                return Err(DateParseError::configuration(format!(
                    "Vessel '{}' has no root path",
                    prefix
                )));
            }
            if let Some(pattern) = &vessel.serial_pattern {
                Regex::new(pattern).map_err(|source| DateParseError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            }
            if vessel.serial_pattern.is_some() && vessel.serial_strategy.is_none() {
                return Err(DateParseError::configuration(format!(
                    "Vessel '{}' has a serial pattern but no serial strategy",
                    prefix
                )));
            }
        }

        Ok(())
    }
}
