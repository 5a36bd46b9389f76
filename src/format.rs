//! Filename format selection.
//!
//! Maps a (vessel prefix, instrument name) pair to the decoding strategy and
//! qualifying pattern for that dataset. The choice is made once per dataset;
//! there is no per-file detection.

use crate::config::VesselTable;
use crate::constants::MULTIBEAM_INSTRUMENT;
use crate::error::{DateParseError, Result};
use crate::models::VesselPrefix;
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filename encodings of acquisition timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DecodingStrategy {
    /// `XX_YYYYMMDD_HHMMSS...`
    Multibeam,
    /// `name_YYYYMMDD-HHMMSS...`, date after the first `_`, time after the last `-`
    UnderscoreSplit,
    /// `name_YYYYMMDDHHMMSS...`, all fourteen digits in the last `_` token
    UnderscoreCompact,
    /// `name.YYYYMMDDTHHMMZ...`, no seconds
    DotIso,
    /// `tagxYYDDD_SSSSS...`, two-digit year, day of year, seconds of day
    JulianDay,
    /// `sensor_YYYYMMDD-HHMM...`, no seconds
    IsoDash,
}

impl DecodingStrategy {
    /// Qualifying pattern used when the vessel table has none for this strategy
    pub fn default_pattern(&self) -> Option<&'static str> {
        match self {
            DecodingStrategy::Multibeam => Some(r"\w+\.all$"),
            DecodingStrategy::UnderscoreSplit => Some(r"\w+\.Raw$"),
            DecodingStrategy::UnderscoreCompact => Some(r"\w+\.raw$"),
            DecodingStrategy::DotIso => None,
            DecodingStrategy::JulianDay => Some(r"^\w{4}\d{5}_\d+\.raw$"),
            DecodingStrategy::IsoDash => Some(r"^[\w-]+_\d{8}-\d{4}\w*\.Raw$"),
        }
    }

    /// Whether one directory mixes several devices that must be aggregated
    /// separately, keyed by the filename text before the date field
    pub fn groups_by_prefix(&self) -> bool {
        matches!(self, DecodingStrategy::JulianDay | DecodingStrategy::IsoDash)
    }
}

impl fmt::Display for DecodingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodingStrategy::Multibeam => "multibeam",
            DecodingStrategy::UnderscoreSplit => "underscore-split",
            DecodingStrategy::UnderscoreCompact => "underscore-compact",
            DecodingStrategy::DotIso => "dot-iso",
            DecodingStrategy::JulianDay => "julian-day",
            DecodingStrategy::IsoDash => "iso-dash",
        };
        f.write_str(name)
    }
}

/// Strategy and qualifying filter selected for one dataset
#[derive(Debug, Clone)]
pub struct DatasetFormat {
    pub strategy: DecodingStrategy,
    /// `None` accepts every regular file
    pub pattern: Option<Regex>,
}

impl DatasetFormat {
    fn compile(strategy: DecodingStrategy, pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|p| {
                Regex::new(p).map_err(|source| DateParseError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .transpose()?;
        Ok(Self { strategy, pattern })
    }

    /// Whether a filename belongs to this dataset
    pub fn qualifies(&self, filename: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(filename))
    }
}

/// Central (vessel, instrument) -> format table
#[derive(Debug, Clone)]
pub struct FormatSelector<'a> {
    vessels: &'a VesselTable,
    strategy_override: Option<DecodingStrategy>,
}

impl<'a> FormatSelector<'a> {
    pub fn new(vessels: &'a VesselTable) -> Self {
        Self {
            vessels,
            strategy_override: None,
        }
    }

    /// Force one strategy for every dataset
    pub fn with_override(mut self, strategy: Option<DecodingStrategy>) -> Self {
        self.strategy_override = strategy;
        self
    }

    /// Select the decoding strategy and qualifying pattern for a dataset
    pub fn select(&self, prefix: &VesselPrefix, instrument: &str) -> Result<DatasetFormat> {
        if let Some(strategy) = self.strategy_override {
            return self.select_override(prefix, strategy);
        }

        if instrument == MULTIBEAM_INSTRUMENT {
            let strategy = DecodingStrategy::Multibeam;
            return DatasetFormat::compile(strategy, strategy.default_pattern());
        }

        let unrecognized = || DateParseError::UnrecognizedFormat {
            prefix: prefix.to_string(),
            instrument: instrument.to_string(),
        };

        let vessel = self.vessels.get(prefix).ok_or_else(unrecognized)?;
        let strategy = vessel.serial_strategy.ok_or_else(unrecognized)?;

        match (&vessel.serial_pattern, vessel.pass_through) {
            (Some(pattern), _) => DatasetFormat::compile(strategy, Some(pattern.as_str())),
            (None, true) => DatasetFormat::compile(strategy, None),
            (None, false) => Err(unrecognized()),
        }
    }

    fn select_override(
        &self,
        prefix: &VesselPrefix,
        strategy: DecodingStrategy,
    ) -> Result<DatasetFormat> {
        // Reuse the vessel's own pattern when it was written for this strategy
        let vessel_pattern = self
            .vessels
            .get(prefix)
            .filter(|v| v.serial_strategy == Some(strategy))
            .and_then(|v| v.serial_pattern.as_deref());

        DatasetFormat::compile(strategy, vessel_pattern.or(strategy.default_pattern()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(p: &str) -> VesselPrefix {
        VesselPrefix::new(p)
    }

    #[test]
    fn test_multibeam_for_any_vessel() {
        let table = VesselTable::default();
        let selector = FormatSelector::new(&table);

        for vessel in ["RR", "OC", "SKQ", "FL", "ZZ"] {
            let format = selector.select(&prefix(vessel), "multibeam").unwrap();
            assert_eq!(format.strategy, DecodingStrategy::Multibeam);
            assert!(format.qualifies("0001_20190615_143000_Revelle.all"));
            assert!(!format.qualifies("0001_20190615_143000_Revelle.raw"));
        }
    }

    #[test]
    fn test_serial_strategies_by_vessel() {
        let table = VesselTable::default();
        let selector = FormatSelector::new(&table);

        let cases = [
            ("RR", DecodingStrategy::UnderscoreCompact),
            ("SR", DecodingStrategy::UnderscoreCompact),
            ("SP", DecodingStrategy::UnderscoreCompact),
            ("HLY", DecodingStrategy::UnderscoreCompact),
            ("OC", DecodingStrategy::UnderscoreSplit),
            ("TN", DecodingStrategy::UnderscoreSplit),
            ("SKQ", DecodingStrategy::DotIso),
            ("BH", DecodingStrategy::JulianDay),
            ("RC", DecodingStrategy::IsoDash),
        ];
        for (vessel, expected) in cases {
            let format = selector.select(&prefix(vessel), "gyro").unwrap();
            assert_eq!(format.strategy, expected, "vessel {}", vessel);
        }
    }

    #[test]
    fn test_qualifying_patterns() {
        let table = VesselTable::default();
        let selector = FormatSelector::new(&table);

        let rr = selector.select(&prefix("RR"), "gyro").unwrap();
        assert!(rr.qualifies("gyro_20190615143000.raw"));
        assert!(!rr.qualifies("gyro_20190615143000.Raw"));
        assert!(!rr.qualifies("gyro_20190615143000.raw.md5"));

        let oc = selector.select(&prefix("OC"), "gyro").unwrap();
        assert!(oc.qualifies("gyro_20190615-143000.Raw"));
        assert!(!oc.qualifies("gyro_20190615-143000.raw"));

        let rc = selector.select(&prefix("RC"), "scs").unwrap();
        assert!(rc.qualifies("GPS-GGA_20190615-1430.Raw"));
        assert!(!rc.qualifies("GPS-GGA_20190615.Raw"));

        let bh = selector.select(&prefix("BH"), "adcp").unwrap();
        assert!(bh.qualifies("os7519032_03600.raw"));
        assert!(!bh.qualifies("os75_19032_03600.raw"));
    }

    #[test]
    fn test_skq_pass_through() {
        let table = VesselTable::default();
        let selector = FormatSelector::new(&table);

        let format = selector.select(&prefix("SKQ"), "wxt").unwrap();
        assert!(format.pattern.is_none());
        assert!(format.qualifies("anything.at.all"));
    }

    #[test]
    fn test_unknown_vessel_is_unrecognized_format() {
        let table = VesselTable::default();
        let selector = FormatSelector::new(&table);

        let result = selector.select(&prefix("ZZ"), "gyro");
        match result {
            Err(DateParseError::UnrecognizedFormat { prefix, instrument }) => {
                assert_eq!(prefix, "ZZ");
                assert_eq!(instrument, "gyro");
            }
            other => panic!("Expected UnrecognizedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_known_vessel_without_serial_rule() {
        let table = VesselTable::default();
        let selector = FormatSelector::new(&table);

        assert!(matches!(
            selector.select(&prefix("FL"), "gyro"),
            Err(DateParseError::UnrecognizedFormat { .. })
        ));
    }

    #[test]
    fn test_strategy_override() {
        let table = VesselTable::default();
        let selector =
            FormatSelector::new(&table).with_override(Some(DecodingStrategy::UnderscoreSplit));

        // Unknown vessel falls back to the strategy's own pattern
        let zz = selector.select(&prefix("ZZ"), "gyro").unwrap();
        assert_eq!(zz.strategy, DecodingStrategy::UnderscoreSplit);
        assert!(zz.qualifies("gyro_20190615-143000.Raw"));

        // Override wins over the multibeam rule
        let mb = selector.select(&prefix("RR"), "multibeam").unwrap();
        assert_eq!(mb.strategy, DecodingStrategy::UnderscoreSplit);
    }

    #[test]
    fn test_groups_by_prefix() {
        assert!(DecodingStrategy::JulianDay.groups_by_prefix());
        assert!(DecodingStrategy::IsoDash.groups_by_prefix());
        assert!(!DecodingStrategy::Multibeam.groups_by_prefix());
        assert!(!DecodingStrategy::UnderscoreCompact.groups_by_prefix());
    }

    #[test]
    fn test_display_matches_cli_names() {
        for strategy in DecodingStrategy::value_variants() {
            let parsed = DecodingStrategy::from_str(&strategy.to_string(), false).unwrap();
            assert_eq!(&parsed, strategy);
        }
    }
}
