//! Core data structures for cruise date parsing.
//!
//! Cruise identities, decoded timestamps, date ranges and run statistics
//! shared by the decoder, aggregator, emitter and batch drivers.

use crate::constants::EPOCH_FLOOR_YEAR;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::path::PathBuf;

/// Vessel prefix of a cruise identifier, e.g. `RR` for `RR1905`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VesselPrefix(String);

impl VesselPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VesselPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalised (uppercase) cruise identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CruiseId(String);

impl CruiseId {
    pub fn new(cruise: &str) -> Self {
        Self(cruise.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Vessel prefix of this cruise
    pub fn prefix(&self) -> VesselPrefix {
        crate::vessel::resolve(&self.0)
    }
}

impl fmt::Display for CruiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One instrument directory of one cruise
#[derive(Debug, Clone)]
pub struct InstrumentDataset {
    pub cruise: CruiseId,
    pub instrument: String,
    pub path: PathBuf,
}

impl InstrumentDataset {
    pub fn new(cruise: CruiseId, instrument: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            cruise,
            instrument: instrument.into(),
            path: path.into(),
        }
    }
}

/// Timestamp recovered from one filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTimestamp {
    pub filename: String,
    pub datetime: NaiveDateTime,
}

impl DecodedTimestamp {
    pub fn new(filename: impl Into<String>, datetime: NaiveDateTime) -> Self {
        Self {
            filename: filename.into(),
            datetime,
        }
    }
}

/// Earliest and latest timestamps of one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
    pub count: usize,
}

impl DateRange {
    /// Sentinel range: `now` as the minimum, the epoch floor as the maximum
    pub fn sentinel(now: NaiveDateTime) -> Self {
        Self {
            min: now,
            max: epoch_floor(),
            count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// 1901-01-01 00:00:00
pub fn epoch_floor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(EPOCH_FLOOR_YEAR, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Result of processing one group of files
#[derive(Debug, Clone)]
pub struct DatasetOutcome {
    pub cruise: CruiseId,
    /// Device name used for output naming (instrument, or instrument_group)
    pub device: String,
    pub range: DateRange,
    pub files_decoded: usize,
    pub files_skipped: usize,
    /// SQL statements rendered for the group, file updates plus the range update
    pub statements: usize,
}

/// Run statistics across datasets and cruises
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub cruises_visited: usize,
    pub datasets_emitted: usize,
    pub datasets_empty: usize,
    pub datasets_unrecognized: usize,
    pub datasets_failed: usize,
    pub cruises_skipped: usize,
    pub files_decoded: usize,
    pub files_skipped: usize,
    pub statements: usize,
}

impl RunStats {
    pub fn record_outcome(&mut self, outcome: &DatasetOutcome) {
        self.datasets_emitted += 1;
        self.files_decoded += outcome.files_decoded;
        self.files_skipped += outcome.files_skipped;
        self.statements += outcome.statements;
    }
}
