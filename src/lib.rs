//! Cruise filename dating library
//!
//! Recovers acquisition timestamps from the names of raw files produced by
//! shipboard instruments on oceanographic research cruises.
//!
//! This library provides tools for:
//! - Resolving cruise identifiers to vessel prefixes and storage locations
//! - Selecting the filename decoding strategy for an instrument dataset
//! - Decoding timestamps from each supported naming convention
//! - Aggregating per-device date ranges
//! - Emitting per-file and per-dataset SQL updates and a CSV range log

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod emission;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod processor;
pub mod vessel;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{Config, VesselTable};
pub use error::{DateParseError, Disposition, Result};
pub use format::{DecodingStrategy, FormatSelector};
pub use models::{CruiseId, DateRange, DecodedTimestamp, InstrumentDataset, RunStats, VesselPrefix};
pub use processor::DatasetProcessor;
