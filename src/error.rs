//! Error handling for filename date parsing.
//!
//! Distinguishes per-dataset failures (skip the dataset and carry on) from
//! per-cruise and startup failures, so the batch drivers can keep the
//! skip-versus-abort granularity of a fleet run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DateParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown vessel prefix '{prefix}' for cruise {cruise}")]
    UnknownVessel { cruise: String, prefix: String },

    #[error("No filename format known for vessel '{prefix}', instrument '{instrument}'")]
    UnrecognizedFormat { prefix: String, instrument: String },

    #[error("No qualifying files for {cruise}/{instrument} in {path}")]
    EmptyDataset {
        cruise: String,
        instrument: String,
        path: PathBuf,
    },

    #[error("Failed to decode timestamp from '{filename}': {reason}")]
    Decode { filename: String, reason: String },

    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    #[error("Invalid qualifying pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// What a batch driver does when a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Skip the one dataset, continue with the next instrument
    SkipDataset,
    /// Skip the whole cruise, continue with the rest of the fleet
    SkipCruise,
    /// Stop the run
    Fatal,
}

impl DateParseError {
    pub fn decode(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Filesystem {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Classify the error for the batch drivers.
    ///
    /// Filenames failing the digit precheck never surface here: the decoder
    /// skips them.
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::UnrecognizedFormat { .. }
            | Self::EmptyDataset { .. }
            | Self::Decode { .. }
            | Self::Filesystem { .. }
            | Self::Io(_) => Disposition::SkipDataset,
            Self::UnknownVessel { .. } => Disposition::SkipCruise,
            Self::InvalidPattern { .. } | Self::Configuration { .. } => Disposition::Fatal,
        }
    }

    /// Empty datasets are informational rather than failures
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::EmptyDataset { .. })
    }
}

pub type Result<T> = std::result::Result<T, DateParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_per_variant() {
        let unknown = DateParseError::UnknownVessel {
            cruise: "ZZ1234".to_string(),
            prefix: "ZZ".to_string(),
        };
        assert_eq!(unknown.disposition(), Disposition::SkipCruise);

        let format = DateParseError::UnrecognizedFormat {
            prefix: "FL".to_string(),
            instrument: "gyro".to_string(),
        };
        assert_eq!(format.disposition(), Disposition::SkipDataset);

        let decode = DateParseError::decode("x_20191332.raw", "month 13");
        assert_eq!(decode.disposition(), Disposition::SkipDataset);

        let config = DateParseError::configuration("missing root");
        assert_eq!(config.disposition(), Disposition::Fatal);
    }

    #[test]
    fn test_empty_dataset_is_informational() {
        let empty = DateParseError::EmptyDataset {
            cruise: "RR1905".to_string(),
            instrument: "gyro".to_string(),
            path: PathBuf::from("/data/gyro"),
        };
        assert!(empty.is_informational());
        assert!(!DateParseError::filesystem("/nope", "missing").is_informational());
    }

    #[test]
    fn test_error_display() {
        let e = DateParseError::UnrecognizedFormat {
            prefix: "ZZ".to_string(),
            instrument: "gyro".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "No filename format known for vessel 'ZZ', instrument 'gyro'"
        );
    }
}
