//! Tests for the processor module
//!
//! Exercises the full dataset pipeline against temporary cruise trees.

pub mod dataset_processing;

use crate::config::Config;
use crate::models::VesselPrefix;
use crate::processor::DatasetProcessor;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixed run start used as the range sentinel
pub fn run_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Default configuration writing every output under the temp dir
pub fn test_config(temp_dir: &TempDir) -> Config {
    Config::default().with_log_dir(temp_dir.path().join("logs"))
}

/// Point one vessel prefix at a new root directory
pub fn rebase_vessel(config: &mut Config, prefix: &str, root: &Path) {
    let mut vessel = config
        .vessels
        .get(&VesselPrefix::new(prefix))
        .cloned()
        .unwrap();
    vessel.root = root.to_path_buf();
    config.vessels.insert(prefix, vessel);
}

/// Create `dir` holding empty files with the given names
pub fn create_files(dir: &Path, names: &[&str]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), "").unwrap();
    }
    dir.to_path_buf()
}

/// Processor capturing console output in memory
pub fn processor(config: Config) -> DatasetProcessor<Vec<u8>> {
    DatasetProcessor::with_console(config, run_start(), Vec::new())
}

/// Console output of a finished processor
pub fn console(processor: DatasetProcessor<Vec<u8>>) -> String {
    String::from_utf8(processor.into_console()).unwrap()
}
