//! Dataset processing engine.
//!
//! Runs one instrument dataset through format selection, directory listing,
//! qualifying filter, decoding, aggregation and emission. The batch drivers
//! in [`batch`] call into it once per instrument, cruise or fleet entry.

pub mod batch;
pub mod discovery;

#[cfg(test)]
pub mod tests;

use crate::aggregator::{fold_all, partition};
use crate::config::Config;
use crate::constants::RUN_STAMP_FORMAT;
use crate::decoder::decode;
use crate::emission::Emitter;
use crate::error::{DateParseError, Disposition, Result};
use crate::format::{DecodingStrategy, FormatSelector};
use crate::models::{DatasetOutcome, DecodedTimestamp, InstrumentDataset, RunStats};
use chrono::NaiveDateTime;
use std::io::{self, Write};
use tracing::{debug, error, info, warn};

/// Decoded files of one device group, ready to emit
struct DecodedGroup {
    device: String,
    decoded: Vec<DecodedTimestamp>,
    skipped: usize,
}

/// Main processor for cruise filename dating
pub struct DatasetProcessor<W: Write> {
    config: Config,
    strategy_override: Option<DecodingStrategy>,
    emitter: Emitter<W>,
    run_start: NaiveDateTime,
    show_progress: bool,
    stats: RunStats,
}

impl DatasetProcessor<io::Stdout> {
    /// Create a processor printing SQL to standard output
    pub fn new(config: Config, run_start: NaiveDateTime) -> Self {
        Self::with_console(config, run_start, io::stdout())
    }
}

impl<W: Write> DatasetProcessor<W> {
    /// Create a processor printing SQL to `console`
    pub fn with_console(config: Config, run_start: NaiveDateTime, console: W) -> Self {
        let run_stamp = run_start.format(RUN_STAMP_FORMAT).to_string();
        let emitter = Emitter::new(&config.output, run_stamp, console);
        Self {
            config,
            strategy_override: None,
            emitter,
            run_start,
            show_progress: false,
            stats: RunStats::default(),
        }
    }

    /// Force one decoding strategy for every dataset
    pub fn with_strategy(mut self, strategy: Option<DecodingStrategy>) -> Self {
        self.strategy_override = strategy;
        self
    }

    /// Show a progress bar during fleet runs
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Consume the processor, returning the console sink
    pub fn into_console(self) -> W {
        self.emitter.into_console()
    }

    /// Decode, aggregate and emit one instrument dataset.
    ///
    /// Every file is decoded before anything is emitted, so a `Decode`
    /// error leaves no output behind for the dataset.
    pub fn process_dataset(&mut self, dataset: &InstrumentDataset) -> Result<Vec<DatasetOutcome>> {
        let prefix = dataset.cruise.prefix();
        let format = FormatSelector::new(&self.config.vessels)
            .with_override(self.strategy_override)
            .select(&prefix, &dataset.instrument)?;
        debug!(
            "Dataset {}/{} uses {} strategy",
            dataset.cruise, dataset.instrument, format.strategy
        );

        let files = discovery::list_files(&dataset.path)?;
        let qualifying: Vec<String> = files
            .into_iter()
            .filter(|name| format.qualifies(name))
            .collect();

        let empty = || DateParseError::EmptyDataset {
            cruise: dataset.cruise.to_string(),
            instrument: dataset.instrument.clone(),
            path: dataset.path.clone(),
        };
        if qualifying.is_empty() {
            return Err(empty());
        }

        let mut groups = Vec::new();
        for (key, names) in partition(&qualifying, format.strategy) {
            let mut group = DecodedGroup {
                device: match key {
                    Some(key) => format!("{}_{}", dataset.instrument, key),
                    None => dataset.instrument.clone(),
                },
                decoded: Vec::with_capacity(names.len()),
                skipped: 0,
            };
            for name in names {
                match decode(name, format.strategy)? {
                    Some(ts) => group.decoded.push(ts),
                    None => group.skipped += 1,
                }
            }
            groups.push(group);
        }

        if groups.iter().all(|g| g.decoded.is_empty()) {
            return Err(empty());
        }

        let mut outcomes = Vec::new();
        for group in groups {
            let range = fold_all(self.run_start, &group.decoded);
            if range.is_empty() {
                debug!("No decodable files in group {}", group.device);
                continue;
            }
            let report = self
                .emitter
                .emit(&dataset.cruise, &group.device, &group.decoded, &range)?;
            for path in [&report.range_sql_path, &report.csv_path].into_iter().flatten() {
                debug!("{} {}: updated {}", dataset.cruise, group.device, path.display());
            }
            info!(
                "{} {}: {} files, {} to {}",
                dataset.cruise,
                group.device,
                range.count,
                range.min,
                range.max
            );
            outcomes.push(DatasetOutcome {
                cruise: dataset.cruise.clone(),
                device: group.device,
                range,
                files_decoded: group.decoded.len(),
                files_skipped: group.skipped,
                statements: report.statements,
            });
        }

        Ok(outcomes)
    }

    /// Process one dataset and fold the result into the run statistics.
    ///
    /// Only fatal errors are returned; everything else is logged and counted.
    pub fn run_dataset(&mut self, dataset: &InstrumentDataset) -> Result<()> {
        let result = self.process_dataset(dataset);
        self.record(dataset, result)
    }

    fn record(
        &mut self,
        dataset: &InstrumentDataset,
        result: Result<Vec<DatasetOutcome>>,
    ) -> Result<()> {
        let error = match result {
            Ok(outcomes) => {
                for outcome in &outcomes {
                    self.stats.record_outcome(outcome);
                }
                return Ok(());
            }
            Err(error) => error,
        };

        if error.disposition() == Disposition::Fatal {
            return Err(error);
        }

        match &error {
            e if e.is_informational() => {
                info!("EMPTY: {}", error);
                self.stats.datasets_empty += 1;
            }
            DateParseError::UnrecognizedFormat { .. } => {
                warn!("Skipping {}/{}: {}", dataset.cruise, dataset.instrument, error);
                self.stats.datasets_unrecognized += 1;
            }
            _ => {
                error!("Failed {}/{}: {}", dataset.cruise, dataset.instrument, error);
                self.stats.datasets_failed += 1;
            }
        }
        Ok(())
    }
}
