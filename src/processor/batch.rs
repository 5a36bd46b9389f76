//! Batch drivers: one cruise, a list of cruises, or a whole vessel fleet.
//!
//! Each driver turns every failure below the fatal level into a log line
//! and a counter in [`RunStats`](crate::models::RunStats), then moves on.

use super::{DatasetProcessor, discovery};
use crate::constants::{EVENTS_DIR_NAME, MULTIBEAM_INSTRUMENT};
use crate::error::{DateParseError, Disposition, Result};
use crate::models::{CruiseId, InstrumentDataset, VesselPrefix};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which datasets a fleet run visits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetScope {
    pub serial: bool,
    pub multibeam: bool,
}

impl FleetScope {
    /// Neither flag set means serial only
    pub fn effective(self) -> Self {
        if !self.serial && !self.multibeam {
            Self {
                serial: true,
                multibeam: false,
            }
        } else {
            self
        }
    }
}

impl<W: Write> DatasetProcessor<W> {
    /// Process every instrument directory of one cruise.
    ///
    /// `path_override` replaces the configured serial-instrument root, which
    /// also lets cruises of unconfigured vessels be processed.
    pub fn process_cruise(&mut self, cruise: &CruiseId, path_override: Option<&Path>) -> Result<()> {
        let root = match path_override {
            Some(path) => path.to_path_buf(),
            None => {
                let (_, vessel) = self.config.vessels.lookup(cruise)?;
                vessel.instrument_root(&vessel.locate(cruise))
            }
        };
        self.process_instrument_root(cruise, &root)
    }

    /// Process several cruises, continuing past cruise-level failures
    pub fn process_cruises(&mut self, cruises: &[CruiseId], path_override: Option<&Path>) -> Result<()> {
        for cruise in cruises {
            let result = self.process_cruise(cruise, path_override);
            self.record_cruise(cruise, result)?;
        }
        Ok(())
    }

    /// Walk every cruise directory of one vessel
    pub fn process_fleet(&mut self, prefix: &VesselPrefix, scope: FleetScope) -> Result<()> {
        let scope = scope.effective();
        let vessel = self
            .config
            .vessels
            .get(prefix)
            .cloned()
            .ok_or_else(|| DateParseError::UnknownVessel {
                cruise: prefix.to_string(),
                prefix: prefix.to_string(),
            })?;

        let pattern = vessel.cruise_dir_regex(prefix)?;
        let entries = discovery::list_cruise_entries(&vessel.root, &pattern)?;
        info!(
            "Found {} {} cruise entries under {}",
            entries.len(),
            vessel.name,
            vessel.root.display()
        );

        let progress_bar = self.fleet_progress_bar(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            let location = vessel.locate_entry(entry);
            if let Some(pb) = &progress_bar {
                pb.set_position(i as u64);
                pb.set_message(format!("Processing {}", location.cruise));
            }

            if scope.serial {
                let root = vessel.instrument_root(&location);
                let result = self.process_instrument_root(&location.cruise, &root);
                self.record_cruise(&location.cruise, result)?;
            }

            if scope.multibeam {
                let path = vessel.multibeam_root(&location);
                if path.is_dir() {
                    let dataset =
                        InstrumentDataset::new(location.cruise.clone(), MULTIBEAM_INSTRUMENT, path);
                    self.run_dataset(&dataset)?;
                } else {
                    debug!("No multibeam directory for {}", location.cruise);
                }
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("Processed {} cruises", entries.len()));
        }
        Ok(())
    }

    fn process_instrument_root(&mut self, cruise: &CruiseId, root: &Path) -> Result<()> {
        let instruments = discovery::list_instruments(root)?;
        self.stats.cruises_visited += 1;
        info!(
            "Processing {} instruments for {} under {}",
            instruments.len(),
            cruise,
            root.display()
        );

        for instrument in instruments {
            if instrument == EVENTS_DIR_NAME {
                if self.config.skip_events_dir {
                    debug!("Skipping {} directory for {}", EVENTS_DIR_NAME, cruise);
                    continue;
                }
                debug!("Processing {} directory for {} as an instrument", EVENTS_DIR_NAME, cruise);
            }

            let path: PathBuf = root.join(&instrument);
            let dataset = InstrumentDataset::new(cruise.clone(), instrument, path);
            self.run_dataset(&dataset)?;
        }
        Ok(())
    }

    fn record_cruise(&mut self, cruise: &CruiseId, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(error) if error.disposition() == Disposition::Fatal => Err(error),
            Err(error) => {
                warn!("Unable to get instrument list for {}: {}", cruise, error);
                self.stats.cruises_skipped += 1;
                Ok(())
            }
        }
    }

    fn fleet_progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("Scanning cruises...");
        Some(pb)
    }
}
