//! SQL and CSV emission.
//!
//! Renders per-file start-time updates and per-dataset range updates, and
//! routes them to the console, SQL files and the per-run CSV log. Statements
//! are plain string construction; quotes inside filenames or cruise ids are
//! not escaped.

use crate::config::OutputConfig;
use crate::constants::{
    CSV_HEADER, DATERANGE_DIR, FILE_UPDATE_DIR, MINMAX_UPDATE_DIR, SQL_TIMESTAMP_FORMAT,
};
use crate::error::Result;
use crate::models::{CruiseId, DateRange, DecodedTimestamp, VesselPrefix};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `UPDATE file ...` for one decoded file
pub fn render_file_update(ts: &DecodedTimestamp, cruise: &CruiseId) -> String {
    format!(
        "UPDATE file SET start_time = '{}' WHERE cruise_id = '{}' AND path LIKE '%{}';",
        ts.datetime.format(SQL_TIMESTAMP_FORMAT),
        cruise,
        ts.filename
    )
}

/// `UPDATE cruise_issues ...` for a dataset's range
pub fn render_range_update(range: &DateRange, cruise: &CruiseId) -> String {
    format!(
        "UPDATE cruise_issues SET unols_start_date = '{}', unols_end_date = '{}' WHERE cruise = '{}';",
        range.min.format(SQL_TIMESTAMP_FORMAT),
        range.max.format(SQL_TIMESTAMP_FORMAT),
        cruise
    )
}

/// Append one range row to a CSV log, writing the header first when the
/// file is empty.
///
/// Emptiness is probed by reading one byte from the start of the file, not
/// by checking existence, so a file created but never written still gets
/// its header.
pub fn append_csv_row(
    path: &Path,
    cruise: &CruiseId,
    device: &str,
    range: &DateRange,
) -> Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let mut probe = [0u8; 1];
    if file.read(&mut probe)? == 0 {
        writeln!(file, "{}", CSV_HEADER)?;
    }
    writeln!(
        file,
        "{},{},{},{}",
        cruise,
        device,
        range.min.format(SQL_TIMESTAMP_FORMAT),
        range.max.format(SQL_TIMESTAMP_FORMAT)
    )?;
    Ok(())
}

/// Which outputs fire for each dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputToggles {
    pub print_sql: bool,
    pub range_sql: bool,
    pub file_sql: bool,
}

impl OutputToggles {
    /// With nothing selected, everything fires
    pub fn effective(self) -> Self {
        if !self.print_sql && !self.range_sql && !self.file_sql {
            Self {
                print_sql: true,
                range_sql: true,
                file_sql: true,
            }
        } else {
            self
        }
    }
}

/// What was written for one dataset
#[derive(Debug, Default, Clone)]
pub struct EmitReport {
    pub statements: usize,
    pub file_sql_path: Option<PathBuf>,
    pub range_sql_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
}

/// Routes rendered statements for one run
pub struct Emitter<W: Write> {
    log_dir: PathBuf,
    toggles: OutputToggles,
    csv: bool,
    run_stamp: String,
    console: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(output: &OutputConfig, run_stamp: impl Into<String>, console: W) -> Self {
        let toggles = OutputToggles {
            print_sql: output.print_sql,
            range_sql: output.range_sql,
            file_sql: output.file_sql,
        }
        .effective();

        Self {
            log_dir: output.log_dir.clone(),
            toggles,
            csv: output.csv,
            run_stamp: run_stamp.into(),
            console,
        }
    }

    /// Per-run, per-vessel CSV log path
    pub fn csv_path(&self, prefix: &VesselPrefix) -> PathBuf {
        self.log_dir
            .join(DATERANGE_DIR)
            .join(format!("{}_{}_dateranges.csv", self.run_stamp, prefix))
    }

    pub fn file_sql_path(&self, cruise: &CruiseId, device: &str) -> PathBuf {
        self.log_dir
            .join(FILE_UPDATE_DIR)
            .join(format!("{}_{}.sql", cruise, device))
    }

    pub fn range_sql_path(&self, cruise: &CruiseId, device: &str) -> PathBuf {
        self.log_dir
            .join(MINMAX_UPDATE_DIR)
            .join(format!("{}_{}_MINMAX_UPDATE.sql", cruise, device))
    }

    /// Emit every output for one dataset group. Empty ranges emit nothing.
    pub fn emit(
        &mut self,
        cruise: &CruiseId,
        device: &str,
        decoded: &[DecodedTimestamp],
        range: &DateRange,
    ) -> Result<EmitReport> {
        let mut report = EmitReport::default();
        if range.is_empty() {
            debug!("Nothing to emit for {}/{}", cruise, device);
            return Ok(report);
        }

        let mut file_updates: Vec<String> = decoded
            .iter()
            .map(|ts| render_file_update(ts, cruise))
            .collect();
        file_updates.sort();
        let range_update = render_range_update(range, cruise);
        report.statements = file_updates.len() + 1;

        if self.toggles.file_sql {
            let path = self.file_sql_path(cruise, device);
            write_lines(&path, &file_updates)?;
            info!("Wrote {} file updates to {}", file_updates.len(), path.display());
            report.file_sql_path = Some(path);
        }

        if self.toggles.print_sql {
            for line in &file_updates {
                writeln!(self.console, "{}", line)?;
            }
            writeln!(self.console, "{}", range_update)?;
        }

        if self.toggles.range_sql {
            writeln!(
                self.console,
                "MIN DATE: {}",
                range.min.format(SQL_TIMESTAMP_FORMAT)
            )?;
            writeln!(
                self.console,
                "MAX DATE: {}",
                range.max.format(SQL_TIMESTAMP_FORMAT)
            )?;
            let path = self.range_sql_path(cruise, device);
            write_lines(&path, std::slice::from_ref(&range_update))?;
            report.range_sql_path = Some(path);
        }

        if self.csv {
            let path = self.csv_path(&cruise.prefix());
            ensure_parent(&path)?;
            append_csv_row(&path, cruise, device, range)?;
            report.csv_path = Some(path);
        }

        self.console.flush()?;
        Ok(report)
    }

    /// Consume the emitter, returning the console sink
    pub fn into_console(self) -> W {
        self.console
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Truncate `path` and write one line per entry
fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    ensure_parent(path)?;
    let mut file = fs::File::create(path)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}
