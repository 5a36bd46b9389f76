//! Application constants for the cruise date parser
//!
//! Output naming, sentinel values and the fixed instrument names the
//! format selector keys on.

// =============================================================================
// Instrument Names
// =============================================================================

/// Instrument name that selects the multibeam strategy for every vessel
pub const MULTIBEAM_INSTRUMENT: &str = "multibeam";

/// Event-log subdirectory found next to serial instrument directories
pub const EVENTS_DIR_NAME: &str = "events";

/// Minimum filename length for a candidate to carry a date
pub const MIN_FILENAME_LEN: usize = 8;

// =============================================================================
// Date Range Sentinels
// =============================================================================

/// Year of the far-past sentinel used as the initial range maximum
pub const EPOCH_FLOOR_YEAR: i32 = 1901;

/// Timestamp format used in every emitted statement and CSV row
pub const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format for per-run artifact names
pub const RUN_STAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

// =============================================================================
// Output Layout
// =============================================================================

/// Subdirectory for per-file update SQL
pub const FILE_UPDATE_DIR: &str = "fileupdate";

/// Subdirectory for cruise range update SQL
pub const MINMAX_UPDATE_DIR: &str = "minmaxupdate";

/// Subdirectory for date range CSV logs
pub const DATERANGE_DIR: &str = "dateranges";

/// Header row of the date range CSV
pub const CSV_HEADER: &str = "cruise,devicetype,start_date,end_date";

/// Default output directory, relative to the working directory at startup
pub const DEFAULT_LOG_DIR: &str = "dateparselogs";

/// Application name used for config and log file paths
pub const APP_NAME: &str = "cruise-dateparse";

// =============================================================================
// Multibeam Layout
// =============================================================================

/// Raw multibeam data location inside an extracted cruise
pub const MULTIBEAM_RAW_DIR: &str = "data/multibeam/rawdata";
