//! Directory discovery for cruise datasets
//!
//! Lists the regular files of one instrument directory, the instrument
//! subdirectories of a cruise and the cruise entries under a vessel root.
//! Every listing is one level deep and returned sorted by name.

use crate::error::{DateParseError, Result};
use regex::Regex;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
    Any,
}

/// Names of the regular files directly inside `path`
pub fn list_files(path: &Path) -> Result<Vec<String>> {
    list(path, EntryKind::File, None)
}

/// Names of the immediate subdirectories of `path`
pub fn list_instruments(path: &Path) -> Result<Vec<String>> {
    list(path, EntryKind::Dir, None)
}

/// Names of entries under a vessel root matching the cruise directory pattern
pub fn list_cruise_entries(root: &Path, pattern: &Regex) -> Result<Vec<String>> {
    list(root, EntryKind::Any, Some(pattern))
}

fn list(path: &Path, kind: EntryKind, pattern: Option<&Regex>) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(DateParseError::filesystem(path, "path does not exist"));
    }
    if !path.is_dir() {
        return Err(DateParseError::filesystem(path, "not a directory"));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| DateParseError::filesystem(path, e.to_string()))?;
        let file_type = entry.file_type();
        let wanted = match kind {
            EntryKind::File => file_type.is_file(),
            EntryKind::Dir => file_type.is_dir(),
            EntryKind::Any => true,
        };
        if !wanted {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            debug!("Skipping non UTF-8 name in {}", path.display());
            continue;
        };
        if pattern.is_none_or(|re| re.is_match(name)) {
            names.push(name.to_string());
        }
    }

    names.sort();
    debug!("Found {} entries in {}", names.len(), path.display());
    Ok(names)
}
