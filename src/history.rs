//! Loading and saving the persisted export.
//!
//! Load order: primary file, then the backup copy, then empty history.
//! A malformed document degrades to the next candidate with a warning;
//! only a schema version newer than this build understands is fatal.
//! The save path runs only after decode and merge have fully
//! succeeded, so a failed run leaves the persisted file untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::schema::{ExportDocument, migrate, parse_versioned};
use crate::{Result, RstatsError};

/// Result of loading the previous export.
#[derive(Debug)]
pub struct LoadedHistory {
    pub document: Option<ExportDocument>,
    pub warnings: Vec<String>,
}

/// Load the previous export from `path`, falling back to `backup` and
/// then to an empty history.
///
/// # Errors
/// Returns [`RstatsError::UnsupportedSchema`] when a candidate parses
/// but declares a future schema version; corruption never errors.
pub fn load_previous(path: &Path, backup: &Path) -> Result<LoadedHistory> {
    let mut warnings = Vec::new();

    for candidate in [path, backup] {
        if !candidate.exists() {
            continue;
        }
        match load_one(candidate) {
            Ok(document) => {
                return Ok(LoadedHistory {
                    document: Some(document),
                    warnings,
                });
            }
            Err(err @ RstatsError::UnsupportedSchema { .. }) => return Err(err),
            Err(err) => {
                warnings.push(format!("unusable history {}: {err}", candidate.display()));
            }
        }
    }

    Ok(LoadedHistory {
        document: None,
        warnings,
    })
}

fn load_one(path: &Path) -> Result<ExportDocument> {
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    Ok(migrate(parse_versioned(value)?))
}

/// Save the export, keeping the prior file as the backup copy.
///
/// Serializes fully before touching disk, then writes via temp file and
/// atomic rename so a failure cannot leave a half-written export.
///
/// # Errors
/// Returns an error if the backup copy or the write itself fails.
pub fn save(document: &ExportDocument, path: &Path, backup: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;

    if path.exists() {
        fs::copy(path, backup).map_err(|e| RstatsError::FileAccess {
            path: backup.to_path_buf(),
            source: e,
        })?;
    }

    atomic_write(path, json.as_bytes())
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    fs::write(&tmp, bytes).map_err(|e| RstatsError::FileAccess {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| RstatsError::FileAccess {
        path: path.to_path_buf(),
        source: e,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
