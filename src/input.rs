//! Snapshot file opening. The firmware's backup files come gzipped;
//! plain buffers pass through untouched so locally unpacked files work
//! as well.

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;

use crate::{Result, RstatsError};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read a snapshot file into memory, transparently decompressing
/// gzip input.
///
/// # Errors
/// Returns [`RstatsError::FileAccess`] if the file is missing,
/// unreadable or the gzip stream is truncated.
pub fn read_snapshot(path: &Path) -> Result<Vec<u8>> {
    let raw = fs::read(path).map_err(|e| RstatsError::FileAccess {
        path: path.to_path_buf(),
        source: e,
    })?;

    if !raw.starts_with(&GZIP_MAGIC) {
        return Ok(raw);
    }

    let mut decoded = Vec::new();
    GzDecoder::new(raw.as_slice())
        .read_to_end(&mut decoded)
        .map_err(|e| RstatsError::FileAccess {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(decoded)
}

/// Modification time of the source file for the export metadata.
/// Unavailable timestamps (exotic filesystems) are simply omitted.
#[must_use]
pub fn modification_time(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
