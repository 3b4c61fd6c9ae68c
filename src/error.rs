use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RstatsError {
    #[error("Failed to read file: {path}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported input size: {actual} bytes (expected {expected})")]
    UnsupportedSize { expected: usize, actual: usize },

    #[error("Unrecognized version magic: {magic:#018x}")]
    UnknownMagic { magic: u64 },

    #[error("Reached end of the buffer: {offset}/{len}")]
    BufferOverrun { offset: usize, len: usize },

    #[error("History schema version {found} is newer than supported version {current}")]
    UnsupportedSchema { found: u32, current: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RstatsError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
