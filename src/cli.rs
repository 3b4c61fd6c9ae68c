use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::DumpFormat;

/// Record shape of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SnapshotKind {
    /// The device's own rolling counters (single fixed-size record)
    Rstats,
    /// Per-client-IP device history (sequence of fixed-size records)
    Cstats,
}

#[derive(Parser, Debug)]
#[command(name = "rstats-export")]
#[command(author, version, about = "Tomato rstats/cstats traffic counter decoder and exporter")]
#[command(long_about = "Decode Tomato firmware traffic counter snapshots and maintain a\n\
    reconciled JSON usage history.\n\n\
    Exit codes:\n  \
    0 - Success\n  \
    1 - Input file missing or unreadable\n  \
    2 - Unsupported format or schema version\n  \
    3 - Buffer overrun while decoding")]
pub struct Cli {
    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode an rstats snapshot and reconcile it with the persisted history
    Export(ExportArgs),

    /// Decode a snapshot and print its entries
    Dump(DumpArgs),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Snapshot file written by the firmware (gzip or plain)
    pub input: PathBuf,

    /// History file to read and rewrite
    #[arg(short, long, default_value = "traffic-history.json")]
    pub out: PathBuf,

    /// Backup copy of the history (defaults to <OUT>.bak)
    #[arg(long)]
    pub backup: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Snapshot file written by the firmware (gzip or plain)
    pub input: PathBuf,

    /// Output format [possible values: text, json]
    #[arg(short, long, default_value = "text")]
    pub format: DumpFormat,

    /// Force the record shape instead of detecting it from the size
    #[arg(long, value_enum)]
    pub kind: Option<SnapshotKind>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
