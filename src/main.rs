use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use clap::Parser;

use rstats_export::cli::{Cli, Commands, DumpArgs, ExportArgs, SnapshotKind};
use rstats_export::decoder::{self, CSTATS_RECORD_SIZE, DecodeWarning, RSTATS_SIZE};
use rstats_export::model::{Meta, StatsData};
use rstats_export::output::{DumpFormat, DumpFormatter, JsonFormatter, TextFormatter, export_summary};
use rstats_export::schema::{EXPORT_FORMAT_VERSION, ExportDocument};
use rstats_export::{
    EXIT_BUFFER_OVERRUN, EXIT_FORMAT_ERROR, EXIT_IO_ERROR, EXIT_SUCCESS, RstatsError, history,
    input, merge,
};

fn main() {
    let cli = Cli::parse();

    let exit_code = match &cli.command {
        Commands::Export(args) => run_export(args, &cli),
        Commands::Dump(args) => run_dump(args, &cli),
    };

    std::process::exit(exit_code);
}

const fn exit_code_for(err: &RstatsError) -> i32 {
    match err {
        RstatsError::BufferOverrun { .. } => EXIT_BUFFER_OVERRUN,
        RstatsError::UnsupportedSize { .. }
        | RstatsError::UnknownMagic { .. }
        | RstatsError::UnsupportedSchema { .. }
        | RstatsError::Json(_) => EXIT_FORMAT_ERROR,
        RstatsError::FileAccess { .. } | RstatsError::Io(_) => EXIT_IO_ERROR,
    }
}

fn run_export(args: &ExportArgs, cli: &Cli) -> i32 {
    match run_export_impl(args, cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code_for(&e)
        }
    }
}

fn run_export_impl(args: &ExportArgs, cli: &Cli) -> rstats_export::Result<i32> {
    // 1. Read and decode the snapshot; any failure here aborts before
    //    the persisted history is touched
    let buf = input::read_snapshot(&args.input)?;
    let snapshot = decoder::decode_rstats(&buf)?;
    print_warnings(&snapshot.warnings, cli.quiet);
    if cli.verbose > 0 {
        eprintln!(
            "Decoded {} daily and {} monthly entries from {}",
            snapshot.sections.daily.len(),
            snapshot.sections.monthly.len(),
            args.input.display()
        );
    }

    // 2. Build the model for this run
    let run_started = Local::now().naive_local();
    let meta = Meta {
        format: EXPORT_FORMAT_VERSION,
        source_mtime: input::modification_time(&args.input),
        run_time: Some(Utc::now()),
    };
    let mut stats = StatsData::from_snapshot(&snapshot, meta, run_started);

    // 3. Load prior history (primary, then backup, then empty)
    let backup = args
        .backup
        .clone()
        .unwrap_or_else(|| default_backup(&args.out));
    let loaded = history::load_previous(&args.out, &backup)?;
    if !cli.quiet {
        for warning in &loaded.warnings {
            eprintln!("Warning: {warning}");
        }
    }

    // 4. Reconcile and write
    if let Some(previous) = &loaded.document {
        if cli.verbose > 0 {
            eprintln!(
                "Merging {} daily and {} monthly entries from the previous export",
                previous.daily.len(),
                previous.monthly.len()
            );
        }
        merge::merge_previous(&mut stats, previous, run_started);
    }
    let document = ExportDocument::from_stats(&stats);
    history::save(&document, &args.out, &backup)?;

    if !cli.quiet {
        println!("{}", export_summary(&document, &args.out));
    }
    Ok(EXIT_SUCCESS)
}

fn run_dump(args: &DumpArgs, cli: &Cli) -> i32 {
    match run_dump_impl(args, cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code_for(&e)
        }
    }
}

fn run_dump_impl(args: &DumpArgs, cli: &Cli) -> rstats_export::Result<i32> {
    let buf = input::read_snapshot(&args.input)?;
    let kind = match args.kind {
        Some(kind) => kind,
        None => detect_kind(&buf)?,
    };

    let formatter: &dyn DumpFormatter = match args.format {
        DumpFormat::Text => &TextFormatter,
        DumpFormat::Json => &JsonFormatter,
    };

    let output = match kind {
        SnapshotKind::Rstats => {
            let snapshot = decoder::decode_rstats(&buf)?;
            print_warnings(&snapshot.warnings, cli.quiet);
            formatter.format_rstats(&snapshot)?
        }
        SnapshotKind::Cstats => {
            let history = decoder::decode_cstats(&buf)?;
            print_warnings(&history.warnings, cli.quiet);
            formatter.format_cstats(&history)?
        }
    };

    print!("{output}");
    Ok(EXIT_SUCCESS)
}

/// Pick the record shape from the buffer size. An rstats file has one
/// exact size; anything at least one cstats record long is treated as
/// cstats.
fn detect_kind(buf: &[u8]) -> rstats_export::Result<SnapshotKind> {
    if buf.len() == RSTATS_SIZE {
        Ok(SnapshotKind::Rstats)
    } else if buf.len() >= CSTATS_RECORD_SIZE {
        Ok(SnapshotKind::Cstats)
    } else {
        Err(RstatsError::UnsupportedSize {
            expected: RSTATS_SIZE,
            actual: buf.len(),
        })
    }
}

fn print_warnings(warnings: &[DecodeWarning], quiet: bool) {
    if quiet {
        return;
    }
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

fn default_backup(out: &Path) -> PathBuf {
    let mut name = out.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
