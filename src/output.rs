//! Console output: CSV-style dump formatting for decoded snapshots and
//! the one-line summary printed after a successful export.

use std::fmt::Write;

use crate::Result;
use crate::decoder::{CounterSections, CstatsHistory, RstatsSnapshot};
use crate::schema::ExportDocument;

/// Trait for formatting decoded snapshots into various output formats.
pub trait DumpFormatter {
    /// # Errors
    /// Returns an error if the formatting fails.
    fn format_rstats(&self, snapshot: &RstatsSnapshot) -> Result<String>;

    /// # Errors
    /// Returns an error if the formatting fails.
    fn format_cstats(&self, history: &CstatsHistory) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for DumpFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

pub struct TextFormatter;

impl DumpFormatter for TextFormatter {
    fn format_rstats(&self, snapshot: &RstatsSnapshot) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "Version: {}", snapshot.version);
        format_sections(&mut out, &snapshot.sections);
        Ok(out)
    }

    fn format_cstats(&self, history: &CstatsHistory) -> Result<String> {
        let mut out = String::new();
        for (index, record) in history.records.iter().enumerate() {
            let _ = writeln!(out, "Record {index}");
            let _ = writeln!(out, "IP Address: {}", record.address);
            let _ = writeln!(out, "Version: {}", record.version);
            format_sections(&mut out, &record.sections);
        }
        Ok(out)
    }
}

fn format_sections(out: &mut String, sections: &CounterSections) {
    out.push_str("---------- Daily ----------\n");
    out.push_str("Date (yyyy/mm/dd),Down (bytes),Up (bytes)\n");
    for entry in &sections.daily {
        let _ = writeln!(
            out,
            "{},{},{}",
            entry.date.format("%Y/%m/%d"),
            entry.down,
            entry.up
        );
    }
    let _ = writeln!(out, "dailyp: {}", sections.daily_ptr);

    out.push_str("---------- Monthly ----------\n");
    out.push_str("Date (yyyy/mm/dd),Down (bytes),Up (bytes)\n");
    for entry in &sections.monthly {
        let _ = writeln!(
            out,
            "{},{},{}",
            entry.date.format("%Y/%m/%d"),
            entry.down,
            entry.up
        );
    }
    let _ = writeln!(out, "monthlyp: {}", sections.monthly_ptr);
}

pub struct JsonFormatter;

impl DumpFormatter for JsonFormatter {
    fn format_rstats(&self, snapshot: &RstatsSnapshot) -> Result<String> {
        let json = serde_json::to_string_pretty(snapshot)?;
        Ok(format!("{json}\n"))
    }

    fn format_cstats(&self, history: &CstatsHistory) -> Result<String> {
        let json = serde_json::to_string_pretty(history)?;
        Ok(format!("{json}\n"))
    }
}

/// One-line result summary for the export command.
#[must_use]
pub fn export_summary(document: &ExportDocument, path: &std::path::Path) -> String {
    format!(
        "Exported {} daily and {} monthly entries to {}",
        document.daily.len(),
        document.monthly.len(),
        path.display()
    )
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
