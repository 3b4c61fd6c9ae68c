//! Versioned on-disk export document and the forward migration chain.
//!
//! The export is a JSON document with a `meta` block and two
//! date-sorted collections. The schema version lives in `meta.format`;
//! a document without the tag was written by the oldest shipped schema,
//! which stored cutoffs as free-form strings. Migrations are pure
//! functions from one version to the next, chained forward until the
//! current version is reached. Future versions are refused outright.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Comment, DataPoint, Meta, StatsData};
use crate::{Result, RstatsError};

/// Schema version this build reads and writes.
pub const EXPORT_FORMAT_VERSION: u32 = 2;

/// One exported point: the map key flattened next to its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub point: DataPoint,
}

/// The current (version 2) export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub meta: Meta,
    pub daily: Vec<ExportedPoint>,
    pub monthly: Vec<ExportedPoint>,
}

impl ExportDocument {
    /// Serialize the model into export shape. `BTreeMap` iteration
    /// already yields ascending dates, the order the export requires.
    #[must_use]
    pub fn from_stats(stats: &StatsData) -> Self {
        Self {
            meta: stats.meta.clone(),
            daily: collect_points(&stats.daily),
            monthly: collect_points(&stats.monthly),
        }
    }
}

fn collect_points(points: &BTreeMap<NaiveDate, DataPoint>) -> Vec<ExportedPoint> {
    points
        .iter()
        .map(|(date, point)| ExportedPoint {
            date: *date,
            point: point.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Version 1 (untagged): cutoffs were free-form strings.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaV1 {
    #[serde(default)]
    pub source_mtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub run_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentV1 {
    pub message: String,
    #[serde(default)]
    pub cutoff_down: Option<String>,
    #[serde(default)]
    pub cutoff_up: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointV1 {
    pub date: NaiveDate,
    pub down: i64,
    pub up: i64,
    #[serde(default)]
    pub comment: Option<CommentV1>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportV1 {
    #[serde(default)]
    pub meta: MetaV1,
    #[serde(default)]
    pub daily: Vec<PointV1>,
    #[serde(default)]
    pub monthly: Vec<PointV1>,
}

/// A parsed export of any supported schema version.
#[derive(Debug, Clone)]
pub enum VersionedExport {
    V1(ExportV1),
    V2(ExportDocument),
}

/// Parse a raw JSON value into the schema version its tag declares.
///
/// # Errors
/// - [`RstatsError::UnsupportedSchema`] when `meta.format` exceeds
///   [`EXPORT_FORMAT_VERSION`].
/// - [`RstatsError::Json`] when the document does not match the
///   declared schema.
pub fn parse_versioned(value: Value) -> Result<VersionedExport> {
    let format = value
        .get("meta")
        .and_then(|meta| meta.get("format"))
        .and_then(Value::as_u64);

    match format {
        None | Some(1) => Ok(VersionedExport::V1(serde_json::from_value(value)?)),
        Some(2) => Ok(VersionedExport::V2(serde_json::from_value(value)?)),
        Some(found) => Err(RstatsError::UnsupportedSchema {
            found: u32::try_from(found).unwrap_or(u32::MAX),
            current: EXPORT_FORMAT_VERSION,
        }),
    }
}

/// Upgrade a parsed export to the current schema, one version step at
/// a time. Already-current input passes through untouched.
#[must_use]
pub fn migrate(export: VersionedExport) -> ExportDocument {
    match export {
        VersionedExport::V1(v1) => migrate_v1_to_v2(v1),
        VersionedExport::V2(doc) => doc,
    }
}

fn migrate_v1_to_v2(v1: ExportV1) -> ExportDocument {
    ExportDocument {
        meta: Meta {
            format: EXPORT_FORMAT_VERSION,
            source_mtime: v1.meta.source_mtime,
            run_time: v1.meta.run_time,
        },
        daily: v1.daily.into_iter().map(migrate_point_v1).collect(),
        monthly: v1.monthly.into_iter().map(migrate_point_v1).collect(),
    }
}

fn migrate_point_v1(point: PointV1) -> ExportedPoint {
    ExportedPoint {
        date: point.date,
        point: DataPoint {
            down: point.down,
            up: point.up,
            comment: point.comment.map(|comment| Comment {
                message: comment.message,
                cutoff_down: comment.cutoff_down.as_deref().and_then(parse_cutoff),
                cutoff_up: comment.cutoff_up.as_deref().and_then(parse_cutoff),
            }),
        },
    }
}

/// Version 1 stored cutoffs as strings; an unparsable one degrades to
/// "no cutoff" and the point simply stays flagged.
fn parse_cutoff(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
