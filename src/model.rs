//! Canonical in-memory representation of one run's traffic history:
//! daily and monthly [`DataPoint`]s keyed by calendar date, plus the
//! run metadata carried into the export.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::decoder::{RstatsSnapshot, StatEntry};

/// One pebibyte. No consumer counter plausibly reaches this magnitude,
/// so a larger reading signals a decode or firmware glitch.
pub const BYTE_CEILING: u64 = 1 << 50;

/// Placeholder stored for an implausible counter reading.
pub const SENTINEL: i64 = -1;

/// Default message attached when a reading is replaced by the sentinel.
pub const CORRUPTION_MESSAGE: &str = "implausible counter reading dropped";

/// Annotation for a corrupted or still-correctable point.
///
/// A cutoff marks the last time-of-day in the current polling window
/// considered trustworthy for that direction. While the cutoff is open
/// the point sits inside the live correction window and later runs may
/// still repair it; a flagged point without a cutoff is permanent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_down: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_up: Option<NaiveTime>,
}

/// Normalized traffic totals for one day or month.
///
/// Invariant: a [`SENTINEL`] field always has a comment explaining it,
/// and a comment exists only while some field is the sentinel or some
/// cutoff is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub down: i64,
    pub up: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
}

impl DataPoint {
    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        self.down == SENTINEL || self.up == SENTINEL
    }
}

/// Run metadata serialized into the export's `meta` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub format: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_mtime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<DateTime<Utc>>,
}

/// Aggregate root for one run. Constructed fresh from a decoded
/// snapshot, mutated in place by the merger, serialized once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsData {
    pub meta: Meta,
    pub daily: BTreeMap<NaiveDate, DataPoint>,
    pub monthly: BTreeMap<NaiveDate, DataPoint>,
}

impl StatsData {
    #[must_use]
    pub const fn new(meta: Meta) -> Self {
        Self {
            meta,
            daily: BTreeMap::new(),
            monthly: BTreeMap::new(),
        }
    }

    /// Build the model from a decoded rstats snapshot.
    ///
    /// `run_started` is the wall-clock start of this run, used both for
    /// the recent-corruption window and the cutoff approximation.
    #[must_use]
    pub fn from_snapshot(snapshot: &RstatsSnapshot, meta: Meta, run_started: NaiveDateTime) -> Self {
        let mut data = Self::new(meta);
        for entry in &snapshot.sections.daily {
            data.daily.insert(entry.date, daily_point(entry, run_started));
        }
        for entry in &snapshot.sections.monthly {
            data.monthly.insert(month_key(entry.date), monthly_point(entry));
        }
        data
    }
}

/// Monthly buckets collapse onto the first of the month.
#[must_use]
pub fn month_key(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// A daily entry dated today or yesterday is still inside the live
/// correction window; anything older is assumed uncorrectable.
#[must_use]
pub fn in_correction_window(date: NaiveDate, today: NaiveDate) -> bool {
    let yesterday = today.pred_opt().unwrap_or(today);
    date >= yesterday
}

/// Replace an over-ceiling reading with the sentinel. Returns the
/// stored value and whether it was replaced.
const fn sanitize(value: u64) -> (i64, bool) {
    if value > BYTE_CEILING {
        (SENTINEL, true)
    } else {
        // anything at or below the ceiling fits in i64
        #[allow(clippy::cast_possible_wrap)]
        (value as i64, false)
    }
}

fn daily_point(entry: &StatEntry, run_started: NaiveDateTime) -> DataPoint {
    let (down, bad_down) = sanitize(entry.down);
    let (up, bad_up) = sanitize(entry.up);

    let comment = if bad_down || bad_up {
        let cutoff = recent_cutoff(entry.date, run_started);
        Some(Comment {
            message: CORRUPTION_MESSAGE.to_string(),
            cutoff_down: if bad_down { cutoff } else { None },
            cutoff_up: if bad_up { cutoff } else { None },
        })
    } else {
        None
    };

    DataPoint { down, up, comment }
}

fn monthly_point(entry: &StatEntry) -> DataPoint {
    let (down, bad_down) = sanitize(entry.down);
    let (up, bad_up) = sanitize(entry.up);

    let comment = (bad_down || bad_up).then(|| Comment {
        message: CORRUPTION_MESSAGE.to_string(),
        cutoff_down: None,
        cutoff_up: None,
    });

    DataPoint { down, up, comment }
}

/// Approximate the last trustworthy poll as one hour before this run
/// started; only entries still inside the correction window get one.
fn recent_cutoff(date: NaiveDate, run_started: NaiveDateTime) -> Option<NaiveTime> {
    if in_correction_window(date, run_started.date()) {
        Some(
            run_started
                .checked_sub_signed(TimeDelta::hours(1))
                .unwrap_or(run_started)
                .time(),
        )
    } else {
        None
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
