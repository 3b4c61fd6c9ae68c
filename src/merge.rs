//! Reconciles the current run's model with the previously persisted
//! export (already migrated to the current schema).
//!
//! Counters are monotonically non-decreasing over a device's uptime, so
//! two partial observations of the same bucket merge with an
//! elementwise maximum, except that a previous daily entry whose
//! correction window is still open freezes its value: a still-corrupted
//! fresh reading must not overwrite the last trusted one. The merge is
//! idempotent: applying the same previous export twice changes nothing.

use std::collections::btree_map::Entry;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::{CORRUPTION_MESSAGE, Comment, DataPoint, SENTINEL, StatsData, in_correction_window};
use crate::schema::ExportDocument;

/// Merge the previous export into `current` in place.
pub fn merge_previous(current: &mut StatsData, previous: &ExportDocument, run_started: NaiveDateTime) {
    let today = run_started.date();

    for prev in &previous.daily {
        match current.daily.entry(prev.date) {
            // the firmware's circular buffer evicted this slot; keep history
            Entry::Vacant(slot) => {
                slot.insert(prev.point.clone());
            }
            Entry::Occupied(mut slot) => {
                let merged = merge_daily(slot.get(), &prev.point, prev.date, today);
                slot.insert(merged);
            }
        }
    }

    for prev in &previous.monthly {
        match current.monthly.entry(prev.date) {
            Entry::Vacant(slot) => {
                slot.insert(prev.point.clone());
            }
            Entry::Occupied(mut slot) => {
                let merged = merge_monthly(slot.get(), &prev.point);
                slot.insert(merged);
            }
        }
    }
}

/// Elementwise maximum where the sentinel loses to any real value.
#[must_use]
pub const fn max_lenient(a: i64, b: i64) -> i64 {
    match (a == SENTINEL, b == SENTINEL) {
        (true, true) => SENTINEL,
        (true, false) => b,
        (false, true) => a,
        (false, false) => {
            if a >= b { a } else { b }
        }
    }
}

fn merge_daily(current: &DataPoint, previous: &DataPoint, date: NaiveDate, today: NaiveDate) -> DataPoint {
    let window_open = in_correction_window(date, today);

    let (down, cutoff_down) = merge_direction(
        current.down,
        cutoff_down(current),
        previous.down,
        cutoff_down(previous),
        window_open,
    );
    let (up, cutoff_up) = merge_direction(
        current.up,
        cutoff_up(current),
        previous.up,
        cutoff_up(previous),
        window_open,
    );

    let comment = rebuild_comment(down, up, cutoff_down, cutoff_up, previous, current);
    DataPoint { down, up, comment }
}

fn merge_monthly(current: &DataPoint, previous: &DataPoint) -> DataPoint {
    let down = max_lenient(previous.down, current.down);
    let up = max_lenient(previous.up, current.up);
    let comment = rebuild_comment(down, up, None, None, previous, current);
    DataPoint { down, up, comment }
}

/// One direction of a daily merge.
///
/// An open previous cutoff freezes the previous value and carries the
/// cutoff forward unchanged. Otherwise the values max-merge; a stale
/// previous cutoff (entry older than yesterday) is dropped and only the
/// current point's own cutoff survives.
fn merge_direction(
    cur: i64,
    cur_cutoff: Option<NaiveTime>,
    prev: i64,
    prev_cutoff: Option<NaiveTime>,
    window_open: bool,
) -> (i64, Option<NaiveTime>) {
    if window_open && prev_cutoff.is_some() {
        (prev, prev_cutoff)
    } else {
        (max_lenient(prev, cur), cur_cutoff)
    }
}

/// A merged point needs a comment while some field is the sentinel or
/// some cutoff is still open. The message documents history, so the
/// previous comment's message wins over the current one.
fn rebuild_comment(
    down: i64,
    up: i64,
    cutoff_down: Option<NaiveTime>,
    cutoff_up: Option<NaiveTime>,
    previous: &DataPoint,
    current: &DataPoint,
) -> Option<Comment> {
    let needed =
        down == SENTINEL || up == SENTINEL || cutoff_down.is_some() || cutoff_up.is_some();
    if !needed {
        return None;
    }

    let message = previous
        .comment
        .as_ref()
        .or(current.comment.as_ref())
        .map_or_else(|| CORRUPTION_MESSAGE.to_string(), |c| c.message.clone());

    Some(Comment {
        message,
        cutoff_down,
        cutoff_up,
    })
}

fn cutoff_down(point: &DataPoint) -> Option<NaiveTime> {
    point.comment.as_ref().and_then(|c| c.cutoff_down)
}

fn cutoff_up(point: &DataPoint) -> Option<NaiveTime> {
    point.comment.as_ref().and_then(|c| c.cutoff_up)
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
