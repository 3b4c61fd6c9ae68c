//! Packed calendar-date codec used throughout the rstats/cstats binary format.
//!
//! The firmware stores a date in the low 24 bits of a 64-bit word:
//! bits 16-23 hold the year offset from 1900, bits 8-15 the zero-based
//! month, and bits 0-7 the day of month. Monthly buckets store day 0,
//! which collapses to the first of the month on decode.

use chrono::{Datelike, NaiveDate};

/// Year base of the packed encoding. A decoded year at or below this
/// value marks an unused circular-buffer slot.
pub const EPOCH_YEAR: i32 = 1900;

/// Decode a packed date word into a calendar date.
///
/// Returns `None` when the month/day combination is not a valid date
/// (the firmware never emits one, but the buffer is untrusted input).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn decode_packed_date(packed: u64) -> Option<NaiveDate> {
    let year = ((packed >> 16) & 0xFF) as i32 + EPOCH_YEAR;
    let month = ((packed >> 8) & 0xFF) as u32 + 1;
    let day = (packed & 0xFF) as u32;
    let day = if day == 0 { 1 } else { day };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Encode a calendar date into the packed representation.
///
/// Exact inverse of [`decode_packed_date`] except for the lossy day-0
/// normalization: a date with day 1 cannot be told apart from an
/// original day-0 (monthly bucket) word. Provided for round-trip
/// testing; only the firmware produces this encoding in the wild.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn encode_packed_date(date: NaiveDate) -> u64 {
    let year = ((date.year() - EPOCH_YEAR) as u64) & 0xFF;
    let month = u64::from(date.month() - 1);
    let day = u64::from(date.day());
    (year << 16) | (month << 8) | day
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
