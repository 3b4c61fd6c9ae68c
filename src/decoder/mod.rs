//! Binary decoder for the two on-disk record shapes written by the
//! Tomato firmware: rstats (the device's own rolling counters, one
//! fixed-size record) and cstats (per-client history, a sequence of
//! fixed-size records).
//!
//! All multi-byte fields are little-endian as emitted by the device.
//! The decoder never reads past the buffer; an overrun is fatal for the
//! whole run because slot alignment of everything that follows would be
//! unrecoverable.

mod types;

pub use types::{
    ADDRESS_SIZE, CSTATS_RECORD_SIZE, CounterSections, CstatsHistory, DAY_COUNT, DecodeWarning,
    DeviceRecord, ID_V0, ID_V1, ID_V2, MONTH_COUNT, RSTATS_SIZE, RstatsSnapshot, SPEED_SAMPLE_COUNT,
    StatEntry, is_known_magic,
};

use chrono::Datelike;

use crate::codec::{EPOCH_YEAR, decode_packed_date};
use crate::{Result, RstatsError};

/// Monotonically advancing read cursor over an in-memory buffer.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    const fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, width: usize) -> Result<&'a [u8]> {
        let end = self.pos + width;
        if end > self.buf.len() {
            return Err(RstatsError::BufferOverrun {
                offset: end,
                len: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(raw))
    }

    fn read_i64(&mut self) -> Result<i64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(raw))
    }

    /// Read one 24-byte counter slot, dropping unused slots (year at or
    /// below the 1900 epoch, or a date the codec rejects).
    fn read_entry(&mut self) -> Result<Option<StatEntry>> {
        let packed = self.read_u64()?;
        let down = self.read_u64()?;
        let up = self.read_u64()?;
        Ok(decode_packed_date(packed)
            .filter(|date| date.year() > EPOCH_YEAR)
            .map(|date| StatEntry { date, down, up }))
    }

    fn read_sections(&mut self) -> Result<CounterSections> {
        let mut daily = Vec::with_capacity(DAY_COUNT);
        for _ in 0..DAY_COUNT {
            if let Some(entry) = self.read_entry()? {
                daily.push(entry);
            }
        }
        let daily_ptr = self.read_i64()?;

        let mut monthly = Vec::with_capacity(MONTH_COUNT);
        for _ in 0..MONTH_COUNT {
            if let Some(entry) = self.read_entry()? {
                monthly.push(entry);
            }
        }
        let monthly_ptr = self.read_i64()?;

        Ok(CounterSections {
            daily,
            daily_ptr,
            monthly,
            monthly_ptr,
        })
    }
}

/// Decode an rstats buffer (the single-record shape).
///
/// # Errors
/// - [`RstatsError::UnsupportedSize`] unless the buffer is exactly
///   [`RSTATS_SIZE`] bytes; checked before any decoding.
/// - [`RstatsError::UnknownMagic`] for an unrecognized version word.
/// - [`RstatsError::BufferOverrun`] if a read would pass the end.
pub fn decode_rstats(buf: &[u8]) -> Result<RstatsSnapshot> {
    if buf.len() != RSTATS_SIZE {
        return Err(RstatsError::UnsupportedSize {
            expected: RSTATS_SIZE,
            actual: buf.len(),
        });
    }

    let mut reader = Reader::new(buf);
    let version = reader.read_u64()?;
    if !is_known_magic(version) {
        return Err(RstatsError::UnknownMagic { magic: version });
    }

    let sections = reader.read_sections()?;

    let mut warnings = Vec::new();
    if reader.position() != buf.len() {
        warnings.push(DecodeWarning::TrailingBytes {
            decoded: reader.position(),
            total: buf.len(),
        });
    }

    Ok(RstatsSnapshot {
        version,
        sections,
        warnings,
    })
}

/// Decode a cstats buffer (the multi-record shape).
///
/// Decodes `len / CSTATS_RECORD_SIZE` records. Trailing slack, per-record
/// size drift and unrecognized magics are reported as warnings rather
/// than failing the run; truncation mid-record still surfaces as a
/// fatal [`RstatsError::BufferOverrun`].
///
/// # Errors
/// Returns [`RstatsError::BufferOverrun`] if a read would pass the end
/// of the buffer.
pub fn decode_cstats(buf: &[u8]) -> Result<CstatsHistory> {
    let count = buf.len() / CSTATS_RECORD_SIZE;
    let mut reader = Reader::new(buf);
    let mut records = Vec::with_capacity(count);
    let mut warnings = Vec::new();

    for index in 0..count {
        let start = reader.position();
        let record = decode_cstats_record(&mut reader, index, &mut warnings)?;
        let decoded = reader.position() - start;
        if decoded != CSTATS_RECORD_SIZE {
            warnings.push(DecodeWarning::RecordSizeMismatch {
                record: index,
                decoded,
                expected: CSTATS_RECORD_SIZE,
            });
        }
        records.push(record);
    }

    if reader.position() != buf.len() {
        warnings.push(DecodeWarning::TrailingBytes {
            decoded: reader.position(),
            total: buf.len(),
        });
    }

    Ok(CstatsHistory { records, warnings })
}

fn decode_cstats_record(
    reader: &mut Reader<'_>,
    index: usize,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<DeviceRecord> {
    let address = read_address(reader)?;

    let version = reader.read_u64()?;
    if !is_known_magic(version) {
        warnings.push(DecodeWarning::UnknownMagic {
            record: index,
            magic: version,
        });
    }

    let sections = reader.read_sections()?;

    // utime and tail
    reader.read_i64()?;
    reader.read_i64()?;
    // per-interval RX/TX throughput table, consumed for alignment only
    for _ in 0..SPEED_SAMPLE_COUNT {
        reader.read_u64()?;
        reader.read_u64()?;
    }
    // last1, last2, sync
    reader.read_u64()?;
    reader.read_u64()?;
    reader.read_i64()?;

    Ok(DeviceRecord {
        address,
        version,
        sections,
    })
}

fn read_address(reader: &mut Reader<'_>) -> Result<String> {
    let raw = reader.take(ADDRESS_SIZE)?;
    Ok(String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .to_string())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
