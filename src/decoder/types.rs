use chrono::NaiveDate;
use serde::Serialize;

/// Version magics recognized in the 8-byte header word ("RS00".."RS02").
pub const ID_V0: u64 = 0x3030_5352;
pub const ID_V1: u64 = 0x3130_5352;
pub const ID_V2: u64 = 0x3230_5352;

/// Daily circular-buffer slots per record.
pub const DAY_COUNT: usize = 62;
/// Monthly circular-buffer slots per record.
pub const MONTH_COUNT: usize = 25;

/// Exact size of an rstats file: magic + daily slots + daily pointer
/// + monthly slots + monthly pointer.
pub const RSTATS_SIZE: usize = 2112;

/// Fixed size of one cstats record, including the address field, the
/// per-interval throughput table and the trailing counters.
pub const CSTATS_RECORD_SIZE: usize = 13688;

/// The firmware samples RX/TX throughput every 2 minutes over 24 hours.
pub const SPEED_SAMPLE_COUNT: usize = 24 * 60 / 2;

/// Width of the client address field in a cstats record.
pub const ADDRESS_SIZE: usize = 16;

#[must_use]
pub const fn is_known_magic(magic: u64) -> bool {
    matches!(magic, ID_V0 | ID_V1 | ID_V2)
}

/// One retained counter slot: a calendar date with its cumulative
/// download/upload byte totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub date: NaiveDate,
    pub down: u64,
    pub up: u64,
}

/// The daily and monthly sections shared by both record shapes.
///
/// The write pointers index the firmware's circular buffers and are
/// informational only; they never reach the exported model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterSections {
    pub daily: Vec<StatEntry>,
    pub daily_ptr: i64,
    pub monthly: Vec<StatEntry>,
    pub monthly_ptr: i64,
}

/// A decoded rstats file: the device's own rolling counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RstatsSnapshot {
    pub version: u64,
    #[serde(flatten)]
    pub sections: CounterSections,
    #[serde(skip)]
    pub warnings: Vec<DecodeWarning>,
}

/// One per-client record of a cstats file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    pub address: String,
    pub version: u64,
    #[serde(flatten)]
    pub sections: CounterSections,
}

/// A decoded cstats file: device-level history across client addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CstatsHistory {
    pub records: Vec<DeviceRecord>,
    #[serde(skip)]
    pub warnings: Vec<DecodeWarning>,
}

/// Non-fatal structural findings surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeWarning {
    /// A record carried a magic outside the recognized set. The field
    /// layout is identical across known versions, so decoding continues.
    UnknownMagic { record: usize, magic: u64 },
    /// A record's decoded byte count differed from the fixed record size.
    RecordSizeMismatch {
        record: usize,
        decoded: usize,
        expected: usize,
    },
    /// The cursor did not land exactly on the end of the buffer.
    TrailingBytes { decoded: usize, total: usize },
}

impl std::fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMagic { record, magic } => {
                write!(f, "record {record}: unknown version magic {magic:#018x}")
            }
            Self::RecordSizeMismatch {
                record,
                decoded,
                expected,
            } => write!(
                f,
                "record {record}: decoded {decoded} bytes, expected {expected}"
            ),
            Self::TrailingBytes { decoded, total } => {
                write!(f, "decoded {decoded} of {total} bytes")
            }
        }
    }
}
