#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

/// Creates an `assert_cmd` Command for the rstats-export binary.
#[macro_export]
macro_rules! rstats_export {
    () => {
        assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("rstats-export"))
    };
}

use rstats_export::codec::encode_packed_date;
use rstats_export::decoder::{
    ADDRESS_SIZE, CSTATS_RECORD_SIZE, DAY_COUNT, ID_V1, MONTH_COUNT, RSTATS_SIZE,
    SPEED_SAMPLE_COUNT,
};

/// One populated slot for a synthetic buffer.
#[derive(Clone, Copy)]
pub struct Slot {
    pub date: NaiveDate,
    pub down: u64,
    pub up: u64,
}

impl Slot {
    pub fn new(date: NaiveDate, down: u64, up: u64) -> Self {
        Self { date, down, up }
    }
}

fn push_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_slots(buf: &mut Vec<u8>, slots: &[Slot], count: usize) {
    for index in 0..count {
        match slots.get(index) {
            Some(slot) => {
                push_u64(buf, encode_packed_date(slot.date));
                push_u64(buf, slot.down);
                push_u64(buf, slot.up);
            }
            None => {
                push_u64(buf, 0);
                push_u64(buf, 0);
                push_u64(buf, 0);
            }
        }
    }
}

/// Build an exact-size rstats buffer with the given leading slots; the
/// remaining slots stay zeroed (unused).
pub fn rstats_buffer(magic: u64, daily: &[Slot], monthly: &[Slot]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(RSTATS_SIZE);
    push_u64(&mut buf, magic);
    push_slots(&mut buf, daily, DAY_COUNT);
    push_u64(&mut buf, 0);
    push_slots(&mut buf, monthly, MONTH_COUNT);
    push_u64(&mut buf, 0);
    assert_eq!(buf.len(), RSTATS_SIZE);
    buf
}

/// Build one exact-size cstats record.
pub fn cstats_record(address: &str, magic: u64, daily: &[Slot]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(CSTATS_RECORD_SIZE);
    let mut addr = [0u8; ADDRESS_SIZE];
    addr[..address.len()].copy_from_slice(address.as_bytes());
    buf.extend_from_slice(&addr);
    push_u64(&mut buf, magic);
    push_slots(&mut buf, daily, DAY_COUNT);
    push_u64(&mut buf, 0);
    push_slots(&mut buf, &[], MONTH_COUNT);
    push_u64(&mut buf, 0);
    push_u64(&mut buf, 0); // utime
    push_u64(&mut buf, 0); // tail
    for _ in 0..SPEED_SAMPLE_COUNT {
        push_u64(&mut buf, 0);
        push_u64(&mut buf, 0);
    }
    push_u64(&mut buf, 0); // last1
    push_u64(&mut buf, 0); // last2
    push_u64(&mut buf, 0); // sync
    assert_eq!(buf.len(), CSTATS_RECORD_SIZE);
    buf
}

pub fn default_rstats(daily: &[Slot]) -> Vec<u8> {
    rstats_buffer(ID_V1, daily, &[])
}

/// Temp directory with helpers for snapshot and history files.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, bytes).expect("Failed to write file");
        path
    }

    pub fn write_gzip(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).expect("Failed to compress");
        self.write_file(name, &encoder.finish().expect("Failed to finish gzip"))
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.path().join("traffic-history.json")
    }

    pub fn read_history(&self) -> serde_json::Value {
        let raw = fs::read_to_string(self.history_path()).expect("Failed to read history");
        serde_json::from_str(&raw).expect("History is not valid JSON")
    }
}
