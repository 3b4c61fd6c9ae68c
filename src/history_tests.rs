use std::fs;

use tempfile::TempDir;

use crate::RstatsError;
use crate::model::{DataPoint, Meta};
use crate::schema::{EXPORT_FORMAT_VERSION, ExportDocument, ExportedPoint};

use super::*;

fn sample_doc(down: i64) -> ExportDocument {
    ExportDocument {
        meta: Meta {
            format: EXPORT_FORMAT_VERSION,
            source_mtime: None,
            run_time: None,
        },
        daily: vec![ExportedPoint {
            date: chrono::NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
            point: DataPoint {
                down,
                up: 500,
                comment: None,
            },
        }],
        monthly: Vec::new(),
    }
}

#[test]
fn load_missing_files_yields_empty_history() {
    let temp = TempDir::new().unwrap();
    let loaded = load_previous(
        &temp.path().join("history.json"),
        &temp.path().join("history.json.bak"),
    )
    .unwrap();
    assert!(loaded.document.is_none());
    assert!(loaded.warnings.is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");
    let backup = temp.path().join("history.json.bak");

    let doc = sample_doc(1000);
    save(&doc, &path, &backup).unwrap();

    let loaded = load_previous(&path, &backup).unwrap();
    assert_eq!(loaded.document.unwrap(), doc);
    assert!(loaded.warnings.is_empty());
}

#[test]
fn save_copies_existing_file_to_backup() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");
    let backup = temp.path().join("history.json.bak");

    save(&sample_doc(100), &path, &backup).unwrap();
    save(&sample_doc(200), &path, &backup).unwrap();

    let loaded = load_previous(&path, &backup).unwrap();
    assert_eq!(loaded.document.unwrap().daily[0].point.down, 200);

    let from_backup = load_previous(&backup, &path).unwrap();
    assert_eq!(from_backup.document.unwrap().daily[0].point.down, 100);
}

#[test]
fn corrupt_primary_falls_back_to_backup() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");
    let backup = temp.path().join("history.json.bak");

    fs::write(&path, "{ not json").unwrap();
    fs::write(&backup, serde_json::to_string(&sample_doc(900)).unwrap()).unwrap();

    let loaded = load_previous(&path, &backup).unwrap();
    assert_eq!(loaded.document.unwrap().daily[0].point.down, 900);
    assert_eq!(loaded.warnings.len(), 1);
    assert!(loaded.warnings[0].contains("history.json"));
}

#[test]
fn both_copies_corrupt_degrades_to_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");
    let backup = temp.path().join("history.json.bak");

    fs::write(&path, "{ not json").unwrap();
    fs::write(&backup, "also not json").unwrap();

    let loaded = load_previous(&path, &backup).unwrap();
    assert!(loaded.document.is_none());
    assert_eq!(loaded.warnings.len(), 2);
}

#[test]
fn future_schema_version_is_fatal_not_degraded() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");
    let backup = temp.path().join("history.json.bak");

    fs::write(&path, r#"{"meta": {"format": 9}, "daily": [], "monthly": []}"#).unwrap();

    let err = load_previous(&path, &backup).unwrap_err();
    assert!(matches!(
        err,
        RstatsError::UnsupportedSchema {
            found: 9,
            current: EXPORT_FORMAT_VERSION,
        }
    ));
}

#[test]
fn untagged_history_is_migrated_on_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");

    fs::write(
        &path,
        r#"{
            "meta": {},
            "daily": [
                {"date": "2023-06-15", "down": -1, "up": 500,
                 "comment": {"message": "corrupted", "cutoff_down": "23:05"}}
            ],
            "monthly": []
        }"#,
    )
    .unwrap();

    let loaded = load_previous(&path, &temp.path().join("none.bak")).unwrap();
    let doc = loaded.document.unwrap();
    assert_eq!(doc.meta.format, EXPORT_FORMAT_VERSION);
    let comment = doc.daily[0].point.comment.as_ref().unwrap();
    assert_eq!(comment.cutoff_down, chrono::NaiveTime::from_hms_opt(23, 5, 0));
}

#[test]
fn atomic_write_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.json");
    let backup = temp.path().join("history.json.bak");

    save(&sample_doc(1), &path, &backup).unwrap();

    assert!(path.exists());
    assert!(!temp.path().join("history.json.tmp").exists());
}
