use super::*;

#[test]
fn exit_codes_follow_the_error_taxonomy() {
    assert_eq!(
        exit_code_for(&RstatsError::BufferOverrun { offset: 8, len: 7 }),
        EXIT_BUFFER_OVERRUN
    );
    assert_eq!(
        exit_code_for(&RstatsError::UnsupportedSize {
            expected: 2112,
            actual: 100,
        }),
        EXIT_FORMAT_ERROR
    );
    assert_eq!(
        exit_code_for(&RstatsError::UnknownMagic { magic: 0 }),
        EXIT_FORMAT_ERROR
    );
    assert_eq!(
        exit_code_for(&RstatsError::UnsupportedSchema {
            found: 3,
            current: 2,
        }),
        EXIT_FORMAT_ERROR
    );
    assert_eq!(
        exit_code_for(&RstatsError::FileAccess {
            path: "x".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }),
        EXIT_IO_ERROR
    );
}

#[test]
fn detect_kind_uses_buffer_size() {
    assert_eq!(
        detect_kind(&[0u8; RSTATS_SIZE]).unwrap(),
        SnapshotKind::Rstats
    );
    assert_eq!(
        detect_kind(&[0u8; CSTATS_RECORD_SIZE * 2]).unwrap(),
        SnapshotKind::Cstats
    );
    assert!(matches!(
        detect_kind(&[0u8; 100]),
        Err(RstatsError::UnsupportedSize { .. })
    ));
}

#[test]
fn default_backup_appends_bak_suffix() {
    assert_eq!(
        default_backup(Path::new("traffic-history.json")),
        PathBuf::from("traffic-history.json.bak")
    );
}
