//! End-to-end decoding tests over in-memory PIRATA documents
//!
//! Each test feeds a complete file through `decode` and checks the
//! resulting metadata, table and issue list together.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pirata_processor::constants::DATETIME_COLUMN;
use pirata_processor::header::apply_depth_suffixes;
use pirata_processor::table::is_flag_column;
use pirata_processor::{DecodeIssue, DecodedFile, PirataFileName, Severity, StationTable, decode};
use polars::prelude::*;

fn decode_text(text: &str) -> DecodedFile {
    decode(text.as_bytes().to_vec()).expect("document should decode")
}

fn values(frame: &DataFrame, column: &str) -> Vec<Option<f64>> {
    frame
        .column(column)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn timestamps(frame: &DataFrame) -> Vec<NaiveDateTime> {
    let millis = frame
        .column(DATETIME_COLUMN)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Int64)
        .unwrap();
    millis
        .i64()
        .unwrap()
        .into_iter()
        .map(|ms| DateTime::from_timestamp_millis(ms.unwrap()).unwrap().naive_utc())
        .collect()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Ten-minute temperature file in two blocks with different depth sets
const TEMPERATURE_10M: &str = "\
Location:  0N  23W  1 Jan 2020 to  2 Jan 2020 (index 1 to 5, 5 times)
Units: DEG.C, -9.999 = missing, Time in GMT
 Time: 0000  1 Jan 2020 to 0020  1 Jan 2020 (index 1 to 3, 3 times)
 Depth (M):      1     20     40 QUALITY
 YYYYMMDD HHMM   TEMP   TEMP   TEMP QQQ
 20200101 0000 25.310 24.900 -9.999 111
 20200101 0010 25.320 24.910 22.100 111
 20200101 0020 25.330 -9.999 22.120 115
 Time: 0000  2 Jan 2020 to 0010  2 Jan 2020 (index 4 to 5, 2 times)
 Depth (M):      1     40 QUALITY SOURCE
 YYYYMMDD HHMM   TEMP   TEMP QQ SS
 20200102 0000 25.410 22.200 11 55
 20200102 0010 25.420 22.210 11 55
";

#[test]
fn test_scenario_single_row_block() {
    let decoded = decode_text(
        "\
Units: DEG.C , missing = -9.99
 Depth (M):   1 QUALITY
 YYYYMMDD HHMM TEMP Q
 20200101 0000 25.31 1
",
    );

    assert_eq!(decoded.metadata.units.as_deref(), Some("DEG.C"));
    assert_eq!(decoded.metadata.missing_value_token.as_deref(), Some("-9.99"));
    assert_eq!(
        decoded.table.get_column_names_str(),
        vec![DATETIME_COLUMN, "TEMP_1"]
    );
    assert_eq!(timestamps(&decoded.table), vec![at(2020, 1, 1, 0, 0)]);
    assert_eq!(values(&decoded.table, "TEMP_1"), vec![Some(25.31)]);
    assert!(decoded.issues.is_empty());
}

#[test]
fn test_resuffixing_a_decoded_block_is_a_no_op() {
    let decoded = decode_text(
        "\
Units: DEG.C , missing = -9.99
 Depth (M):   1
 YYYYMMDD HHMM TEMP Q
 20200101 0000 25.31 1
",
    );

    let mut block = decoded.metadata.blocks[0].clone();
    apply_depth_suffixes(&mut block);

    assert_eq!(block, decoded.metadata.blocks[0]);
    assert_eq!(block.column_names, vec!["YYYYMMDD", "HHMM", "TEMP_1", "Q"]);
}

#[test]
fn test_scenario_missing_sentinel_is_null() {
    let decoded = decode_text(
        "\
Units: DEG.C, -9.99 = missing
 Depth (M):   1
 YYYYMMDD HHMM TEMP
 20200101 0000 -9.99
 20200101 0010 -9.990
",
    );

    // Only the exact sentinel string is missing
    assert_eq!(values(&decoded.table, "TEMP_1"), vec![None, Some(-9.99)]);
    assert!(decoded.issues.is_empty());
}

#[test]
fn test_scenario_disjoint_blocks_keep_every_row() {
    let decoded = decode_text(TEMPERATURE_10M);

    assert_eq!(decoded.metadata.block_count(), 2);
    assert_eq!(decoded.table.height(), 3 + 2);
    assert_eq!(
        decoded.table.get_column_names_str(),
        vec![DATETIME_COLUMN, "TEMP_1", "TEMP_20", "TEMP_40"]
    );
    assert_eq!(
        timestamps(&decoded.table),
        vec![
            at(2020, 1, 1, 0, 0),
            at(2020, 1, 1, 0, 10),
            at(2020, 1, 1, 0, 20),
            at(2020, 1, 2, 0, 0),
            at(2020, 1, 2, 0, 10),
        ]
    );
    assert_eq!(
        values(&decoded.table, "TEMP_20"),
        vec![Some(24.9), Some(24.91), None, None, None]
    );
    assert_eq!(
        values(&decoded.table, "TEMP_40"),
        vec![None, Some(22.1), Some(22.12), Some(22.2), Some(22.21)]
    );
}

#[test]
fn test_scenario_fewer_depths_than_columns() {
    let decoded = decode_text(
        "\
Units: DEG.C, -9.999 = missing
 Depth (M):   1  20  40
 YYYYMMDD HHMM TEMP TEMP TEMP TEMP
 20200101 0000 25.1 24.0 22.0 20.0
",
    );

    assert_eq!(
        decoded.metadata.blocks[0].column_names,
        vec!["YYYYMMDD", "HHMM", "TEMP_1", "TEMP_20", "TEMP_40", "TEMP"]
    );
    assert_eq!(values(&decoded.table, "TEMP"), vec![Some(20.0)]);

    let depth_issues: Vec<&DecodeIssue> = decoded
        .issues
        .iter()
        .filter(|issue| matches!(issue, DecodeIssue::DepthCountMismatch { .. }))
        .collect();
    assert_eq!(depth_issues.len(), 1);
    assert_eq!(depth_issues[0].severity(), Severity::Warning);
}

#[test]
fn test_repeated_leftover_columns_keep_block_rows() {
    let decoded = decode_text(
        "\
Units: DEG.C, -9.999 = missing
 Depth (M):   1  20
 YYYYMMDD HHMM TEMP TEMP TEMP TEMP
 20200101 0000 25.1 24.0 22.0 20.0
 20200101 0010 25.2 24.1 22.1 20.1
",
    );

    assert_eq!(decoded.table.height(), 2);
    assert_eq!(
        decoded.table.get_column_names_str(),
        vec![DATETIME_COLUMN, "TEMP_1", "TEMP_20", "TEMP"]
    );
    assert_eq!(values(&decoded.table, "TEMP_20"), vec![Some(24.0), Some(24.1)]);
    assert_eq!(values(&decoded.table, "TEMP"), vec![Some(22.0), Some(22.1)]);

    assert!(
        decoded
            .issues
            .iter()
            .all(|issue| issue.severity() == Severity::Warning),
        "{:?}",
        decoded.issues
    );
    assert!(decoded.issues.iter().any(|issue| matches!(
        issue,
        DecodeIssue::DepthCountMismatch { depths: 2, columns: 4, .. }
    )));
    assert!(decoded.issues.iter().any(|issue| matches!(
        issue,
        DecodeIssue::DuplicateColumn { position: 5, .. }
    )));
}

#[test]
fn test_block_count_matches_column_lines() {
    let decoded = decode_text(TEMPERATURE_10M);
    let column_lines = TEMPERATURE_10M
        .lines()
        .filter(|line| line.trim_start().starts_with("YYYYMMDD HHMM"))
        .count();

    assert_eq!(decoded.metadata.block_count(), column_lines);
}

#[test]
fn test_missing_token_never_parsed_as_number() {
    let decoded = decode_text(TEMPERATURE_10M);
    let sentinel: f64 = "-9.999".parse().unwrap();

    for column in ["TEMP_1", "TEMP_20", "TEMP_40"] {
        assert!(
            values(&decoded.table, column)
                .into_iter()
                .flatten()
                .all(|value| value != sentinel),
            "sentinel leaked into {}",
            column
        );
    }
}

#[test]
fn test_flag_column_pruning() {
    for flag in ["Q", "QQ", "IDIDID"] {
        assert!(is_flag_column(flag), "{} should be pruned", flag);
    }
    for name in ["TEMP", "PSAL_10", "QUALITY"] {
        assert!(!is_flag_column(name), "{} should be kept", name);
    }
}

#[test]
fn test_corrupted_rows_degrade_gracefully() {
    let corrupted = TEMPERATURE_10M
        .replace("25.320", "2\u{fffd}.32")
        .replace(" 20200102 0010 25.420 22.210 11 55", " 20200102 0010 25.420 11 55");
    let decoded = decode_text(&corrupted);

    // The short row is dropped, the corrupted cell is null
    assert_eq!(decoded.table.height(), 4);
    assert_eq!(values(&decoded.table, "TEMP_1")[1], None);

    assert!(decoded.issues.iter().any(|issue| matches!(
        issue,
        DecodeIssue::NonNumericValue { line: 6, column, .. } if column == "TEMP_1"
    )));
    assert!(decoded.issues.iter().any(|issue| matches!(
        issue,
        DecodeIssue::ColumnCountMismatch { line: 12, expected: 6, found: 5 }
    )));
}

#[test]
fn test_location_and_time_span() {
    let decoded = decode_text(TEMPERATURE_10M);

    let location = decoded.metadata.location.as_ref().unwrap();
    assert_eq!(location.latitude, 0.0);
    assert_eq!(location.longitude, -23.0);

    let first = &decoded.metadata.blocks[0];
    assert_eq!(
        first.time_span,
        Some((at(2020, 1, 1, 0, 0), at(2020, 1, 1, 0, 20)))
    );
    assert_eq!(first.declared_rows, Some(3));
    assert_eq!(decoded.metadata.extra_header_notes, vec!["Time in GMT"]);
}

#[test]
fn test_station_merge_keeps_columns_unique() {
    let temperature = decode_text(TEMPERATURE_10M);
    let salinity = decode_text(
        "\
Units: PSU, -9.999 = missing
 Depth (M):      1 QUALITY
 YYYYMMDD HHMM   SAL Q
 20200101 0010 36.010 2
 20200103 0000 36.020 2
",
    );

    let name = PirataFileName::parse("t0n23w_10m.ascii.gz").unwrap();
    let station = StationTable::merge(
        &name.station,
        vec![
            ("t0n23w_10m.ascii.gz".to_string(), temperature.table),
            ("s0n23w_10m.ascii.gz".to_string(), salinity.table),
        ],
        true,
    )
    .unwrap();

    assert_eq!(
        station.frame.get_column_names_str(),
        vec![DATETIME_COLUMN, "TEMP_1_t", "TEMP_20_t", "TEMP_40_t", "SAL_1_s"]
    );
    assert_eq!(station.frame.height(), 6);
    assert_eq!(
        values(&station.frame, "SAL_1_s"),
        vec![None, Some(36.01), None, None, None, Some(36.02)]
    );
}
