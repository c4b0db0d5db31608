//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zixport.
//! The Zixport project belongs to the Dunimd project team.

use std::any::Any;

use chrono::{FixedOffset, TimeZone};
use serde_json::{json, Value};
use zixport::export::{ZiCodec, ZiJsonCodec};
use zixport::scanner::{ZiColumn, ZiSliceRows};
use zixport::value::{ZiCellKind, ZiCellValue, ZiCustomValue};
use zixport::ZiError;

fn sample() -> ZiSliceRows {
    ZiSliceRows::new(vec![
        vec![1_i64.into(), "a".into()],
        vec![2_i64.into(), "b".into()],
        vec![3_i64.into(), "c".into()],
    ])
}

fn write(codec: &ZiJsonCodec, mut rows: ZiSliceRows) -> String {
    let mut out = Vec::new();
    codec.write(&mut rows, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[derive(Debug)]
struct Opaque;

impl ZiCustomValue for Opaque {
    fn type_name(&self) -> &'static str {
        "opaque"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct Version(u32, u32);

impl ZiCustomValue for Version {
    fn type_name(&self) -> &'static str {
        "version"
    }

    fn to_json(&self) -> Option<Result<String, String>> {
        Some(Ok(format!("\"v{}.{}\"", self.0, self.1)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_array_output() {
    assert_eq!(
        write(&ZiJsonCodec::new(), sample()),
        "[\n{\"column_0\":1,\"column_1\":\"a\"},\n{\"column_0\":2,\"column_1\":\"b\"},\n{\"column_0\":3,\"column_1\":\"c\"}\n]\n"
    );
}

#[test]
fn test_newline_delimited_output() {
    let codec = ZiJsonCodec::new().with_newline_delimited(true);
    assert_eq!(codec.name(), "jsonl");
    assert_eq!(
        write(&codec, sample()),
        "{\"column_0\":1,\"column_1\":\"a\"}\n{\"column_0\":2,\"column_1\":\"b\"}\n{\"column_0\":3,\"column_1\":\"c\"}\n"
    );
}

#[test]
fn test_empty_result_is_empty_output() {
    assert_eq!(write(&ZiJsonCodec::new(), ZiSliceRows::new(Vec::new())), "");
    assert_eq!(
        write(&ZiJsonCodec::new().with_newline_delimited(true), ZiSliceRows::new(Vec::new())),
        ""
    );
    assert_eq!(write(&ZiJsonCodec::new().with_limit(0), sample()), "");
    assert_eq!(
        write(&ZiJsonCodec::new().with_preprocessor(|_, _| None), sample()),
        ""
    );
}

#[test]
fn test_output_parses_as_json() {
    let ts = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 6, 7, 8, 9)
        .unwrap();
    let rows = ZiSliceRows::new(vec![vec![
        ZiCellValue::Null,
        true.into(),
        2.5_f64.into(),
        ts.into(),
        b"\x00\x01".to_vec().into(),
        json!({"k": [1, 2]}).into(),
        ZiCellValue::custom(Version(1, 2)),
    ]]);
    let parsed: Value = serde_json::from_str(&write(&ZiJsonCodec::new(), rows)).unwrap();
    assert_eq!(
        parsed,
        json!([{
            "column_0": null,
            "column_1": true,
            "column_2": 2.5,
            "column_3": "2024-05-06T07:08:09+02:00",
            "column_4": "AAE=",
            "column_5": {"k": [1, 2]},
            "column_6": "v1.2",
        }])
    );
}

#[test]
fn test_keys_are_sorted() {
    let rows = ZiSliceRows::new(vec![vec![1_i64.into(), 2_i64.into()]]).with_columns(vec![
        ZiColumn::new(0, "zeta", "INT"),
        ZiColumn::new(1, "alpha", "INT"),
    ]);
    assert_eq!(
        write(&ZiJsonCodec::new().with_newline_delimited(true), rows),
        "{\"alpha\":2,\"zeta\":1}\n"
    );
}

#[test]
fn test_value_override_keeps_json_types() {
    let codec = ZiJsonCodec::new()
        .with_newline_delimited(true)
        .with_custom_type(ZiCellKind::Int, |value, meta| match value {
            ZiCellValue::Int(v) => ZiCellValue::Int(v * 10 + meta.row_id as i64),
            other => other.clone(),
        });
    assert_eq!(
        write(&codec, sample()).lines().next(),
        Some("{\"column_0\":11,\"column_1\":\"a\"}")
    );
}

#[test]
fn test_preprocessor_edits_mapping() {
    let codec = ZiJsonCodec::new()
        .with_newline_delimited(true)
        .with_limit(1)
        .with_preprocessor(|row_id, mut row| {
            row.remove("column_1");
            row.insert("row".to_string(), ZiCellValue::from(row_id));
            Some(row)
        });
    assert_eq!(write(&codec, sample()), "{\"column_0\":1,\"row\":1}\n");
}

#[test]
fn test_limit_closes_array() {
    let mut out = Vec::new();
    let stats = ZiJsonCodec::new()
        .with_limit(1)
        .write(&mut sample(), &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "[\n{\"column_0\":1,\"column_1\":\"a\"}\n]\n");
    assert_eq!(stats.rows_written, 1);
}

#[test]
fn test_unsupported_custom_value_is_encoding_error() {
    let mut rows = ZiSliceRows::new(vec![
        vec![ZiCellValue::from("ok")],
        vec![ZiCellValue::custom(Opaque)],
    ]);
    let mut out = Vec::new();
    let err = ZiJsonCodec::new().write(&mut rows, &mut out).unwrap_err();
    assert!(matches!(err, ZiError::Encoding { row: 2, .. }));
    // The first row stays written and the array is still closed.
    assert_eq!(String::from_utf8(out).unwrap(), "[\n{\"column_0\":\"ok\"}\n]\n");
}

#[test]
fn test_non_finite_float_is_encoding_error() {
    let mut rows = ZiSliceRows::new(vec![vec![f64::NAN.into()]]);
    let err = ZiJsonCodec::new()
        .with_newline_delimited(true)
        .write(&mut rows, &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, ZiError::Encoding { row: 1, .. }));
}
