//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zixport.
//! The Zixport project belongs to the Dunimd project team.

use zixport::export::{ZiCodec, ZiXmlCodec};
use zixport::scanner::{ZiColumn, ZiIterRows, ZiSliceRows};
use zixport::tostring::ZiRendered;
use zixport::value::{ZiCellKind, ZiCellValue};
use zixport::ZiError;

fn write(codec: &ZiXmlCodec, mut rows: ZiSliceRows) -> String {
    let mut out = Vec::new();
    codec.write(&mut rows, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_null_columns_are_omitted() {
    let rows = ZiSliceRows::new(vec![vec!["<b>".into(), ZiCellValue::Null]]);
    assert_eq!(
        write(&ZiXmlCodec::new(), rows),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<data>\n<row><column_0>&lt;b&gt;</column_0></row>\n</data>\n"
    );
}

#[test]
fn test_empty_result_is_empty_output() {
    assert_eq!(write(&ZiXmlCodec::new(), ZiSliceRows::new(Vec::new())), "");
    let rows = ZiSliceRows::new(vec![vec![1_i64.into()]]);
    assert_eq!(write(&ZiXmlCodec::new().with_preprocessor(|_, _| None), rows), "");
}

#[test]
fn test_rows_and_limit() {
    let rows = ZiSliceRows::new(vec![
        vec![1_i64.into(), "a".into()],
        vec![2_i64.into(), "b".into()],
        vec![3_i64.into(), "c".into()],
    ])
    .with_columns(vec![ZiColumn::new(0, "id", "INT"), ZiColumn::new(1, "name", "TEXT")]);
    assert_eq!(
        write(&ZiXmlCodec::new().with_limit(2), rows),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<data>\n<row><id>1</id><name>a</name></row>\n<row><id>2</id><name>b</name></row>\n</data>\n"
    );
}

#[test]
fn test_filter_does_not_count_toward_limit() {
    let rows = ZiSliceRows::new(vec![vec!["x".into()], vec!["y".into()], vec!["z".into()]]);
    let codec = ZiXmlCodec::new()
        .with_limit(1)
        .with_preprocessor(|_, row| if row[0] == "x" { None } else { Some(row) });
    let xml = write(&codec, rows);
    assert!(xml.contains("<row><column_0>y</column_0></row>"));
    assert!(!xml.contains(">z<"));
}

#[test]
fn test_type_override_null_omits_element() {
    let rows = ZiSliceRows::new(vec![vec![1_i64.into(), "keep".into()]]);
    let codec = ZiXmlCodec::new().with_custom_type(ZiCellKind::Int, |_, _| ZiRendered::null());
    assert!(write(&codec, rows).contains("<row><column_1>keep</column_1></row>"));
}

#[test]
fn test_source_error_closes_document() {
    let source = vec![
        Ok(vec![ZiCellValue::from("a")]),
        Err(ZiError::source(2, "fetch failed")),
    ];
    let mut rows = ZiIterRows::new(vec![ZiColumn::new(0, "v", "TEXT")], "test", source.into_iter());
    let mut out = Vec::new();
    let err = ZiXmlCodec::new().write(&mut rows, &mut out).unwrap_err();
    assert!(matches!(err, ZiError::Source { row: 2, .. }));
    assert!(String::from_utf8(out).unwrap().ends_with("<row><v>a</v></row>\n</data>\n"));
}

#[test]
fn test_zero_timestamp_omits_element() {
    let rows = ZiSliceRows::new(vec![vec![
        1_i64.into(),
        ZiCellValue::Timestamp(ZiCellValue::zero_timestamp()),
    ]]);
    assert!(write(&ZiXmlCodec::new(), rows).contains("<row><column_0>1</column_0></row>\n"));
}

#[test]
fn test_control_characters_are_replaced() {
    let rows = ZiSliceRows::new(vec![vec!["a\u{1}b".into()]]);
    assert!(write(&ZiXmlCodec::new(), rows).contains("<column_0>a\u{FFFD}b</column_0>"));
}
