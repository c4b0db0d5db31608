//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zixport.
//! The Zixport project belongs to the Dunimd project team.

use zixport::scanner::*;
use zixport::value::ZiCellValue;
use zixport::ZiError;

#[test]
fn test_slice_rows_iterate_in_order() {
    let mut rows = ZiSliceRows::new(vec![
        vec![1_i64.into(), "a".into()],
        vec![2_i64.into(), "b".into()],
    ]);
    assert_eq!(rows.driver(), "zi-slice");

    let columns = rows.columns().unwrap();
    assert_eq!(
        columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["column_0", "column_1"]
    );
    assert_eq!(columns[1].database_type_name, "string");
    assert_eq!(columns[1].index, 1);

    let mut seen = Vec::new();
    while rows.next() {
        let row = rows.scan_row().unwrap();
        seen.push(row.len());
    }
    assert_eq!(seen, vec![2, 2]);
    assert!(rows.err().is_none());
}

#[test]
fn test_slice_rows_reject_ragged_rows() {
    let mut rows = ZiSliceRows::new(vec![vec![1_i64.into(), "a".into()], vec![2_i64.into()]]);
    assert!(rows.next());
    rows.scan_row().unwrap();
    assert!(rows.next());
    let err = rows.scan_row().unwrap_err();
    assert!(matches!(err, ZiError::Source { row: 2, .. }));
    assert!(err.to_string().contains("length of row 2"));
}

#[test]
fn test_slice_rows_empty() {
    let mut rows = ZiSliceRows::new(Vec::new());
    assert!(rows.columns().unwrap().is_empty());
    assert!(!rows.next());
}

#[test]
fn test_explicit_columns() {
    let mut rows = ZiSliceRows::new(vec![vec![ZiCellValue::Null]]).with_columns(vec![
        ZiColumn::new(0, "amount", "DECIMAL")
            .with_nullable(true)
            .with_decimal_size(10, 2),
    ]);
    let columns = rows.columns().unwrap();
    assert_eq!(columns[0].name, "amount");
    assert_eq!(columns[0].nullable, Some(true));
    assert_eq!(columns[0].decimal_size, Some((10, 2)));
    assert_eq!(columns[0].length, None);
}

#[test]
fn test_iter_rows_report_failed_fetch() {
    let source = vec![
        Ok(vec![ZiCellValue::from(1_i64)]),
        Err(ZiError::source(2, "connection reset")),
        Ok(vec![ZiCellValue::from(3_i64)]),
    ];
    let mut rows = ZiIterRows::new(
        vec![ZiColumn::new(0, "id", "BIGINT")],
        "test-db",
        source.into_iter(),
    );
    assert_eq!(rows.driver(), "test-db");

    assert!(rows.next());
    assert_eq!(rows.scan_row().unwrap().len(), 1);
    assert!(!rows.next());
    assert!(!rows.next());

    let err = rows.err().unwrap();
    assert!(matches!(err, ZiError::Source { row: 2, .. }));
    assert!(rows.err().is_none());
}

#[test]
fn test_boxed_rows_are_rows() {
    let mut rows: Box<dyn ZiRows> = Box::new(ZiSliceRows::new(vec![vec!["x".into()]]));
    assert!(rows.next());
    assert_eq!(rows.scan_row().unwrap().len(), 1);
    assert!(!rows.next());
}
