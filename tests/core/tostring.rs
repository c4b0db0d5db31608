//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zixport.
//! The Zixport project belongs to the Dunimd project team.

use std::any::Any;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{json, Value};
use zixport::tostring::*;
use zixport::value::{ZiCellValue, ZiCustomValue};

#[derive(Debug)]
struct JsonMoney(&'static str);

impl ZiCustomValue for JsonMoney {
    fn type_name(&self) -> &'static str {
        "money"
    }

    fn to_json(&self) -> Option<Result<String, String>> {
        Some(Ok(self.0.to_string()))
    }

    fn to_display(&self) -> Option<String> {
        Some("display wins only without json".to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct Label;

impl ZiCustomValue for Label {
    fn type_name(&self) -> &'static str {
        "label"
    }

    fn to_display(&self) -> Option<String> {
        Some("[]".to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct Point {
    x: i32,
}

impl ZiCustomValue for Point {
    fn type_name(&self) -> &'static str {
        "point"
    }

    fn to_structure(&self) -> Option<Value> {
        Some(json!({ "x": self.x }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
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

#[test]
fn test_null_is_null() {
    let rendered = render_value(&ZiCellValue::Null);
    assert!(rendered.is_null);
    assert_eq!(rendered.text, "");
}

#[test]
fn test_scalars_use_minimal_formatting() {
    assert_eq!(render_value(&true.into()).text, "true");
    assert_eq!(render_value(&(-42_i8).into()).text, "-42");
    assert_eq!(render_value(&u64::MAX.into()).text, "18446744073709551615");
    assert_eq!(render_value(&1.5_f64.into()).text, "1.5");
    assert_eq!(render_value(&2.0_f64.into()).text, "2");
    assert_eq!(render_value(&0.1_f32.into()).text, "0.1");
    assert_eq!(render_value(&1e21_f64.into()).text, "1000000000000000000000");
    assert_eq!(render_value(&"".into()).text, "");
    assert!(!render_value(&"".into()).is_null);
    assert_eq!(render_value(&b"bytes".to_vec().into()).text, "bytes");
}

#[test]
fn test_non_finite_floats() {
    assert_eq!(format_float64(f64::INFINITY), "+Inf");
    assert_eq!(format_float64(f64::NEG_INFINITY), "-Inf");
    assert_eq!(format_float64(f64::NAN), "NaN");
    assert_eq!(format_float32(f32::NEG_INFINITY), "-Inf");
}

#[test]
fn test_timestamps() {
    let ts = Utc
        .with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
        .unwrap()
        .fixed_offset();
    assert_eq!(render_value(&ts.into()).text, "2024-03-01T12:30:00Z");

    let zero = ZiCellValue::Timestamp(ZiCellValue::zero_timestamp());
    assert!(render_value(&zero).is_null);
}

#[test]
fn test_custom_json_takes_precedence() {
    let rendered = render_value(&ZiCellValue::custom(JsonMoney("\"12.50\"")));
    assert_eq!(rendered, ZiRendered::value("12.50"));

    assert!(render_value(&ZiCellValue::custom(JsonMoney("{}"))).is_null);
    assert!(render_value(&ZiCellValue::custom(JsonMoney("null"))).is_null);
}

#[test]
fn test_display_form_is_verbatim() {
    let rendered = render_value(&ZiCellValue::custom(Label));
    assert_eq!(rendered.text, "[]");
    assert!(!rendered.is_null);
}

#[test]
fn test_structural_fallback() {
    assert_eq!(render_value(&ZiCellValue::custom(Point { x: 3 })).text, "{\"x\":3}");
    assert_eq!(render_value(&ZiCellValue::Json(json!("quoted"))).text, "quoted");
    assert!(render_value(&ZiCellValue::Json(json!([]))).is_null);
    assert!(render_value(&ZiCellValue::Json(Value::Null)).is_null);
    assert_eq!(render_value(&ZiCellValue::custom(Opaque)).text, "Opaque");
}

proptest! {
    #[test]
    fn prop_float64_round_trips(v in proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL | proptest::num::f64::ZERO) {
        let text = render_value(&v.into()).text;
        prop_assert_eq!(text.parse::<f64>().unwrap(), v);
        prop_assert!(!text.contains('e'));
    }

    #[test]
    fn prop_float32_round_trips(v in proptest::num::f32::NORMAL | proptest::num::f32::ZERO) {
        let text = render_value(&v.into()).text;
        prop_assert_eq!(text.parse::<f32>().unwrap(), v);
    }

    #[test]
    fn prop_integers_round_trip(v in any::<i64>(), u in any::<u64>()) {
        prop_assert_eq!(render_value(&v.into()).text.parse::<i64>().unwrap(), v);
        prop_assert_eq!(render_value(&u.into()).text.parse::<u64>().unwrap(), u);
    }

    #[test]
    fn prop_timestamps_round_trip(
        secs in 0_i64..253_402_300_799,
        nanos in 0_u32..1_000_000_000,
        offset_minutes in -1439_i32..=1439,
    ) {
        let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        let ts = Utc.timestamp_opt(secs, nanos).unwrap().with_timezone(&offset);
        let text = format_timestamp(&ts);
        let parsed = DateTime::parse_from_rfc3339(&text).unwrap();
        prop_assert_eq!(parsed, ts);
        prop_assert_eq!(parsed.offset(), ts.offset());
    }
}
