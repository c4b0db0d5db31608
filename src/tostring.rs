//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zixport.
//! The Zixport project belongs to the Dunimd project team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Value Renderer
//!
//! Converts a single [`ZiCellValue`] into text plus a NULL flag. Every text
//! codec uses this as its default conversion.
//!
//! ## Dispatch Order
//!
//! 1. `Null` is NULL.
//! 2. Scalars use canonical minimal formatting: base-10 integers, shortest
//!    round-trip floats without exponent, `true`/`false`, bytes as UTF-8.
//! 3. Timestamps render as RFC 3339 with trimmed nanoseconds; the zero
//!    timestamp is NULL.
//! 4. Custom values with a JSON form use it with one layer of quotes
//!    stripped; `[]`, `{}` and `null` are NULL.
//! 5. Custom values with a display form use it verbatim.
//! 6. Structured values are serialized to JSON with the same NULL rule as
//!    step 4, falling back to the `Debug` representation.
//!
//! The `[]`/`{}`/`null` rule is a heuristic kept for compatibility with
//! existing exports. It does not guarantee that the value was absent.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::value::{is_zero_timestamp, ZiCellValue};

/// Text form of one cell plus a NULL flag.
///
/// When `is_null` is set, codecs substitute their own NULL representation and
/// ignore `text`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiRendered {
    pub text: String,
    pub is_null: bool,
}

impl ZiRendered {
    pub fn value(text: impl Into<String>) -> Self {
        ZiRendered {
            text: text.into(),
            is_null: false,
        }
    }

    pub fn null() -> Self {
        ZiRendered {
            text: String::new(),
            is_null: true,
        }
    }
}

/// Renders a cell value with the default dispatch.
pub fn render_value(value: &ZiCellValue) -> ZiRendered {
    match value {
        ZiCellValue::Null => ZiRendered::null(),
        ZiCellValue::Bool(v) => ZiRendered::value(v.to_string()),
        ZiCellValue::Int(v) => ZiRendered::value(v.to_string()),
        ZiCellValue::UInt(v) => ZiRendered::value(v.to_string()),
        ZiCellValue::Float32(v) => ZiRendered::value(format_float32(*v)),
        ZiCellValue::Float64(v) => ZiRendered::value(format_float64(*v)),
        ZiCellValue::String(v) => ZiRendered::value(v.clone()),
        ZiCellValue::Bytes(v) => ZiRendered::value(String::from_utf8_lossy(v).into_owned()),
        ZiCellValue::Timestamp(ts) => {
            if is_zero_timestamp(ts) {
                ZiRendered::null()
            } else {
                ZiRendered::value(format_timestamp(ts))
            }
        }
        ZiCellValue::Json(v) => match serde_json::to_string(v) {
            Ok(json) => from_serialized(&json),
            Err(_) => ZiRendered::value(format!("{v:?}")),
        },
        ZiCellValue::Custom(custom) => {
            if let Some(Ok(json)) = custom.to_json() {
                return from_serialized(&json);
            }
            if let Some(text) = custom.to_display() {
                return ZiRendered::value(text);
            }
            if let Some(structure) = custom.to_structure() {
                if let Ok(json) = serde_json::to_string(&structure) {
                    return from_serialized(&json);
                }
            }
            ZiRendered::value(format!("{custom:?}"))
        }
    }
}

/// Applies the quote-stripping and empty-shape NULL rule to serialized JSON.
fn from_serialized(json: &str) -> ZiRendered {
    let text = strip_quotes(json);
    if matches!(text, "[]" | "{}" | "null") {
        return ZiRendered::null();
    }
    ZiRendered::value(text)
}

fn strip_quotes(json: &str) -> &str {
    if json.len() >= 2 && json.starts_with('"') && json.ends_with('"') {
        &json[1..json.len() - 1]
    } else {
        json
    }
}

/// Shortest round-trip decimal for an `f64`, never in exponent form.
pub fn format_float64(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    format!("{v}")
}

/// Shortest round-trip decimal for an `f32` at single precision.
pub fn format_float32(v: f32) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    format!("{v}")
}

/// RFC 3339 with nanosecond precision and trailing zeros trimmed.
///
/// A zero UTC offset is written as `Z`. The output sorts lexically within one
/// offset and parses back to the same instant.
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    let mut out = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second()
    );

    // Leap seconds are carried in the nanosecond field past 1e9.
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let digits = format!("{nanos:09}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }

    let offset = ts.offset().local_minus_utc();
    if offset == 0 {
        out.push('Z');
    } else {
        let sign = if offset < 0 { '-' } else { '+' };
        let abs = offset.abs();
        out.push_str(&format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60));
    }
    out
}
