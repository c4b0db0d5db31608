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

//! # JSON Codec
//!
//! Writes each row as a JSON object keyed by column name, either inside one
//! array or one object per line.
//!
//! Array output is `[` + `\n{row}` joined by `,` + `\n]\n`. The brackets are
//! only written once a row has been kept, so an empty result is empty
//! output rather than `[]`.
//!
//! Cells keep their JSON-native type: integers and floats are numbers,
//! booleans are booleans, structured values are embedded as-is. Integral
//! floats are written without a fraction (`2`, not `2.0`). Timestamps
//! become RFC 3339 strings (the zero timestamp becomes `null`) and bytes
//! become base64 strings.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use base64::Engine;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::{Result, ZiError};
use crate::export::{
    finish_rows, limit_reached, scan_checked, ZiCodec, ZiCountingWriter, ZiTypeMapper,
    ZiWriteStats,
};
use crate::scanner::{ZiRows, ZiValueMetadata};
use crate::tostring::{format_float32, format_timestamp};
use crate::value::{is_zero_timestamp, ZiCellKind, ZiCellValue};

/// One row as handed to the JSON preprocessor, keyed by column name.
pub type ZiJsonRow = BTreeMap<String, ZiCellValue>;

/// Value override: raw value plus context in, replacement value out.
pub type ZiValueFn = Arc<dyn Fn(&ZiCellValue, &ZiValueMetadata<'_>) -> ZiCellValue + Send + Sync>;

/// Preprocessor for JSON rows. Returning `None` drops the row.
pub type ZiJsonRowFilterFn = Arc<dyn Fn(usize, ZiJsonRow) -> Option<ZiJsonRow> + Send + Sync>;

/// Scalar options of the JSON codec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiJsonOptions {
    /// One object per line instead of a JSON array.
    pub newline_delimited: bool,
    /// Maximum number of kept rows; negative means unlimited.
    pub limit: i64,
}

impl Default for ZiJsonOptions {
    fn default() -> Self {
        ZiJsonOptions {
            newline_delimited: false,
            limit: -1,
        }
    }
}

/// JSON / JSON Lines codec.
#[derive(Clone, Default)]
pub struct ZiJsonCodec {
    options: ZiJsonOptions,
    mapper: ZiTypeMapper<ZiValueFn>,
    preprocessor: Option<ZiJsonRowFilterFn>,
}

impl fmt::Debug for ZiJsonCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiJsonCodec")
            .field("options", &self.options)
            .field("mapper", &self.mapper)
            .field("preprocessor", &self.preprocessor.is_some())
            .finish()
    }
}

impl ZiJsonCodec {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &ZiJsonOptions {
        &self.options
    }

    pub fn with_options(mut self, options: ZiJsonOptions) -> Self {
        self.options = options;
        self
    }

    /// Registers a value override for one kind. The returned value is
    /// serialized like any other cell.
    pub fn with_custom_type<F>(mut self, kind: ZiCellKind, map: F) -> Self
    where
        F: Fn(&ZiCellValue, &ZiValueMetadata<'_>) -> ZiCellValue + Send + Sync + 'static,
    {
        self.mapper.register(kind, Arc::new(map));
        self
    }

    pub fn with_preprocessor<F>(mut self, preprocessor: F) -> Self
    where
        F: Fn(usize, ZiJsonRow) -> Option<ZiJsonRow> + Send + Sync + 'static,
    {
        self.preprocessor = Some(Arc::new(preprocessor));
        self
    }

    pub fn with_newline_delimited(mut self, newline_delimited: bool) -> Self {
        self.options.newline_delimited = newline_delimited;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.options.limit = limit;
        self
    }

    fn write_rows(
        &self,
        rows: &mut dyn ZiRows,
        sink: &mut ZiCountingWriter<'_>,
        opened: &mut bool,
        stats: &mut ZiWriteStats,
    ) -> Result<()> {
        let columns = rows.columns()?;
        if self.options.limit == 0 {
            return Ok(());
        }

        let driver = rows.driver().to_string();
        let array = !self.options.newline_delimited;
        let mut row_id = 1;
        while rows.next() {
            let values = scan_checked(rows, &columns, row_id)?;
            let mut row = ZiJsonRow::new();
            for (value, column) in values.into_iter().zip(&columns) {
                let value = match self.mapper.lookup(&value) {
                    Some(map) => {
                        let metadata = ZiValueMetadata {
                            row_id,
                            driver: &driver,
                            column,
                        };
                        map(&value, &metadata)
                    }
                    None => value,
                };
                row.insert(column.name.clone(), value);
            }

            let row = match &self.preprocessor {
                Some(preprocess) => match preprocess(row_id, row) {
                    Some(row) => row,
                    None => {
                        trace!("json row {row_id} dropped by preprocessor");
                        stats.rows_skipped += 1;
                        continue;
                    }
                },
                None => row,
            };

            let data = encode_row(&row, row_id)?;
            if array {
                if *opened {
                    sink.write_all(b",")?;
                } else {
                    sink.write_all(b"[")?;
                    *opened = true;
                }
                sink.write_all(b"\n")?;
                sink.write_all(&data)?;
            } else {
                sink.write_all(&data)?;
                sink.write_all(b"\n")?;
            }
            stats.rows_written += 1;

            if limit_reached(self.options.limit, row_id) {
                return Ok(());
            }
            row_id += 1;
        }

        finish_rows(rows)
    }
}

impl ZiCodec for ZiJsonCodec {
    fn name(&self) -> &'static str {
        if self.options.newline_delimited {
            "jsonl"
        } else {
            "json"
        }
    }

    fn write(&self, rows: &mut dyn ZiRows, writer: &mut dyn Write) -> Result<ZiWriteStats> {
        debug!("{} export started, driver {}", self.name(), rows.driver());

        let mut stats = ZiWriteStats::default();
        let mut sink = ZiCountingWriter::new(writer);
        let mut opened = false;
        let result = self.write_rows(rows, &mut sink, &mut opened, &mut stats);

        // Close the array on every exit path once it has been opened.
        let closed = if opened {
            sink.write_all(b"\n]\n").map_err(ZiError::from)
        } else {
            Ok(())
        };
        stats.bytes_written = sink.bytes();
        result.and(closed)?;

        debug!(
            "{} export finished: {} rows written, {} skipped",
            self.name(),
            stats.rows_written,
            stats.rows_skipped
        );
        Ok(stats)
    }
}

/// Serializes a row to compact JSON bytes. Keys come out in sorted order.
fn encode_row(row: &ZiJsonRow, row_id: usize) -> Result<Vec<u8>> {
    let mut object = Map::new();
    for (name, value) in row {
        object.insert(name.clone(), to_json_value(value, row_id)?);
    }
    serde_json::to_vec(&Value::Object(object)).map_err(|err| ZiError::encoding(row_id, err.to_string()))
}

/// JSON-native form of a cell.
pub fn to_json_value(value: &ZiCellValue, row_id: usize) -> Result<Value> {
    let json = match value {
        ZiCellValue::Null => Value::Null,
        ZiCellValue::Bool(v) => Value::Bool(*v),
        ZiCellValue::Int(v) => Value::from(*v),
        ZiCellValue::UInt(v) => Value::from(*v),
        // Round-trip through the shortest f32 text so 0.1f32 stays 0.1.
        ZiCellValue::Float32(v) => float_number(
            format_float32(*v).parse::<f64>().unwrap_or(f64::NAN),
            row_id,
        )?,
        ZiCellValue::Float64(v) => float_number(*v, row_id)?,
        ZiCellValue::String(v) => Value::String(v.clone()),
        ZiCellValue::Bytes(v) => {
            Value::String(base64::engine::general_purpose::STANDARD.encode(v))
        }
        ZiCellValue::Timestamp(ts) => {
            if is_zero_timestamp(ts) {
                Value::Null
            } else {
                Value::String(format_timestamp(ts))
            }
        }
        ZiCellValue::Json(v) => v.clone(),
        ZiCellValue::Custom(custom) => match custom.to_json() {
            Some(Ok(text)) => serde_json::from_str(&text).map_err(|err| {
                ZiError::encoding(
                    row_id,
                    format!("{} produced invalid JSON: {err}", custom.type_name()),
                )
            })?,
            Some(Err(message)) => {
                return Err(ZiError::encoding(
                    row_id,
                    format!("{}: {message}", custom.type_name()),
                ))
            }
            None => custom.to_structure().ok_or_else(|| {
                ZiError::encoding(
                    row_id,
                    format!("unsupported type: {}", custom.type_name()),
                )
            })?,
        },
    };
    Ok(json)
}

/// Integral floats inside the `i64` range are written without a fraction,
/// so `2.0` becomes `2`. Larger magnitudes keep serde_json's float form.
fn float_number(v: f64, row_id: usize) -> Result<Value> {
    if v.fract() == 0.0 && v.abs() < 9.0e18 && !(v == 0.0 && v.is_sign_negative()) {
        return Ok(Value::from(v as i64));
    }
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| ZiError::encoding(row_id, format!("unsupported value: {v}")))
}
