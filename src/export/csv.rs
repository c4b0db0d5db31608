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

//! # CSV Codec
//!
//! Writes delimited text. Fields containing the delimiter, a quote or a line
//! break are quoted and embedded quotes are doubled.
//!
//! ## Header Policy
//!
//! - `write_header = false`: never emit a header.
//! - `write_header_when_empty = true`: emit the header before reading rows,
//!   so an empty result still has one.
//! - `write_header_when_empty = false`: emit the header just before the first
//!   kept row, so an empty result produces no output.
//!
//! A source without columns has no header, and each of its rows is written
//! as a single quoted empty field (`""`) so it stays distinguishable from a
//! blank line.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use ::csv::{Terminator, Writer, WriterBuilder};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::export::{
    finish_rows, limit_reached, render_cell, scan_checked, ZiCodec, ZiCountingWriter,
    ZiRenderFn, ZiRowFilterFn, ZiTypeMapper, ZiWriteStats,
};
use crate::scanner::{ZiColumn, ZiRows, ZiValueMetadata};
use crate::tostring::ZiRendered;
use crate::value::{ZiCellKind, ZiCellValue};

/// Scalar options of the CSV codec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiCsvOptions {
    /// Field separator. Must be a single-byte ASCII character.
    pub delimiter: char,
    /// Terminate records with `\r\n` instead of `\n`.
    pub use_crlf: bool,
    pub write_header: bool,
    pub write_header_when_empty: bool,
    /// Replaces the column names; must have one entry per column.
    pub custom_header: Option<Vec<String>>,
    /// Text written for NULL cells.
    pub null_value: String,
    /// Maximum number of kept rows; negative means unlimited.
    pub limit: i64,
}

impl Default for ZiCsvOptions {
    fn default() -> Self {
        ZiCsvOptions {
            delimiter: ',',
            use_crlf: false,
            write_header: true,
            write_header_when_empty: true,
            custom_header: None,
            null_value: String::new(),
            limit: -1,
        }
    }
}

/// Delimited-text codec.
#[derive(Clone, Default)]
pub struct ZiCsvCodec {
    options: ZiCsvOptions,
    mapper: ZiTypeMapper<ZiRenderFn>,
    preprocessor: Option<ZiRowFilterFn>,
}

impl fmt::Debug for ZiCsvCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiCsvCodec")
            .field("options", &self.options)
            .field("mapper", &self.mapper)
            .field("preprocessor", &self.preprocessor.is_some())
            .finish()
    }
}

impl ZiCsvCodec {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &ZiCsvOptions {
        &self.options
    }

    pub fn with_options(mut self, options: ZiCsvOptions) -> Self {
        self.options = options;
        self
    }

    /// Registers a text override for one value kind.
    pub fn with_custom_type<F>(mut self, kind: ZiCellKind, render: F) -> Self
    where
        F: Fn(&ZiCellValue, &ZiValueMetadata<'_>) -> ZiRendered + Send + Sync + 'static,
    {
        self.mapper.register(kind, Arc::new(render));
        self
    }

    /// Sets the row preprocessor. It receives the row number and rendered
    /// fields; returning `None` drops the row without counting it.
    pub fn with_preprocessor<F>(mut self, preprocessor: F) -> Self
    where
        F: Fn(usize, Vec<String>) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.preprocessor = Some(Arc::new(preprocessor));
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    pub fn with_crlf(mut self, use_crlf: bool) -> Self {
        self.options.use_crlf = use_crlf;
        self
    }

    pub fn with_header(mut self, write_header: bool) -> Self {
        self.options.write_header = write_header;
        self
    }

    pub fn with_header_when_empty(mut self, write_header_when_empty: bool) -> Self {
        self.options.write_header_when_empty = write_header_when_empty;
        self
    }

    pub fn with_custom_header<S: Into<String>>(mut self, header: impl IntoIterator<Item = S>) -> Self {
        self.options.custom_header = Some(header.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_null_value(mut self, null_value: impl Into<String>) -> Self {
        self.options.null_value = null_value.into();
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.options.limit = limit;
        self
    }

    fn delimiter_byte(&self) -> Result<u8> {
        let delimiter = self.options.delimiter;
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\r' | '\n') {
            return Err(ZiError::config(format!(
                "invalid delimiter {delimiter:?}: expected a single-byte ASCII character"
            )));
        }
        Ok(delimiter as u8)
    }

    fn header(&self, columns: &[ZiColumn]) -> Result<Vec<String>> {
        match &self.options.custom_header {
            Some(header) if header.len() != columns.len() => Err(ZiError::config(format!(
                "invalid header length: {} names for {} columns",
                header.len(),
                columns.len()
            ))),
            Some(header) => Ok(header.clone()),
            None => Ok(columns.iter().map(|column| column.name.clone()).collect()),
        }
    }

    fn write_rows<W: Write>(
        &self,
        rows: &mut dyn ZiRows,
        columns: &[ZiColumn],
        header: &[String],
        csv_writer: &mut Writer<W>,
        stats: &mut ZiWriteStats,
    ) -> Result<()> {
        let options = &self.options;
        let write_header = options.write_header && !header.is_empty();

        if write_header && options.write_header_when_empty {
            csv_writer
                .write_record(header)
                .map_err(|err| with_row(err, 0))?;
        }
        if options.limit == 0 {
            return Ok(());
        }

        let driver = rows.driver().to_string();
        let mut row_id = 1;
        while rows.next() {
            let values = scan_checked(rows, columns, row_id)?;
            let mut row = Vec::with_capacity(values.len());
            for (value, column) in values.iter().zip(columns) {
                let metadata = ZiValueMetadata {
                    row_id,
                    driver: &driver,
                    column,
                };
                let rendered = render_cell(&self.mapper, value, &metadata);
                row.push(if rendered.is_null {
                    options.null_value.clone()
                } else {
                    rendered.text
                });
            }

            let row = match &self.preprocessor {
                Some(preprocess) => match preprocess(row_id, row) {
                    Some(row) => row,
                    None => {
                        trace!("csv row {row_id} dropped by preprocessor");
                        stats.rows_skipped += 1;
                        continue;
                    }
                },
                None => row,
            };
            if row.len() != columns.len() {
                warn!(
                    "csv row {row_id} has {} fields after preprocessing, expected {}",
                    row.len(),
                    columns.len()
                );
            }

            if write_header && row_id == 1 && !options.write_header_when_empty {
                csv_writer
                    .write_record(header)
                    .map_err(|err| with_row(err, row_id))?;
            }
            csv_writer
                .write_record(&row)
                .map_err(|err| with_row(err, row_id))?;
            stats.rows_written += 1;

            if limit_reached(options.limit, row_id) {
                return Ok(());
            }
            row_id += 1;
        }

        finish_rows(rows)
    }
}

impl ZiCodec for ZiCsvCodec {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write(&self, rows: &mut dyn ZiRows, writer: &mut dyn Write) -> Result<ZiWriteStats> {
        let delimiter = self.delimiter_byte()?;
        let columns = rows.columns()?;
        let header = self.header(&columns)?;
        debug!(
            "csv export started: {} columns, driver {}",
            columns.len(),
            rows.driver()
        );

        let terminator = if self.options.use_crlf {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        };

        let mut stats = ZiWriteStats::default();
        let mut sink = ZiCountingWriter::new(writer);
        let result = {
            let mut csv_writer = WriterBuilder::new()
                .delimiter(delimiter)
                .terminator(terminator)
                .flexible(true)
                .has_headers(false)
                .from_writer(&mut sink);
            let result = self.write_rows(rows, &columns, &header, &mut csv_writer, &mut stats);
            let flushed = csv_writer.flush().map_err(ZiError::from);
            result.and(flushed)
        };
        stats.bytes_written = sink.bytes();
        result?;

        debug!(
            "csv export finished: {} rows written, {} skipped",
            stats.rows_written, stats.rows_skipped
        );
        Ok(stats)
    }
}

/// Attaches the row number to record-level CSV failures.
fn with_row(err: ::csv::Error, row_id: usize) -> ZiError {
    match ZiError::from(err) {
        ZiError::Encoding { message, .. } => ZiError::encoding(row_id, message),
        other => other,
    }
}
