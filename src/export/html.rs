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

//! # HTML Codec
//!
//! Writes a standalone HTML page holding one table. The header row is sticky
//! and shows each column's name above its lower-cased declared type. NULL
//! cells are rendered with a configurable fragment, a grey `[NULL]` by
//! default, so they stay distinguishable from empty strings.
//!
//! ## Escaping
//!
//! Cell text, column names and type names are inserted into the markup
//! without HTML escaping. The codec is meant for trusted data; callers
//! exporting untrusted values must escape them in a type override or a row
//! preprocessor.
//!
//! ## Document Framing
//!
//! The page is opened by the header (when emitted up front) or by the first
//! kept row. Closing tags are only written for an opened page, so an empty
//! result with a suppressed header is empty output.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::export::{
    finish_rows, limit_reached, render_cell, scan_checked, ZiCodec, ZiCountingWriter,
    ZiRenderFn, ZiRowFilterFn, ZiTypeMapper, ZiWriteStats,
};
use crate::scanner::{ZiColumn, ZiRows, ZiValueMetadata};
use crate::tostring::ZiRendered;
use crate::value::{ZiCellKind, ZiCellValue};

/// Default NULL fragment.
pub const HTML_NULL: &str = r#"<span style="color:#aaaaaa;">[NULL]</span>"#;

const HTML_PREFIX: &str = concat!(
    r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>Zixport Export</title><style> "#,
    "body, html { margin: 0; padding: 0; } ",
    "* { margin: 0; padding: 0; } ",
    "th { border:1px solid #dedede; padding: 15px; border-top: 0px solid red; border-left: 0px solid red; } ",
    "td { border: 1px solid #dedede; border-top: 0px solid red; border-left: 0px solid red; ",
    "padding: 10px 10px 10px 10px; max-width:700px; overflow-x: auto; white-space: nowrap; ",
    "scrollbar-width: none; -ms-overflow-style: none; } ",
    ".td::-webkit-scrollbar { display: none; } ",
    "p.typ { margin-top: 5px; color: #333; } ",
    r#"</style> </head><body><table style="width:100%;border-spacing:0px;">"#,
);

const HTML_THEAD_OPEN: &str = r#"<thead style="position:sticky;top:0;z-index:99;background:#f9f9f9;">"#;
const HTML_SUFFIX: &str = "</table></body></html>";

/// Scalar options of the HTML codec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiHtmlOptions {
    pub write_header: bool,
    pub write_header_when_empty: bool,
    /// Markup written for NULL cells.
    pub null_value: String,
    /// Maximum number of kept rows; negative means unlimited.
    pub limit: i64,
}

impl Default for ZiHtmlOptions {
    fn default() -> Self {
        ZiHtmlOptions {
            write_header: true,
            write_header_when_empty: true,
            null_value: HTML_NULL.to_string(),
            limit: -1,
        }
    }
}

/// HTML table codec.
#[derive(Clone, Default)]
pub struct ZiHtmlCodec {
    options: ZiHtmlOptions,
    mapper: ZiTypeMapper<ZiRenderFn>,
    preprocessor: Option<ZiRowFilterFn>,
}

impl fmt::Debug for ZiHtmlCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiHtmlCodec")
            .field("options", &self.options)
            .field("mapper", &self.mapper)
            .field("preprocessor", &self.preprocessor.is_some())
            .finish()
    }
}

/// Which parts of the page have been opened so far.
#[derive(Debug, Default)]
struct ZiHtmlState {
    document_opened: bool,
    body_opened: bool,
}

impl ZiHtmlState {
    fn close(&self, sink: &mut dyn Write) -> Result<()> {
        if self.body_opened {
            sink.write_all(b"</tbody>")?;
        }
        if self.document_opened {
            sink.write_all(HTML_SUFFIX.as_bytes())?;
        }
        Ok(())
    }
}

impl ZiHtmlCodec {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &ZiHtmlOptions {
        &self.options
    }

    pub fn with_options(mut self, options: ZiHtmlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_custom_type<F>(mut self, kind: ZiCellKind, render: F) -> Self
    where
        F: Fn(&ZiCellValue, &ZiValueMetadata<'_>) -> ZiRendered + Send + Sync + 'static,
    {
        self.mapper.register(kind, Arc::new(render));
        self
    }

    pub fn with_preprocessor<F>(mut self, preprocessor: F) -> Self
    where
        F: Fn(usize, Vec<String>) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.preprocessor = Some(Arc::new(preprocessor));
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

    pub fn with_null_value(mut self, null_value: impl Into<String>) -> Self {
        self.options.null_value = null_value.into();
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.options.limit = limit;
        self
    }

    fn write_head(sink: &mut dyn Write, columns: &[ZiColumn]) -> Result<()> {
        sink.write_all(HTML_THEAD_OPEN.as_bytes())?;
        for column in columns {
            write!(
                sink,
                "<th><p>{}</p><p class=typ>{}</p></th>",
                column.name,
                column.database_type_name.to_lowercase()
            )?;
        }
        sink.write_all(b"</thead>")?;
        Ok(())
    }

    fn write_document(
        &self,
        rows: &mut dyn ZiRows,
        sink: &mut dyn Write,
        state: &mut ZiHtmlState,
        stats: &mut ZiWriteStats,
    ) -> Result<()> {
        let options = &self.options;
        let columns = rows.columns()?;
        let write_header = options.write_header && !columns.is_empty();

        if write_header && options.write_header_when_empty {
            sink.write_all(HTML_PREFIX.as_bytes())?;
            state.document_opened = true;
            Self::write_head(sink, &columns)?;
        }
        if options.limit == 0 {
            return Ok(());
        }

        let driver = rows.driver().to_string();
        let mut row_id = 1;
        while rows.next() {
            let values = scan_checked(rows, &columns, row_id)?;
            let mut row = Vec::with_capacity(values.len());
            for (value, column) in values.iter().zip(&columns) {
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
                        trace!("html row {row_id} dropped by preprocessor");
                        stats.rows_skipped += 1;
                        continue;
                    }
                },
                None => row,
            };

            if !state.document_opened {
                sink.write_all(HTML_PREFIX.as_bytes())?;
                state.document_opened = true;
                if write_header {
                    Self::write_head(sink, &columns)?;
                }
            }
            if !state.body_opened {
                sink.write_all(b"<tbody>")?;
                state.body_opened = true;
            }
            sink.write_all(b"<tr>")?;
            for cell in &row {
                write!(sink, "<td>{cell}</td>")?;
            }
            sink.write_all(b"</tr>")?;
            stats.rows_written += 1;

            if limit_reached(options.limit, row_id) {
                return Ok(());
            }
            row_id += 1;
        }

        finish_rows(rows)
    }
}

impl ZiCodec for ZiHtmlCodec {
    fn name(&self) -> &'static str {
        "html"
    }

    fn write(&self, rows: &mut dyn ZiRows, writer: &mut dyn Write) -> Result<ZiWriteStats> {
        debug!("html export started, driver {}", rows.driver());

        let mut stats = ZiWriteStats::default();
        let mut sink = ZiCountingWriter::new(writer);
        let mut state = ZiHtmlState::default();
        let result = self.write_document(rows, &mut sink, &mut state, &mut stats);
        let closed = state.close(&mut sink);
        stats.bytes_written = sink.bytes();
        result.and(closed)?;

        debug!(
            "html export finished: {} rows written, {} skipped",
            stats.rows_written, stats.rows_skipped
        );
        Ok(stats)
    }
}
