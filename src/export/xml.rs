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

//! # XML Codec
//!
//! Writes `<data>` with one `<row>` per kept row and one child element per
//! non-NULL column, named after the column. NULL cells are omitted from the
//! row entirely.
//!
//! The declaration and root element are written with the first kept row and
//! `</data>` only after one was written, so an empty result is empty output.
//!
//! ## Escaping
//!
//! Cell text is escaped with quick-xml. Characters that XML 1.0 does not
//! allow at all (C0 controls other than tab, line feed and carriage return,
//! and U+FFFE/U+FFFF) are replaced with U+FFFD first. Column names are used
//! as element names verbatim.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use log::{debug, trace};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::export::{
    finish_rows, limit_reached, render_cell, scan_checked, ZiCodec, ZiCountingWriter,
    ZiRenderFn, ZiRowFilterFn, ZiTypeMapper, ZiWriteStats,
};
use crate::scanner::{ZiRows, ZiValueMetadata};
use crate::tostring::ZiRendered;
use crate::value::{ZiCellKind, ZiCellValue};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<data>\n";

/// Scalar options of the XML codec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiXmlOptions {
    /// Maximum number of kept rows; negative means unlimited.
    pub limit: i64,
}

impl Default for ZiXmlOptions {
    fn default() -> Self {
        ZiXmlOptions { limit: -1 }
    }
}

/// XML document codec.
#[derive(Clone, Default)]
pub struct ZiXmlCodec {
    options: ZiXmlOptions,
    mapper: ZiTypeMapper<ZiRenderFn>,
    preprocessor: Option<ZiRowFilterFn>,
}

impl fmt::Debug for ZiXmlCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiXmlCodec")
            .field("options", &self.options)
            .field("mapper", &self.mapper)
            .field("preprocessor", &self.preprocessor.is_some())
            .finish()
    }
}

impl ZiXmlCodec {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &ZiXmlOptions {
        &self.options
    }

    pub fn with_options(mut self, options: ZiXmlOptions) -> Self {
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

    /// Sets the row preprocessor. NULL cells reach it as empty strings and
    /// are still omitted from the output whatever text it puts in their slot.
    pub fn with_preprocessor<F>(mut self, preprocessor: F) -> Self
    where
        F: Fn(usize, Vec<String>) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.preprocessor = Some(Arc::new(preprocessor));
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.options.limit = limit;
        self
    }

    fn write_rows(
        &self,
        rows: &mut dyn ZiRows,
        sink: &mut dyn Write,
        opened: &mut bool,
        stats: &mut ZiWriteStats,
    ) -> Result<()> {
        if self.options.limit == 0 {
            return Ok(());
        }
        let columns = rows.columns()?;

        let driver = rows.driver().to_string();
        let mut row_id = 1;
        while rows.next() {
            let values = scan_checked(rows, &columns, row_id)?;
            let mut row = Vec::with_capacity(values.len());
            let mut nulls = Vec::with_capacity(values.len());
            for (value, column) in values.iter().zip(&columns) {
                let metadata = ZiValueMetadata {
                    row_id,
                    driver: &driver,
                    column,
                };
                let rendered = render_cell(&self.mapper, value, &metadata);
                nulls.push(rendered.is_null);
                row.push(rendered.text);
            }

            let row = match &self.preprocessor {
                Some(preprocess) => match preprocess(row_id, row) {
                    Some(row) => row,
                    None => {
                        trace!("xml row {row_id} dropped by preprocessor");
                        stats.rows_skipped += 1;
                        continue;
                    }
                },
                None => row,
            };
            if row.len() > columns.len() {
                return Err(ZiError::encoding(
                    row_id,
                    format!(
                        "row has {} fields but only {} columns are named",
                        row.len(),
                        columns.len()
                    ),
                ));
            }

            if !*opened {
                sink.write_all(XML_DECLARATION.as_bytes())?;
                *opened = true;
            }
            sink.write_all(b"<row>")?;
            for ((text, column), is_null) in row.iter().zip(&columns).zip(&nulls) {
                if *is_null {
                    continue;
                }
                let text = xml_chars(text);
                write!(sink, "<{name}>{}</{name}>", escape(&*text), name = column.name)?;
            }
            sink.write_all(b"</row>\n")?;
            stats.rows_written += 1;

            if limit_reached(self.options.limit, row_id) {
                return Ok(());
            }
            row_id += 1;
        }

        finish_rows(rows)
    }
}

impl ZiCodec for ZiXmlCodec {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn write(&self, rows: &mut dyn ZiRows, writer: &mut dyn Write) -> Result<ZiWriteStats> {
        debug!("xml export started, driver {}", rows.driver());

        let mut stats = ZiWriteStats::default();
        let mut sink = ZiCountingWriter::new(writer);
        let mut opened = false;
        let result = self.write_rows(rows, &mut sink, &mut opened, &mut stats);
        let closed = if opened {
            sink.write_all(b"</data>\n").map_err(ZiError::from)
        } else {
            Ok(())
        };
        stats.bytes_written = sink.bytes();
        result.and(closed)?;

        debug!(
            "xml export finished: {} rows written, {} skipped",
            stats.rows_written, stats.rows_skipped
        );
        Ok(stats)
    }
}

/// Replaces characters outside the XML 1.0 `Char` production with U+FFFD.
fn xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_xml_char(c) { c } else { '\u{FFFD}' })
            .collect(),
    )
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}
