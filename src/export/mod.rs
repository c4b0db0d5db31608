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

//! # Data Export Module
//!
//! This module provides the codecs that stream a [`ZiRows`] source into a
//! text document, and the exporter that binds a source to a codec.
//!
//! ## Module Components
//!
//! - **CSV** ([csv.rs](csv/index.html)): Delimited text with RFC 4180 quoting
//! - **JSON** ([json.rs](json/index.html)): JSON array or line-delimited JSON
//! - **HTML** ([html.rs](html/index.html)): Styled standalone HTML table
//! - **XML** ([xml.rs](xml/index.html)): `<data><row>...</row></data>` documents
//! - **Writer** ([writer.rs](writer/index.html)): Source/codec orchestration and file output
//!
//! ## Streaming Model
//!
//! Codecs pull one row at a time, convert it, optionally pass it through a
//! row preprocessor, and write it before pulling the next. Nothing beyond the
//! current row is buffered, so a failure leaves the bytes written so far in
//! the sink.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use zixport::export::{ZiCodec, ZiCsvCodec};
//! use zixport::scanner::ZiSliceRows;
//!
//! let mut rows = ZiSliceRows::new(vec![vec![1_i64.into(), "a".into()]]);
//! let mut out = Vec::new();
//! ZiCsvCodec::new().with_delimiter(';').write(&mut rows, &mut out)?;
//! assert_eq!(String::from_utf8(out).unwrap(), "column_0;column_1\n1;a\n");
//! ```

pub mod csv;
pub mod html;
pub mod json;
pub mod writer;
pub mod xml;

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::scanner::{ZiColumn, ZiRows, ZiValueMetadata};
use crate::tostring::{render_value, ZiRendered};
use crate::value::{ZiCellKind, ZiCellValue};

pub use self::csv::{ZiCsvCodec, ZiCsvOptions};
pub use self::html::{ZiHtmlCodec, ZiHtmlOptions};
pub use self::json::{ZiJsonCodec, ZiJsonOptions, ZiJsonRow};
pub use self::writer::ZiExporter;
pub use self::xml::{ZiXmlCodec, ZiXmlOptions};

/// Streams a row source into one complete document.
pub trait ZiCodec: Send + Sync {
    /// Short format name used in logs.
    fn name(&self) -> &'static str;

    /// Writes every row of `rows` to `writer`.
    fn write(&self, rows: &mut dyn ZiRows, writer: &mut dyn Write) -> Result<ZiWriteStats>;
}

/// Counters reported by a finished export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiWriteStats {
    /// Rows that reached the output.
    pub rows_written: usize,
    /// Rows dropped by the row preprocessor.
    pub rows_skipped: usize,
    /// Bytes handed to the sink, framing included.
    pub bytes_written: usize,
}

/// Text override: raw value plus context in, rendered text out.
pub type ZiRenderFn = Arc<dyn Fn(&ZiCellValue, &ZiValueMetadata<'_>) -> ZiRendered + Send + Sync>;

/// Preprocessor for text rows. Returning `None` drops the row.
pub type ZiRowFilterFn = Arc<dyn Fn(usize, Vec<String>) -> Option<Vec<String>> + Send + Sync>;

/// Per-type override registry keyed by [`ZiCellKind`].
///
/// Lookup is by exact kind; registering a kind twice keeps the last function.
pub struct ZiTypeMapper<F> {
    mappers: HashMap<ZiCellKind, F>,
}

impl<F> Default for ZiTypeMapper<F> {
    fn default() -> Self {
        ZiTypeMapper {
            mappers: HashMap::new(),
        }
    }
}

impl<F: Clone> Clone for ZiTypeMapper<F> {
    fn clone(&self) -> Self {
        ZiTypeMapper {
            mappers: self.mappers.clone(),
        }
    }
}

impl<F> fmt::Debug for ZiTypeMapper<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.mappers.keys()).finish()
    }
}

impl<F> ZiTypeMapper<F> {
    pub fn register(&mut self, kind: ZiCellKind, mapper: F) {
        self.mappers.insert(kind, mapper);
    }

    /// Override registered for the value's kind. `Null` never matches.
    pub fn lookup(&self, value: &ZiCellValue) -> Option<&F> {
        value.kind().and_then(|kind| self.mappers.get(&kind))
    }

    pub fn contains(&self, kind: ZiCellKind) -> bool {
        self.mappers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

/// Renders one cell: NULL first, then an override, then the default renderer.
pub(crate) fn render_cell(
    mapper: &ZiTypeMapper<ZiRenderFn>,
    value: &ZiCellValue,
    metadata: &ZiValueMetadata<'_>,
) -> ZiRendered {
    if value.is_null() {
        return ZiRendered::null();
    }
    match mapper.lookup(value) {
        Some(render) => render(value, metadata),
        None => render_value(value),
    }
}

/// Scans the current row and checks its arity against the column count.
pub(crate) fn scan_checked(
    rows: &mut dyn ZiRows,
    columns: &[ZiColumn],
    row_id: usize,
) -> Result<Vec<ZiCellValue>> {
    let values = rows.scan_row()?;
    if values.len() != columns.len() {
        return Err(ZiError::source(
            row_id,
            format!(
                "row has {} values but the source declares {} columns",
                values.len(),
                columns.len()
            ),
        ));
    }
    Ok(values)
}

/// Surfaces the error that ended iteration, if any.
pub(crate) fn finish_rows(rows: &mut dyn ZiRows) -> Result<()> {
    match rows.err() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Whether `row_id` kept rows exhaust `limit`. Negative limits never do.
pub(crate) fn limit_reached(limit: i64, row_id: usize) -> bool {
    limit >= 0 && row_id as i64 >= limit
}

/// Sink wrapper that counts bytes handed to the destination.
pub(crate) struct ZiCountingWriter<'a> {
    inner: &'a mut dyn Write,
    bytes: usize,
}

impl<'a> ZiCountingWriter<'a> {
    pub(crate) fn new(inner: &'a mut dyn Write) -> Self {
        ZiCountingWriter { inner, bytes: 0 }
    }

    pub(crate) fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Write for ZiCountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Serializable codec selection, e.g. loaded from a YAML or JSON file.
///
/// ```yaml
/// format: csv
/// delimiter: ";"
/// null_value: NULL
/// limit: 100
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ZiCodecConfig {
    Csv(ZiCsvOptions),
    Json(ZiJsonOptions),
    Html(ZiHtmlOptions),
    Xml(ZiXmlOptions),
}

impl ZiCodecConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Default configuration inferred from a file extension.
    pub fn for_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path
            .as_ref()
            .extension()?
            .to_string_lossy()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "csv" => ZiCodecConfig::Csv(ZiCsvOptions::default()),
            "tsv" => ZiCodecConfig::Csv(ZiCsvOptions {
                delimiter: '\t',
                ..Default::default()
            }),
            "json" => ZiCodecConfig::Json(ZiJsonOptions::default()),
            "jsonl" | "ndjson" => ZiCodecConfig::Json(ZiJsonOptions {
                newline_delimited: true,
                ..Default::default()
            }),
            "html" | "htm" => ZiCodecConfig::Html(ZiHtmlOptions::default()),
            "xml" => ZiCodecConfig::Xml(ZiXmlOptions::default()),
            _ => return None,
        };
        Some(config)
    }

    /// Builds a codec with these options and no callbacks.
    pub fn build(&self) -> Box<dyn ZiCodec> {
        match self {
            ZiCodecConfig::Csv(options) => Box::new(ZiCsvCodec::new().with_options(options.clone())),
            ZiCodecConfig::Json(options) => {
                Box::new(ZiJsonCodec::new().with_options(options.clone()))
            }
            ZiCodecConfig::Html(options) => {
                Box::new(ZiHtmlCodec::new().with_options(options.clone()))
            }
            ZiCodecConfig::Xml(options) => Box::new(ZiXmlCodec::new().with_options(options.clone())),
        }
    }
}
