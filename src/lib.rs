//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zixport.
//! The Zixport project belongs to the Dunimd Team.
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

//! # Zixport Core Library
//!
//! Zixport streams tabular data (rows of typed values plus column metadata)
//! into CSV, JSON, HTML and XML documents through one codec abstraction that
//! keeps the data source independent from the output format.
//!
//! ## Module Overview
//!
//! - **errors**: `ZiError` taxonomy and the crate `Result` alias
//! - **value**: Cell values (`ZiCellValue`), their type tags and custom value capabilities
//! - **tostring**: Deterministic value-to-text rendering with NULL detection
//! - **scanner**: Row source contract, column descriptors and built-in sources
//! - **export**: The four codecs, codec configuration and the file exporter
//!
//! ## Quick Start
//!
//! ```rust
//! use zixport::{ZiExporter, ZiJsonCodec, ZiSliceRows};
//!
//! let rows = ZiSliceRows::new(vec![
//!     vec![1_i64.into(), "a".into()],
//!     vec![2_i64.into(), "b".into()],
//! ]);
//! let mut out = Vec::new();
//! ZiExporter::new(rows, ZiJsonCodec::new()).write(&mut out)?;
//! ```
//!
//! ## Streaming
//!
//! Codecs pull one row at a time from the source and write it before pulling
//! the next. A failure stops the export and leaves the bytes written so far
//! in the sink; use [`ZiExporter::write_file`] for all-or-nothing files.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Row-scoped errors carry the
//! 1-based row number that failed.

#![allow(non_snake_case)]

pub mod errors;
pub mod export;
pub mod scanner;
pub mod tostring;
pub mod value;

pub use errors::{Result, ZiError};
pub use export::{
    ZiCodec, ZiCodecConfig, ZiCsvCodec, ZiCsvOptions, ZiExporter, ZiHtmlCodec, ZiHtmlOptions,
    ZiJsonCodec, ZiJsonOptions, ZiJsonRow, ZiTypeMapper, ZiWriteStats, ZiXmlCodec, ZiXmlOptions,
};
pub use scanner::{ZiColumn, ZiIterRows, ZiRows, ZiSliceRows, ZiValueMetadata};
pub use tostring::{render_value, ZiRendered};
pub use value::{ZiCellKind, ZiCellValue, ZiCustomValue};
