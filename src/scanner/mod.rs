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

//! # Row Source Module
//!
//! Codecs pull tabular data through the [`ZiRows`] trait: ordered column
//! descriptors once per export, then one row at a time. Implementations for
//! databases or analytical cursors live outside this crate; two in-crate
//! sources are provided:
//!
//! - **Slice** ([slice.rs](slice/index.html)): rows held in memory
//! - **Iter** ([iter.rs](iter/index.html)): any fallible row iterator

pub mod iter;
pub mod slice;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::value::ZiCellValue;

pub use iter::ZiIterRows;
pub use slice::ZiSliceRows;

/// Pull-based tabular data source.
///
/// The protocol is `next()` then `scan_row()` for each row. After `next()`
/// returns `false`, codecs call `err()` to learn whether iteration stopped
/// because of a failure.
pub trait ZiRows {
    /// Advances to the next row. Returns `false` when no row is available.
    fn next(&mut self) -> bool;

    /// Returns the values of the current row.
    fn scan_row(&mut self) -> Result<Vec<ZiCellValue>>;

    /// Ordered column descriptors of the result set.
    fn columns(&mut self) -> Result<Vec<ZiColumn>>;

    /// Opaque name of the driver or source, surfaced in value metadata.
    fn driver(&self) -> &str;

    /// Error that ended iteration, if any.
    fn err(&mut self) -> Option<ZiError> {
        None
    }
}

impl<R: ZiRows + ?Sized> ZiRows for Box<R> {
    fn next(&mut self) -> bool {
        (**self).next()
    }

    fn scan_row(&mut self) -> Result<Vec<ZiCellValue>> {
        (**self).scan_row()
    }

    fn columns(&mut self) -> Result<Vec<ZiColumn>> {
        (**self).columns()
    }

    fn driver(&self) -> &str {
        (**self).driver()
    }

    fn err(&mut self) -> Option<ZiError> {
        (**self).err()
    }
}

/// Describes one output column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiColumn {
    /// Zero-based position in the row.
    pub index: usize,
    pub name: String,
    /// `None` when the source does not know.
    pub nullable: Option<bool>,
    /// Source-specific type name, e.g. `VARCHAR` or `int64`.
    pub database_type_name: String,
    pub length: Option<i64>,
    /// Precision and scale for decimal columns.
    pub decimal_size: Option<(i64, i64)>,
}

impl ZiColumn {
    #[allow(non_snake_case)]
    pub fn new(index: usize, name: impl Into<String>, database_type_name: impl Into<String>) -> Self {
        ZiColumn {
            index,
            name: name.into(),
            database_type_name: database_type_name.into(),
            ..Default::default()
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_decimal_size(mut self, precision: i64, scale: i64) -> Self {
        self.decimal_size = Some((precision, scale));
        self
    }
}

/// Context handed to per-type override functions.
#[derive(Clone, Copy, Debug)]
pub struct ZiValueMetadata<'a> {
    /// 1-based number of the row, counting only rows that were kept.
    pub row_id: usize,
    pub driver: &'a str,
    pub column: &'a ZiColumn,
}
