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

//! In-memory row source backed by a vector of rows.

use std::vec::IntoIter;

use crate::errors::{Result, ZiError};
use crate::scanner::{ZiColumn, ZiRows};
use crate::value::ZiCellValue;

/// Row source over rows held in memory.
///
/// Columns are inferred from the first row as `column_<i>` with the value's
/// kind name as declared type, unless supplied with [`Self::with_columns`].
#[derive(Debug)]
pub struct ZiSliceRows {
    rows: IntoIter<Vec<ZiCellValue>>,
    columns: Vec<ZiColumn>,
    current: Option<Vec<ZiCellValue>>,
    cursor: usize,
}

impl ZiSliceRows {
    #[allow(non_snake_case)]
    pub fn new(rows: Vec<Vec<ZiCellValue>>) -> Self {
        let columns = rows
            .first()
            .map(|first| {
                first
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        ZiColumn::new(index, format!("column_{index}"), value.type_name())
                    })
                    .collect()
            })
            .unwrap_or_default();

        ZiSliceRows {
            rows: rows.into_iter(),
            columns,
            current: None,
            cursor: 0,
        }
    }

    /// Replaces the inferred column descriptors.
    pub fn with_columns(mut self, columns: Vec<ZiColumn>) -> Self {
        self.columns = columns;
        self
    }
}

impl ZiRows for ZiSliceRows {
    fn next(&mut self) -> bool {
        self.current = self.rows.next();
        self.current.is_some()
    }

    fn scan_row(&mut self) -> Result<Vec<ZiCellValue>> {
        let row = self
            .current
            .take()
            .ok_or_else(|| ZiError::source(self.cursor, "scan called without calling next"))?;
        self.cursor += 1;

        if row.len() != self.columns.len() {
            return Err(ZiError::source(
                self.cursor,
                format!(
                    "length of row {} != number of columns: {} != {}",
                    self.cursor,
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        Ok(row)
    }

    fn columns(&mut self) -> Result<Vec<ZiColumn>> {
        Ok(self.columns.clone())
    }

    fn driver(&self) -> &str {
        "zi-slice"
    }
}
