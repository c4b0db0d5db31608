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

//! Row source adapter over a fallible row iterator.

use crate::errors::{Result, ZiError};
use crate::scanner::{ZiColumn, ZiRows};
use crate::value::ZiCellValue;

/// Row source driven by an iterator of rows.
///
/// An `Err` item behaves like a failed fetch on a database cursor: iteration
/// stops and the error is reported by [`ZiRows::err`]. Rows are pulled lazily,
/// so sources larger than memory stream through a codec one row at a time.
pub struct ZiIterRows<I> {
    iter: I,
    columns: Vec<ZiColumn>,
    driver: String,
    current: Option<Vec<ZiCellValue>>,
    error: Option<ZiError>,
    done: bool,
}

impl<I> ZiIterRows<I>
where
    I: Iterator<Item = Result<Vec<ZiCellValue>>>,
{
    #[allow(non_snake_case)]
    pub fn new(columns: Vec<ZiColumn>, driver: impl Into<String>, iter: I) -> Self {
        ZiIterRows {
            iter,
            columns,
            driver: driver.into(),
            current: None,
            error: None,
            done: false,
        }
    }
}

impl<I> ZiRows for ZiIterRows<I>
where
    I: Iterator<Item = Result<Vec<ZiCellValue>>>,
{
    fn next(&mut self) -> bool {
        if self.done {
            return false;
        }
        match self.iter.next() {
            Some(Ok(row)) => {
                self.current = Some(row);
                true
            }
            Some(Err(err)) => {
                self.error = Some(err);
                self.done = true;
                false
            }
            None => {
                self.done = true;
                false
            }
        }
    }

    fn scan_row(&mut self) -> Result<Vec<ZiCellValue>> {
        self.current
            .take()
            .ok_or_else(|| ZiError::source(0, "scan called without calling next"))
    }

    fn columns(&mut self) -> Result<Vec<ZiColumn>> {
        Ok(self.columns.clone())
    }

    fn driver(&self) -> &str {
        &self.driver
    }

    fn err(&mut self) -> Option<ZiError> {
        self.error.take()
    }
}
