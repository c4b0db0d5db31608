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

//! # Zixport Error Module
//!
//! This module defines the error types used by every codec and row source.
//!
//! ## Error Categories
//!
//! - **Source**: Column metadata or row read failures from a row source
//! - **Config**: Invalid codec configuration, detected before output starts
//! - **Sink**: Writes to the destination failed
//! - **Encoding**: A row could not be serialized into the target format
//! - **Serde**: Codec configuration documents could not be parsed
//!
//! Every failure is fatal to the export in progress. Bytes already written to
//! the sink stay written, so a failed export leaves an incomplete document.
//!
//! ## Usage
//!
//! ```rust
//! use zixport::errors::{Result, ZiError};
//!
//! fn check_header(header: &[String], width: usize) -> Result<()> {
//!     if header.len() != width {
//!         return Err(ZiError::config("invalid header length"));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Zixport.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for Zixport.
///
/// Row-scoped variants carry the 1-based number of the row being processed,
/// or 0 when the failure happened before the first row.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// Column metadata or row read failure reported by the row source.
    #[error("source error at row {row}: {message}")]
    Source { row: usize, message: String },

    /// Invalid codec configuration.
    #[error("config error: {message}")]
    Config { message: String },

    /// Writing to the destination failed.
    #[error("sink error: {0}")]
    Sink(String),

    /// Structural serialization of a row failed.
    #[error("encoding error at row {row}: {message}")]
    Encoding { row: usize, message: String },

    /// Configuration document parsing failed.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Sink(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for ZiError {
    fn from(err: serde_yaml::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<csv::Error> for ZiError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            return ZiError::Sink(err.to_string());
        }
        let row = err
            .position()
            .map(|pos| pos.record() as usize)
            .unwrap_or_default();
        ZiError::Encoding {
            row,
            message: err.to_string(),
        }
    }
}

impl ZiError {
    /// Helper to construct row source errors.
    pub fn source(row: usize, message: impl Into<String>) -> Self {
        ZiError::Source {
            row,
            message: message.into(),
        }
    }

    /// Helper to construct configuration errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        ZiError::Config {
            message: message.into(),
        }
    }

    /// Helper to construct encoding errors.
    pub fn encoding(row: usize, message: impl Into<String>) -> Self {
        ZiError::Encoding {
            row,
            message: message.into(),
        }
    }

    /// Returns the row number carried by row-scoped variants.
    pub fn row(&self) -> Option<usize> {
        match self {
            ZiError::Source { row, .. } | ZiError::Encoding { row, .. } => Some(*row),
            _ => None,
        }
    }
}
