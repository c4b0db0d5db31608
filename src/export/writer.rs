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

//! # Export Writer Module
//!
//! This module binds a row source to a codec and writes the result to any
//! [`Write`] sink or to a file.
//!
//! ## File Output
//!
//! [`ZiExporter::write_file`] creates missing parent directories and buffers
//! the file. With atomic writes enabled (the default) the document is written
//! to a hidden sibling `.{name}.tmp` and renamed over the target only once
//! the codec succeeded, so readers never observe a truncated export. A failed
//! export removes the temporary file and leaves any previous target intact.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::errors::{Result, ZiError};
use crate::export::{ZiCodec, ZiCodecConfig, ZiWriteStats};
use crate::scanner::ZiRows;

/// Export orchestrator: one row source, one codec.
///
/// Row sources are single-pass, so an exporter performs one export. Build a
/// new one (or hand it a fresh source) to export again.
pub struct ZiExporter<R> {
    rows: R,
    codec: Box<dyn ZiCodec>,
    atomic_write: bool,
}

impl<R: ZiRows> ZiExporter<R> {
    #[allow(non_snake_case)]
    pub fn new<C: ZiCodec + 'static>(rows: R, codec: C) -> Self {
        Self::with_boxed_codec(rows, Box::new(codec))
    }

    #[allow(non_snake_case)]
    pub fn with_boxed_codec(rows: R, codec: Box<dyn ZiCodec>) -> Self {
        ZiExporter {
            rows,
            codec,
            atomic_write: true,
        }
    }

    /// Exporter whose codec is built from a serialized configuration.
    #[allow(non_snake_case)]
    pub fn from_config(rows: R, config: &ZiCodecConfig) -> Self {
        Self::with_boxed_codec(rows, config.build())
    }

    /// Exporter whose codec is picked from the target file extension.
    #[allow(non_snake_case)]
    pub fn for_path(rows: R, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = ZiCodecConfig::for_path(path).ok_or_else(|| {
            ZiError::config(format!("cannot infer export format from {}", path.display()))
        })?;
        Ok(Self::from_config(rows, &config))
    }

    /// Toggles temp-file-and-rename for [`write_file`](Self::write_file).
    pub fn with_atomic_write(mut self, atomic_write: bool) -> Self {
        self.atomic_write = atomic_write;
        self
    }

    pub fn codec(&self) -> &dyn ZiCodec {
        self.codec.as_ref()
    }

    pub fn into_rows(self) -> R {
        self.rows
    }

    /// Streams every row into `writer`.
    pub fn write(&mut self, writer: &mut dyn Write) -> Result<ZiWriteStats> {
        self.codec.write(&mut self.rows, writer)
    }

    /// Writes the export to `path`.
    pub fn write_file(&mut self, path: impl AsRef<Path>) -> Result<ZiWriteStats> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let stats = if self.atomic_write {
            let temp_path = temp_path(path);
            debug!(
                "{} export to {} via {}",
                self.codec.name(),
                path.display(),
                temp_path.display()
            );
            match self.write_to_path(&temp_path) {
                Ok(stats) => {
                    fs::rename(&temp_path, path)?;
                    stats
                }
                Err(err) => {
                    if let Err(remove_err) = fs::remove_file(&temp_path) {
                        warn!(
                            "failed to remove temporary file {}: {remove_err}",
                            temp_path.display()
                        );
                    }
                    return Err(err);
                }
            }
        } else {
            self.write_to_path(path)?
        };

        info!(
            "exported {} rows ({} bytes) as {} to {}",
            stats.rows_written,
            stats.bytes_written,
            self.codec.name(),
            path.display()
        );
        Ok(stats)
    }

    fn write_to_path(&mut self, path: &Path) -> Result<ZiWriteStats> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let stats = self.write(&mut writer)?;
        let file = writer
            .into_inner()
            .map_err(|err| ZiError::Sink(err.error().to_string()))?;
        file.sync_all()?;
        Ok(stats)
    }
}

/// Hidden sibling used for atomic writes.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(".{name}.tmp"))
}
