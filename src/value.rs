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

//! # Cell Value Module
//!
//! Row sources hand every cell to the codecs as a [`ZiCellValue`]. The set of
//! variants is closed so codecs match exhaustively; values of application
//! types travel as [`ZiCellValue::Custom`] and describe their own
//! serialization capabilities through [`ZiCustomValue`].
//!
//! ## Usage Example
//!
//! ```rust
//! use zixport::value::{ZiCellKind, ZiCellValue};
//!
//! let row: Vec<ZiCellValue> = vec![1_i32.into(), "a".into(), None::<bool>.into()];
//! assert_eq!(row[0].kind(), Some(ZiCellKind::Int));
//! assert!(row[2].is_null());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Capabilities of an application-defined cell value.
///
/// Every method is optional. The renderer probes them in a fixed order:
/// JSON form first, then human-readable form, then structural form, then
/// the `Debug` representation.
pub trait ZiCustomValue: fmt::Debug + Send + Sync {
    /// Stable name used as the override registry key.
    fn type_name(&self) -> &'static str;

    /// Custom JSON serialization. `None` means the type has no such capability;
    /// `Some(Err(_))` means it has one but it failed for this value.
    fn to_json(&self) -> Option<std::result::Result<String, String>> {
        None
    }

    /// Custom human-readable rendering.
    fn to_display(&self) -> Option<String> {
        None
    }

    /// Generic structural form. `None` means the value cannot be represented.
    fn to_structure(&self) -> Option<Value> {
        None
    }

    /// Access to the concrete type for override functions.
    fn as_any(&self) -> &dyn Any;
}

/// Type tag used to key per-type overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZiCellKind {
    Bool,
    Int,
    UInt,
    Float32,
    Float64,
    String,
    Bytes,
    Timestamp,
    Json,
    /// Application type, identified by [`ZiCustomValue::type_name`].
    Custom(&'static str),
}

impl ZiCellKind {
    /// Lower-case name, used as the declared type of inferred columns.
    pub fn name(&self) -> &'static str {
        match self {
            ZiCellKind::Bool => "bool",
            ZiCellKind::Int => "int64",
            ZiCellKind::UInt => "uint64",
            ZiCellKind::Float32 => "float32",
            ZiCellKind::Float64 => "float64",
            ZiCellKind::String => "string",
            ZiCellKind::Bytes => "bytes",
            ZiCellKind::Timestamp => "timestamp",
            ZiCellKind::Json => "json",
            ZiCellKind::Custom(name) => *name,
        }
    }
}

/// One cell of a row.
#[derive(Clone, Debug)]
pub enum ZiCellValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
    /// Generic structured value.
    Json(Value),
    Custom(Arc<dyn ZiCustomValue>),
}

impl ZiCellValue {
    /// Wraps an application value.
    pub fn custom<T: ZiCustomValue + 'static>(value: T) -> Self {
        ZiCellValue::Custom(Arc::new(value))
    }

    /// The zero timestamp sentinel, `0001-01-01T00:00:00Z`.
    pub fn zero_timestamp() -> DateTime<FixedOffset> {
        zero_instant().fixed_offset()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ZiCellValue::Null)
    }

    /// Override key for this value. `Null` has no kind.
    pub fn kind(&self) -> Option<ZiCellKind> {
        let kind = match self {
            ZiCellValue::Null => return None,
            ZiCellValue::Bool(_) => ZiCellKind::Bool,
            ZiCellValue::Int(_) => ZiCellKind::Int,
            ZiCellValue::UInt(_) => ZiCellKind::UInt,
            ZiCellValue::Float32(_) => ZiCellKind::Float32,
            ZiCellValue::Float64(_) => ZiCellKind::Float64,
            ZiCellValue::String(_) => ZiCellKind::String,
            ZiCellValue::Bytes(_) => ZiCellKind::Bytes,
            ZiCellValue::Timestamp(_) => ZiCellKind::Timestamp,
            ZiCellValue::Json(_) => ZiCellKind::Json,
            ZiCellValue::Custom(custom) => ZiCellKind::Custom(custom.type_name()),
        };
        Some(kind)
    }

    /// Declared type name for this value, `nil` for `Null`.
    pub fn type_name(&self) -> &'static str {
        self.kind().map(|kind| kind.name()).unwrap_or("nil")
    }
}

/// Zero time sentinel: the first instant of year 1, UTC.
pub(crate) fn zero_instant() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether `ts` is the zero timestamp sentinel, in any offset.
pub fn is_zero_timestamp(ts: &DateTime<FixedOffset>) -> bool {
    ts.with_timezone(&Utc) == zero_instant()
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ZiCellValue {
            fn from(value: $ty) -> Self {
                ZiCellValue::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ZiCellValue {
            fn from(value: $ty) -> Self {
                ZiCellValue::UInt(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for ZiCellValue {
    fn from(value: bool) -> Self {
        ZiCellValue::Bool(value)
    }
}

impl From<f32> for ZiCellValue {
    fn from(value: f32) -> Self {
        ZiCellValue::Float32(value)
    }
}

impl From<f64> for ZiCellValue {
    fn from(value: f64) -> Self {
        ZiCellValue::Float64(value)
    }
}

impl From<&str> for ZiCellValue {
    fn from(value: &str) -> Self {
        ZiCellValue::String(value.to_string())
    }
}

impl From<String> for ZiCellValue {
    fn from(value: String) -> Self {
        ZiCellValue::String(value)
    }
}

impl From<Vec<u8>> for ZiCellValue {
    fn from(value: Vec<u8>) -> Self {
        ZiCellValue::Bytes(value)
    }
}

impl From<&[u8]> for ZiCellValue {
    fn from(value: &[u8]) -> Self {
        ZiCellValue::Bytes(value.to_vec())
    }
}

impl From<DateTime<FixedOffset>> for ZiCellValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        ZiCellValue::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for ZiCellValue {
    fn from(value: DateTime<Utc>) -> Self {
        ZiCellValue::Timestamp(value.fixed_offset())
    }
}

impl From<Value> for ZiCellValue {
    fn from(value: Value) -> Self {
        ZiCellValue::Json(value)
    }
}

impl<T: Into<ZiCellValue>> From<Option<T>> for ZiCellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ZiCellValue::Null)
    }
}
