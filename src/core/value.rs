// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value type for monsql - the closed set of values a filter or row can carry
//!
//! Every value that enters the crate is converted into a [`Value`] once, at
//! the API boundary. The literal encoder matches on it exhaustively.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

/// Literal pattern for DATETIME values
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Literal pattern for DATE values
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A runtime value
///
/// Text and FieldRef use Arc<str> so rows and filter documents clone cheaply.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 text string
    Text(Arc<str>),

    /// Date and time without timezone, second precision on output
    DateTime(NaiveDateTime),

    /// Calendar date
    Date(NaiveDate),

    /// Raw SQL identifier or expression, emitted verbatim
    FieldRef(Arc<str>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a NULL value
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a float value
    pub fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    /// Create a datetime value
    pub fn datetime(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }

    /// Create a date value
    pub fn date(value: NaiveDate) -> Self {
        Value::Date(value)
    }

    /// Create a reference to another column or a raw SQL expression
    ///
    /// The text is emitted unquoted and unescaped, so it must never carry
    /// user input.
    pub fn field_ref(expr: impl Into<String>) -> Self {
        Value::FieldRef(Arc::from(expr.into().as_str()))
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Text(_) => "TEXT",
            Value::DateTime(_) => "DATETIME",
            Value::Date(_) => "DATE",
            Value::FieldRef(_) => "FIELD",
        }
    }

    // =========================================================================
    // Value extractors
    // =========================================================================

    /// Extract as i64
    ///
    /// Floats convert only when whole and within i64 range.
    pub fn as_int64(&self) -> Option<i64> {
        // 2^63, the first float past i64::MAX
        const BOUND: f64 = 9_223_372_036_854_775_808.0;
        match self {
            Value::Integer(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 && (-BOUND..BOUND).contains(v) => {
                Some(*v as i64)
            }
            Value::Text(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Extract as f64
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Extract as string reference (Text only)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as NaiveDateTime, parsing text in the literal pattern
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            Value::Text(s) => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok(),
            _ => None,
        }
    }

    /// Extract as NaiveDate, parsing text in the literal pattern
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            Value::Text(s) => NaiveDate::parse_from_str(s, DATE_FORMAT).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::FieldRef(s) => write!(f, "{}", s),
        }
    }
}

// =========================================================================
// From implementations
// =========================================================================

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Arc::from(v.as_str()))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(Arc::from(v))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
