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

//! Row accessor
//!
//! Read-only view of one materialized row keyed by column name.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::core::{Document, Error, Result, Value, DATETIME_FORMAT, DATE_FORMAT};

/// A single fetched row
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    /// Shared column names (one allocation per result set)
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl DataRow {
    /// Zip a row with its column names
    ///
    /// Fails with [`Error::RowShape`] when the arities differ.
    pub fn new(columns: Arc<Vec<String>>, values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(Error::row_shape(columns.len(), values.len()));
        }
        Ok(Self { columns, values })
    }

    /// Get a column value by name
    pub fn get(&self, column: &str) -> Result<&Value> {
        self.position(column)
            .map(|i| &self.values[i])
            .ok_or_else(|| Error::FieldNotFound(column.to_string()))
    }

    /// Get a column value by name with type conversion
    ///
    /// # Example
    ///
    /// ```ignore
    /// let id: i64 = row.get_as("id")?;
    /// let name: Option<String> = row.get_as("name")?;
    /// ```
    pub fn get_as<T: FromValue>(&self, column: &str) -> Result<T> {
        T::from_value(self.get(column)?)
    }

    /// Get a column value by position
    pub fn get_index(&self, index: usize) -> Result<&Value> {
        self.values
            .get(index)
            .ok_or(Error::ColumnIndexOutOfBounds { index })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check whether the row carries a column
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// (column, value) pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Copy the row into an ordered document
    pub fn to_document(&self) -> Document {
        self.iter().map(|(c, v)| (c, v.clone())).collect()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Trait for converting from Value to a Rust type
pub trait FromValue: Sized {
    /// Convert a Value to Self
    fn from_value(value: &Value) -> Result<Self>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(*i),
            Value::Float(f) => value
                .as_int64()
                .ok_or_else(|| Error::type_conversion(format!("Float {}", f), "Integer")),
            _ => Err(Error::type_conversion(value.type_name(), "Integer")),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| Error::type_conversion(wide.to_string(), "i32"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            _ => Err(Error::type_conversion(value.type_name(), "Float")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Err(Error::type_conversion("Null", "String")),
            Value::Text(s) | Value::FieldRef(s) => Ok(s.to_string()),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            // SQLite keeps timestamps as text
            Value::Text(s) => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .map_err(|_| Error::type_conversion(format!("'{}'", s), "DateTime")),
            _ => Err(Error::type_conversion(value.type_name(), "DateTime")),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::DateTime(dt) => Ok(dt.date()),
            Value::Text(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|_| Error::type_conversion(format!("'{}'", s), "Date")),
            _ => Err(Error::type_conversion(value.type_name(), "Date")),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::from_value(value)?))
        }
    }
}
