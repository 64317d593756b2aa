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

//! Error types for monsql
//!
//! Everything except [`Error::RowShape`] and [`Error::Database`] is raised
//! while compiling or building a statement, before any SQL reaches the
//! database.

use thiserror::Error;

/// Result type alias for monsql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for monsql
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Build-time errors
    // =========================================================================
    /// Malformed filter document, unknown operator, bad combinator arity,
    /// or a repeated limit assignment
    #[error("query syntax error: {0}")]
    QuerySyntax(String),

    /// Subquery without alias, or a write aimed at a subquery source
    #[error("source error: {0}")]
    Source(String),

    /// A value that has no SQL literal encoding
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    // =========================================================================
    // Execution errors
    // =========================================================================
    /// Fetched row arity does not match the requested field list
    #[error("row shape mismatch: expected {expected} columns, got {got}")]
    RowShape { expected: usize, got: usize },

    /// Column lookup on a row that does not carry it
    #[error("field '{0}' not found")]
    FieldNotFound(String),

    /// Column index out of bounds
    #[error("column index {index} out of bounds")]
    ColumnIndexOutOfBounds { index: usize },

    /// Type conversion error
    #[error("type conversion error: cannot convert {from} to {to}")]
    TypeConversion { from: String, to: String },

    /// Error reported by the database collaborator, message kept verbatim
    #[error("{0}")]
    Database(String),

    // =========================================================================
    // Other errors
    // =========================================================================
    /// Operation not supported
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Invalid DSN or configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection has been closed
    #[error("connection closed")]
    ConnectionClosed,
}

impl Error {
    /// Create a new QuerySyntax error
    pub fn query_syntax(message: impl Into<String>) -> Self {
        Error::QuerySyntax(message.into())
    }

    /// Create a new Source error
    pub fn source_error(message: impl Into<String>) -> Self {
        Error::Source(message.into())
    }

    /// Create a new UnsupportedValue error
    pub fn unsupported_value(message: impl Into<String>) -> Self {
        Error::UnsupportedValue(message.into())
    }

    /// Create a new RowShape error
    pub fn row_shape(expected: usize, got: usize) -> Self {
        Error::RowShape { expected, got }
    }

    /// Create a new TypeConversion error
    pub fn type_conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Error::TypeConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new Database error
    pub fn database(message: impl Into<String>) -> Self {
        Error::Database(message.into())
    }

    /// Create a new Config error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Check if this is a query syntax error
    pub fn is_query_syntax(&self) -> bool {
        matches!(self, Error::QuerySyntax(_))
    }

    /// Check if this is a source error
    pub fn is_source_error(&self) -> bool {
        matches!(self, Error::Source(_))
    }

    /// Check if this error was raised before any SQL was executed
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Error::QuerySyntax(_) | Error::Source(_) | Error::UnsupportedValue(_)
        )
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err.to_string())
    }
}
