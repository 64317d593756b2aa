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

//! Core types and definitions for monsql
//!
//! - [`Value`] - The closed set of literal values
//! - [`Document`] / [`Node`] - Ordered raw filter and attribute documents
//! - [`Operator`] / [`Combinator`] - The filter grammar keywords
//! - [`SortOrder`] - ORDER BY direction
//! - [`Dialect`] - Backend-specific rendering choices
//! - [`Error`] - Error types for all operations

pub mod document;
pub mod error;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use document::{Document, Node};
pub use error::{Error, Result};
pub use types::{
    is_reserved_word, Combinator, Dialect, Operator, SortOrder, ASCENDING, DESCENDING,
    RESERVED_WORDS,
};
pub use value::{Value, DATETIME_FORMAT, DATE_FORMAT};
