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

//! Top-level Database API
//!
//! # Quick Start
//!
//! ```
//! use monsql::{Database, Document, FindOptions, SortOrder};
//! use serde_json::json;
//!
//! // Open an in-memory database and create a table
//! let db = Database::open("memory://").unwrap();
//! db.raw("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)").unwrap();
//!
//! // Insert rows; column order follows the document
//! let users = db.get("users");
//! users.insert(&Document::try_from(json!({"name": "Alice", "age": 30})).unwrap()).unwrap();
//! users.insert(&Document::try_from(json!({"name": "Bob", "age": 25})).unwrap()).unwrap();
//!
//! // Query with a filter document
//! let filter = Document::try_from(json!({"age": {"$gt": 20}, "name": {"$contains": "li"}})).unwrap();
//! let mut found = users
//!     .find(FindOptions::new().filter(filter).sort([("age", SortOrder::Ascending)]))
//!     .unwrap();
//! for row in found.iter().unwrap() {
//!     let name: String = row.get_as("name").unwrap();
//!     assert_eq!(name, "Alice");
//! }
//!
//! // Nothing is durable until commit
//! db.commit().unwrap();
//! ```
//!
//! # Transaction modes
//!
//! In [`TransactionMode::Manual`] (the default) writes stay pending until
//! [`Database::commit`]. A `?mode=auto` DSN commits after every table write.

pub mod config;
pub mod cursor;
pub mod database;
pub mod queryset;
pub mod row;
pub mod table;

pub use config::{BackendKind, Config, TransactionMode};
pub use cursor::{shared, Connection, Cursor, MemoryCursor, SharedCursor};
pub use database::{Database, RawResult};
pub use queryset::{FetchState, QuerySet};
pub use row::{DataRow, FromValue};
pub use table::{FindOptions, Table};
