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

//! # monsql - MongoDB-style queries over SQL databases
//!
//! monsql lets you describe queries as nested filter documents instead of
//! hand-written SQL. Filters are compiled to exact SQL text and run
//! through a pluggable cursor; results come back lazily and are cached.
//!
//! ## Key Features
//!
//! - **Filter documents** - `{field: value}`, `{field: {$op: value}}`,
//!   `$and` / `$or` / `$not`, with `$eq $gt $gte $lt $lte $in $contains`
//! - **Deterministic SQL** - same document in, same text out, key order kept
//! - **Immutable queries** - every refinement returns a new query
//! - **Lazy result sets** - executed on first read, cached until invalidated
//! - **Dialects** - MySQL, SQLite and PostgreSQL quoting and LIMIT forms
//! - **SQLite built in** - via rusqlite (`sqlite` feature, on by default)
//!
//! ## Quick Start
//!
//! ```rust
//! use monsql::{Database, Document, FindOptions};
//! use serde_json::json;
//!
//! let db = Database::open("memory://").unwrap();
//! db.raw("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, number INTEGER)").unwrap();
//!
//! let t = db.get("t");
//! for i in 0..10 {
//!     let row = json!({"name": format!("jude{}", i), "number": i});
//!     t.insert(&Document::try_from(row).unwrap()).unwrap();
//! }
//!
//! let filter = Document::try_from(json!({"$not": {"number": {"$gte": 1}}})).unwrap();
//! let mut rows = t.find(FindOptions::new().filter(filter)).unwrap();
//! assert_eq!(rows.len().unwrap(), 1);
//! ```
//!
//! Compiling a filter on its own:
//!
//! ```rust
//! use monsql::{query::compile, Document};
//! use serde_json::json;
//!
//! let filter = Document::try_from(json!({"$and": [{"name": "jude0"}, {"number": 0}]})).unwrap();
//! assert_eq!(
//!     compile(Some(&filter)).unwrap().as_deref(),
//!     Some("(name = 'jude0') AND (number = 0)")
//! );
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Database, tables, lazy result sets and rows
//! - [`backend`] - Per-database introspection and the SQLite driver
//! - [`core`] - Core types ([`Value`], [`Document`], [`Dialect`], [`Error`])
//! - [`query`] - Filter compiler and statement builder

pub mod api;
pub mod backend;
pub mod core;
pub mod query;

// Re-export main types for convenience
pub use core::{
    Combinator, Dialect, Document, Error, Node, Operator, Result, SortOrder, Value, ASCENDING,
    DESCENDING,
};

// Re-export query building
pub use query::{CountSpec, FilterExpression, Query, Source};

// Re-export the database API
pub use api::{
    Config, Connection, Cursor, DataRow, Database, FetchState, FindOptions, FromValue,
    MemoryCursor, QuerySet, RawResult, Table, TransactionMode,
};

// Re-export backends
pub use backend::{Backend, MySqlBackend, PostgresBackend, SqliteBackend};
#[cfg(feature = "sqlite")]
pub use backend::{SqliteConnection, SqliteCursor};
