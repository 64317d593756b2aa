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

//! Backend capabilities
//!
//! Everything that differs between database families and is not plain
//! statement rendering: table listing, column introspection, truncation
//! and foreign key switches. Each backend issues its SQL through any
//! [`Cursor`], so it works with whichever driver sits behind the cursor.

pub mod mysql;
pub mod postgres;
pub mod sqlite;

use std::sync::Arc;

use crate::api::config::BackendKind;
use crate::api::cursor::{execute_logged, Cursor};
use crate::core::{Dialect, Result};

pub use mysql::MySqlBackend;
pub use postgres::PostgresBackend;
pub use sqlite::SqliteBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnection, SqliteCursor};

/// Backend-specific introspection and maintenance
pub trait Backend: Send + Sync {
    /// Dialect used to render statements for this backend
    fn dialect(&self) -> Dialect;

    /// Names of all tables, in the order the backend reports them
    fn list_tables(&self, cursor: &mut dyn Cursor) -> Result<Vec<String>>;

    /// Column names of `table`, in declaration order
    fn columns_of(&self, cursor: &mut dyn Cursor, table: &str) -> Result<Vec<String>>;

    /// Delete every row of `table`
    fn truncate(&self, cursor: &mut dyn Cursor, table: &str) -> Result<()>;

    /// Turn foreign key enforcement on or off for the session
    fn set_foreign_key_checks(&self, cursor: &mut dyn Cursor, enabled: bool) -> Result<()>;

    /// Quote an identifier for this backend
    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }
}

/// Backend implementation for a DSN family
pub fn backend_for(kind: BackendKind) -> Arc<dyn Backend> {
    match kind {
        BackendKind::Sqlite => Arc::new(SqliteBackend),
        BackendKind::MySql => Arc::new(MySqlBackend),
        BackendKind::Postgres => Arc::new(PostgresBackend),
    }
}

/// Run `sql` and collect the text of one column from every row
pub(crate) fn column_strings(
    cursor: &mut dyn Cursor,
    sql: &str,
    index: usize,
) -> Result<Vec<String>> {
    execute_logged(cursor, sql)?;
    Ok(cursor
        .fetch_all()?
        .into_iter()
        .filter_map(|row| row.get(index).map(|v| v.to_string()))
        .collect())
}
