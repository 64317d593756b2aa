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

//! Database handle
//!
//! A [`Database`] owns one connection and one cursor. Every [`Table`]
//! handed out by [`Database::get`] and every [`QuerySet`](super::QuerySet)
//! issued from those tables shares that cursor, so a database handle must
//! not be driven from two threads at the same time.
//!
//! # Example
//!
//! ```
//! use monsql::{Database, Document, FindOptions};
//! use serde_json::json;
//!
//! let db = Database::open("memory://").unwrap();
//! db.raw("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, number INTEGER)").unwrap();
//!
//! let t = db.get("t");
//! t.insert(&Document::try_from(json!({"name": "jude0", "number": 0})).unwrap()).unwrap();
//!
//! let filter = Document::try_from(json!({"number": {"$gte": 0}})).unwrap();
//! let mut rows = t.find(FindOptions::new().filter(filter)).unwrap();
//! assert_eq!(rows.len().unwrap(), 1);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::backend::{backend_for, Backend};
use crate::core::{Dialect, Error, Result};

use super::config::{BackendKind, Config, TransactionMode};
use super::cursor::{execute_logged, shared, Connection, SharedCursor};
use super::row::DataRow;
use super::table::Table;

/// Outcome of [`Database::raw`]
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// The statement produced a result set
    Rows(Vec<DataRow>),
    /// The statement changed this many rows
    Affected(usize),
}

impl RawResult {
    /// Rows of a query, empty for writes
    pub fn into_rows(self) -> Vec<DataRow> {
        match self {
            RawResult::Rows(rows) => rows,
            RawResult::Affected(_) => Vec::new(),
        }
    }
}

/// Connection, cursor and backend shared by a database and its tables
pub(crate) struct Session {
    connection: Mutex<Box<dyn Connection>>,
    pub(crate) cursor: SharedCursor,
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) mode: TransactionMode,
}

impl Session {
    pub(crate) fn dialect(&self) -> Dialect {
        self.backend.dialect()
    }

    /// Execute one statement on the shared cursor
    pub(crate) fn execute(&self, sql: &str) -> Result<usize> {
        let mut cursor = self.cursor.lock();
        execute_logged(&mut **cursor, sql)
    }

    pub(crate) fn commit(&self) -> Result<()> {
        debug!("commit");
        self.connection.lock().commit()
    }

    /// Commit if the session runs in auto mode
    pub(crate) fn after_write(&self) -> Result<()> {
        match self.mode {
            TransactionMode::Auto => self.commit(),
            TransactionMode::Manual => Ok(()),
        }
    }
}

/// Database handle
///
/// Cheap to clone; clones share the connection and the table cache.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

struct DatabaseInner {
    session: Arc<Session>,
    tables: Mutex<FxHashMap<String, Table>>,
}

impl Database {
    /// Open a database from a DSN
    ///
    /// Only SQLite has a built-in driver. MySQL and PostgreSQL DSNs parse,
    /// but need a driver supplied through [`Database::with_connection`].
    pub fn open(dsn: &str) -> Result<Self> {
        Self::open_config(Config::from_dsn(dsn)?)
    }

    /// Open an in-memory SQLite database
    pub fn open_in_memory() -> Result<Self> {
        Self::open_config(Config::in_memory())
    }

    /// Open a database from a parsed configuration
    pub fn open_config(config: Config) -> Result<Self> {
        debug!(backend = %config.backend, path = ?config.path, "opening database");
        match config.backend {
            #[cfg(feature = "sqlite")]
            BackendKind::Sqlite => {
                use crate::backend::SqliteConnection;

                let connection = match &config.path {
                    Some(path) => SqliteConnection::open(path)?,
                    None => SqliteConnection::open_in_memory()?,
                };
                Self::with_connection(
                    connection,
                    backend_for(config.backend),
                    config.transaction_mode,
                )
            }
            kind => Err(Error::NotSupported(format!(
                "no built-in {} driver; supply one with Database::with_connection",
                kind
            ))),
        }
    }

    /// Wrap an externally supplied connection
    pub fn with_connection(
        connection: impl Connection + 'static,
        backend: Arc<dyn Backend>,
        mode: TransactionMode,
    ) -> Result<Self> {
        let mut connection: Box<dyn Connection> = Box::new(connection);
        let cursor = shared(connection.cursor()?);
        let session = Session {
            connection: Mutex::new(connection),
            cursor,
            backend,
            mode,
        };
        Ok(Database {
            inner: Arc::new(DatabaseInner {
                session: Arc::new(session),
                tables: Mutex::new(FxHashMap::default()),
            }),
        })
    }

    /// Table handle for `name`
    ///
    /// Handles are cached, so repeated calls share the introspected column
    /// list. The table is not checked for existence.
    pub fn get(&self, name: &str) -> Table {
        let mut tables = self.inner.tables.lock();
        tables
            .entry(name.to_string())
            .or_insert_with(|| Table::new(name, Arc::clone(&self.inner.session)))
            .clone()
    }

    /// Lower-cased names of all tables
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let session = &self.inner.session;
        let names = session.backend.list_tables(&mut **session.cursor.lock())?;
        Ok(names.into_iter().map(|n| n.to_lowercase()).collect())
    }

    /// Check whether a table exists (case-insensitive)
    pub fn is_table_existed(&self, name: &str) -> Result<bool> {
        let wanted = name.to_lowercase();
        Ok(self.list_tables()?.contains(&wanted))
    }

    /// Delete every row of a table
    pub fn truncate_table(&self, name: &str) -> Result<()> {
        let session = &self.inner.session;
        session
            .backend
            .truncate(&mut **session.cursor.lock(), name)?;
        session.after_write()
    }

    /// Turn foreign key enforcement on or off
    pub fn set_foreign_key_checks(&self, enabled: bool) -> Result<()> {
        let session = &self.inner.session;
        session
            .backend
            .set_foreign_key_checks(&mut **session.cursor.lock(), enabled)
    }

    /// Run arbitrary SQL
    ///
    /// Statements that return a result set come back as rows keyed by the
    /// reported column names. Nothing is committed automatically.
    pub fn raw(&self, sql: &str) -> Result<RawResult> {
        let mut cursor = self.inner.session.cursor.lock();
        let affected = execute_logged(&mut **cursor, sql)?;
        let columns = match cursor.description() {
            Some(columns) => Arc::new(columns),
            None => return Ok(RawResult::Affected(affected)),
        };
        let rows = cursor
            .fetch_all()?
            .into_iter()
            .map(|values| DataRow::new(Arc::clone(&columns), values))
            .collect::<Result<Vec<_>>>()?;
        Ok(RawResult::Rows(rows))
    }

    /// Make pending changes permanent
    pub fn commit(&self) -> Result<()> {
        self.inner.session.commit()
    }

    /// Close the connection
    ///
    /// Uncommitted changes are discarded. Cached tables are dropped; table
    /// handles obtained earlier fail on their next statement.
    pub fn close(&self) -> Result<()> {
        debug!("closing database");
        self.inner.tables.lock().clear();
        self.inner.session.connection.lock().close()
    }

    pub fn transaction_mode(&self) -> TransactionMode {
        self.inner.session.mode
    }

    pub fn dialect(&self) -> Dialect {
        self.inner.session.dialect()
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.inner.session.backend)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.dialect())
            .field("transaction_mode", &self.transaction_mode())
            .field("tables", &self.inner.tables.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::cursor::{Cursor, MemoryCursor};
    use crate::backend::MySqlBackend;
    use crate::core::Value;

    /// Connection handing out one scripted cursor and counting commits
    struct ScriptedConnection {
        cursor: Option<MemoryCursor>,
        commits: Arc<Mutex<usize>>,
    }

    impl Connection for ScriptedConnection {
        fn cursor(&mut self) -> Result<Box<dyn Cursor>> {
            match self.cursor.take() {
                Some(c) => Ok(Box::new(c)),
                None => Ok(Box::new(MemoryCursor::new())),
            }
        }

        fn commit(&mut self) -> Result<()> {
            *self.commits.lock() += 1;
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn scripted(
        cursor: MemoryCursor,
        mode: TransactionMode,
    ) -> (Database, Arc<Mutex<Vec<String>>>, Arc<Mutex<usize>>) {
        let log = cursor.log();
        let commits = Arc::new(Mutex::new(0));
        let conn = ScriptedConnection {
            cursor: Some(cursor),
            commits: Arc::clone(&commits),
        };
        let db = Database::with_connection(conn, Arc::new(MySqlBackend), mode).unwrap();
        (db, log, commits)
    }

    #[test]
    fn test_network_dsn_needs_a_driver() {
        assert!(matches!(
            Database::open("mysql://root@localhost/test"),
            Err(Error::NotSupported(_))
        ));
        assert!(matches!(
            Database::open("postgres://localhost/test"),
            Err(Error::NotSupported(_))
        ));
        assert!(matches!(Database::open("nope"), Err(Error::Config(_))));
    }

    #[test]
    fn test_get_caches_tables() {
        let (db, _, _) = scripted(MemoryCursor::new(), TransactionMode::Manual);
        let a = db.get("users");
        let b = db.get("users");
        assert!(a.same_handle(&b));
        assert!(!a.same_handle(&db.get("posts")));
    }

    #[test]
    fn test_list_tables_lowercases() {
        let cursor = MemoryCursor::new()
            .with_rows(&["t"], vec![vec![Value::text("Users")], vec![Value::text("POSTS")]])
            .with_rows(&["t"], vec![vec![Value::text("Users")]]);
        let (db, log, _) = scripted(cursor, TransactionMode::Manual);

        assert_eq!(db.list_tables().unwrap(), vec!["users", "posts"]);
        assert!(db.is_table_existed("USERS").unwrap());
        assert_eq!(log.lock().as_slice(), ["SHOW TABLES", "SHOW TABLES"]);
    }

    #[test]
    fn test_raw_rows_and_writes() {
        let cursor = MemoryCursor::new()
            .with_rows(&["n"], vec![vec![Value::Integer(4)]])
            .with_affected(2, None);
        let (db, _, commits) = scripted(cursor, TransactionMode::Auto);

        let rows = db.raw("SELECT COUNT(*) AS n FROM t").unwrap().into_rows();
        assert_eq!(rows[0].get_as::<i64>("n").unwrap(), 4);
        assert_eq!(db.raw("DELETE FROM t").unwrap(), RawResult::Affected(2));
        // raw never commits on its own
        assert_eq!(*commits.lock(), 0);
    }

    #[test]
    fn test_truncate_commits_in_auto_mode() {
        let (db, log, commits) = scripted(MemoryCursor::new(), TransactionMode::Auto);
        db.truncate_table("t").unwrap();
        assert_eq!(log.lock().as_slice(), ["TRUNCATE TABLE t"]);
        assert_eq!(*commits.lock(), 1);

        let (db, _, commits) = scripted(MemoryCursor::new(), TransactionMode::Manual);
        db.truncate_table("t").unwrap();
        assert_eq!(*commits.lock(), 0);
        db.commit().unwrap();
        assert_eq!(*commits.lock(), 1);
    }

    #[test]
    fn test_foreign_key_switch_goes_through_backend() {
        let (db, log, _) = scripted(MemoryCursor::new(), TransactionMode::Manual);
        db.set_foreign_key_checks(false).unwrap();
        assert_eq!(log.lock().as_slice(), ["SET foreign_key_checks = 0"]);
    }

    #[test]
    fn test_accessors() {
        let (db, _, _) = scripted(MemoryCursor::new(), TransactionMode::Auto);
        assert_eq!(db.transaction_mode(), TransactionMode::Auto);
        assert_eq!(db.dialect(), Dialect::MySql);
        assert_eq!(db.backend().dialect(), Dialect::MySql);
    }
}
