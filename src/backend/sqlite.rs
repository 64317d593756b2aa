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

//! SQLite backend
//!
//! [`SqliteBackend`] covers introspection. With the `sqlite` feature,
//! [`SqliteConnection`] and [`SqliteCursor`] drive a real database through
//! rusqlite.

use crate::api::cursor::{execute_logged, Cursor};
use crate::core::{Dialect, Result};

use super::{column_strings, Backend};

/// Introspection through `sqlite_master` and `PRAGMA`
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteBackend;

impl Backend for SqliteBackend {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn list_tables(&self, cursor: &mut dyn Cursor) -> Result<Vec<String>> {
        column_strings(
            cursor,
            "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
            0,
        )
    }

    fn columns_of(&self, cursor: &mut dyn Cursor, table: &str) -> Result<Vec<String>> {
        // table_info rows: cid, name, type, notnull, dflt_value, pk
        let sql = format!("PRAGMA table_info({})", self.quote_identifier(table));
        column_strings(cursor, &sql, 1)
    }

    fn truncate(&self, cursor: &mut dyn Cursor, table: &str) -> Result<()> {
        // No TRUNCATE in SQLite
        let sql = format!("DELETE FROM {}", self.dialect().column(table));
        execute_logged(cursor, &sql).map(|_| ())
    }

    fn set_foreign_key_checks(&self, cursor: &mut dyn Cursor, enabled: bool) -> Result<()> {
        let sql = format!("PRAGMA foreign_keys = {}", if enabled { "ON" } else { "OFF" });
        execute_logged(cursor, &sql).map(|_| ())
    }
}

#[cfg(feature = "sqlite")]
pub use driver::{SqliteConnection, SqliteCursor};

#[cfg(feature = "sqlite")]
mod driver {
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use rusqlite::types::ValueRef;

    use crate::api::cursor::{Connection, Cursor};
    use crate::core::{Error, Result, Value};

    type Handle = Arc<Mutex<Option<rusqlite::Connection>>>;

    /// SQLite session
    ///
    /// Follows the usual driver transaction model: the first data-changing
    /// statement after a commit opens a transaction, and nothing is durable
    /// until [`Connection::commit`] runs. Cursors share the session.
    pub struct SqliteConnection {
        handle: Handle,
    }

    impl SqliteConnection {
        /// Open (or create) a database file
        pub fn open(path: impl AsRef<Path>) -> Result<Self> {
            Ok(Self::from_rusqlite(rusqlite::Connection::open(path)?))
        }

        /// Open a private in-memory database
        pub fn open_in_memory() -> Result<Self> {
            Ok(Self::from_rusqlite(rusqlite::Connection::open_in_memory()?))
        }

        /// Wrap an already open rusqlite connection
        pub fn from_rusqlite(conn: rusqlite::Connection) -> Self {
            Self {
                handle: Arc::new(Mutex::new(Some(conn))),
            }
        }
    }

    impl Connection for SqliteConnection {
        fn cursor(&mut self) -> Result<Box<dyn Cursor>> {
            if self.handle.lock().is_none() {
                return Err(Error::ConnectionClosed);
            }
            Ok(Box::new(SqliteCursor {
                handle: Arc::clone(&self.handle),
                pending: VecDeque::new(),
                description: None,
                last_insert_id: None,
            }))
        }

        fn commit(&mut self) -> Result<()> {
            let guard = self.handle.lock();
            let conn = guard.as_ref().ok_or(Error::ConnectionClosed)?;
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")?;
            }
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            match self.handle.lock().take() {
                // Uncommitted work is rolled back by SQLite on close
                Some(conn) => conn.close().map_err(|(_, err)| Error::from(err)),
                None => Ok(()),
            }
        }
    }

    /// Cursor over a [`SqliteConnection`]
    pub struct SqliteCursor {
        handle: Handle,
        pending: VecDeque<Vec<Value>>,
        description: Option<Vec<String>>,
        last_insert_id: Option<i64>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum StatementKind {
        Insert,
        Write,
        Other,
    }

    fn statement_kind(sql: &str) -> StatementKind {
        let keyword = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("")
            .to_uppercase();
        match keyword.as_str() {
            "INSERT" | "REPLACE" => StatementKind::Insert,
            "UPDATE" | "DELETE" => StatementKind::Write,
            _ => StatementKind::Other,
        }
    }

    fn to_value(value: ValueRef<'_>) -> Result<Value> {
        match value {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Integer(i) => Ok(Value::Integer(i)),
            ValueRef::Real(f) => Ok(Value::Float(f)),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(Value::text)
                .map_err(|e| Error::unsupported_value(format!("TEXT column is not UTF-8: {}", e))),
            ValueRef::Blob(_) => Err(Error::unsupported_value("BLOB columns cannot be read")),
        }
    }

    impl Cursor for SqliteCursor {
        fn execute(&mut self, sql: &str) -> Result<usize> {
            self.pending.clear();
            self.description = None;

            let guard = self.handle.lock();
            let conn = guard.as_ref().ok_or(Error::ConnectionClosed)?;

            let kind = statement_kind(sql);
            if kind != StatementKind::Other && conn.is_autocommit() {
                conn.execute_batch("BEGIN")?;
            }

            let mut stmt = conn.prepare(sql)?;
            let width = stmt.column_count();
            if width == 0 {
                let changed = stmt.execute([])?;
                if kind == StatementKind::Insert && changed > 0 {
                    self.last_insert_id = Some(conn.last_insert_rowid());
                }
                return Ok(changed);
            }

            let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
            let mut rows = stmt.query([])?;
            let mut fetched = VecDeque::new();
            while let Some(row) = rows.next()? {
                let values = (0..width)
                    .map(|i| to_value(row.get_ref(i)?))
                    .collect::<Result<Vec<_>>>()?;
                fetched.push_back(values);
            }

            self.description = Some(names);
            self.pending = fetched;
            Ok(0)
        }

        fn fetch_one(&mut self) -> Result<Option<Vec<Value>>> {
            Ok(self.pending.pop_front())
        }

        fn fetch_all(&mut self) -> Result<Vec<Vec<Value>>> {
            Ok(self.pending.drain(..).collect())
        }

        fn last_insert_id(&self) -> Option<i64> {
            self.last_insert_id
        }

        fn description(&self) -> Option<Vec<String>> {
            self.description.clone()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn session() -> (SqliteConnection, Box<dyn Cursor>) {
            let mut conn = SqliteConnection::open_in_memory().unwrap();
            let mut cursor = conn.cursor().unwrap();
            cursor
                .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, score REAL)")
                .unwrap();
            (conn, cursor)
        }

        #[test]
        fn test_statement_kind() {
            assert_eq!(statement_kind("INSERT INTO t(a) VALUES(1)"), StatementKind::Insert);
            assert_eq!(statement_kind("  replace into t"), StatementKind::Insert);
            assert_eq!(statement_kind("UPDATE t SET a=1"), StatementKind::Write);
            assert_eq!(statement_kind("delete from t"), StatementKind::Write);
            assert_eq!(statement_kind("SELECT * FROM t"), StatementKind::Other);
            assert_eq!(statement_kind(""), StatementKind::Other);
        }

        #[test]
        fn test_insert_then_select() {
            let (_conn, mut cursor) = session();
            assert_eq!(
                cursor
                    .execute("INSERT INTO t(name,score) VALUES('a',1.5)")
                    .unwrap(),
                1
            );
            assert_eq!(cursor.last_insert_id(), Some(1));
            assert_eq!(cursor.description(), None);

            cursor.execute("SELECT id,name,score FROM t").unwrap();
            assert_eq!(
                cursor.description(),
                Some(vec!["id".to_string(), "name".to_string(), "score".to_string()])
            );
            assert_eq!(
                cursor.fetch_one().unwrap(),
                Some(vec![Value::Integer(1), Value::text("a"), Value::Float(1.5)])
            );
            assert_eq!(cursor.fetch_one().unwrap(), None);
        }

        #[test]
        fn test_writes_open_a_transaction() {
            let (mut conn, mut cursor) = session();
            cursor.execute("INSERT INTO t(name) VALUES('a')").unwrap();
            assert!(!conn.handle.lock().as_ref().unwrap().is_autocommit());

            conn.commit().unwrap();
            assert!(conn.handle.lock().as_ref().unwrap().is_autocommit());

            // Committing with nothing pending is a no-op
            conn.commit().unwrap();
        }

        #[test]
        fn test_cursors_share_the_session() {
            let (mut conn, mut cursor) = session();
            cursor.execute("INSERT INTO t(name) VALUES('a')").unwrap();

            let mut other = conn.cursor().unwrap();
            other.execute("SELECT COUNT(*) FROM t").unwrap();
            assert_eq!(other.fetch_all().unwrap(), vec![vec![Value::Integer(1)]]);
        }

        #[test]
        fn test_closed_connection() {
            let (mut conn, mut cursor) = session();
            conn.close().unwrap();
            assert_eq!(cursor.execute("SELECT 1"), Err(Error::ConnectionClosed));
            assert!(matches!(conn.cursor(), Err(Error::ConnectionClosed)));
            assert_eq!(conn.commit(), Err(Error::ConnectionClosed));
            conn.close().unwrap();
        }

        #[test]
        fn test_invalid_utf8_text_is_rejected() {
            let (_conn, mut cursor) = session();
            assert!(matches!(
                cursor.execute("SELECT CAST(x'ff' AS TEXT)"),
                Err(Error::UnsupportedValue(_))
            ));
            assert_eq!(cursor.description(), None);

            cursor.execute("SELECT CAST(x'c3a9' AS TEXT)").unwrap();
            assert_eq!(cursor.fetch_all().unwrap(), vec![vec![Value::text("é")]]);
        }

        #[test]
        fn test_engine_errors_pass_through() {
            let (_conn, mut cursor) = session();
            let err = cursor.execute("SELECT * FROM missing").unwrap_err();
            assert!(err.to_string().contains("no such table"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::cursor::MemoryCursor;
    use crate::core::Value;

    #[test]
    fn test_introspection_sql() {
        let mut cursor = MemoryCursor::new()
            .with_rows(&["name"], vec![vec![Value::text("people")]])
            .with_rows(
                &["cid", "name", "type", "notnull", "dflt_value", "pk"],
                vec![vec![
                    Value::Integer(0),
                    Value::text("id"),
                    Value::text("INTEGER"),
                    Value::Integer(0),
                    Value::Null,
                    Value::Integer(1),
                ]],
            );
        let log = cursor.log();

        assert_eq!(SqliteBackend.list_tables(&mut cursor).unwrap(), vec!["people"]);
        assert_eq!(
            SqliteBackend.columns_of(&mut cursor, "people").unwrap(),
            vec!["id"]
        );
        SqliteBackend.truncate(&mut cursor, "people").unwrap();
        SqliteBackend.set_foreign_key_checks(&mut cursor, false).unwrap();

        assert_eq!(
            log.lock().as_slice(),
            [
                "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
                "PRAGMA table_info(\"people\")",
                "DELETE FROM people",
                "PRAGMA foreign_keys = OFF",
            ]
        );
    }
}
