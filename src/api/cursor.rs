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

//! Cursor and connection collaborators
//!
//! monsql never talks to a database driver directly. Statement text goes
//! through a [`Cursor`], and transaction boundaries through a
//! [`Connection`]. Any driver can be plugged in by implementing the two
//! traits.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::{Error, Result, Value};

/// Statement executor bound to one connection
///
/// A cursor is single-writer: callers must hold exclusive access for the
/// whole execute/fetch sequence of one statement.
pub trait Cursor: Send {
    /// Run one statement
    ///
    /// Returns the number of rows changed by a write, 0 for statements that
    /// produce a result set.
    fn execute(&mut self, sql: &str) -> Result<usize>;

    /// Next row of the pending result set, if any
    fn fetch_one(&mut self) -> Result<Option<Vec<Value>>>;

    /// All remaining rows of the pending result set
    fn fetch_all(&mut self) -> Result<Vec<Vec<Value>>>;

    /// Row id generated by the most recent INSERT
    fn last_insert_id(&self) -> Option<i64>;

    /// Column names of the last result set, `None` for non-queries
    fn description(&self) -> Option<Vec<String>>;
}

/// Transaction boundary of a database session
pub trait Connection: Send {
    /// Open a new cursor on this connection
    fn cursor(&mut self) -> Result<Box<dyn Cursor>>;

    /// Make pending changes permanent
    fn commit(&mut self) -> Result<()>;

    /// Release the session; later calls fail with [`Error::ConnectionClosed`]
    fn close(&mut self) -> Result<()>;
}

/// Cursor handle shared by a database and everything issued from it
pub type SharedCursor = Arc<Mutex<Box<dyn Cursor>>>;

/// Wrap a cursor for sharing
pub fn shared(cursor: Box<dyn Cursor>) -> SharedCursor {
    Arc::new(Mutex::new(cursor))
}

/// Execute a statement, logging its text
pub(crate) fn execute_logged(cursor: &mut dyn Cursor, sql: &str) -> Result<usize> {
    debug!(sql = %sql, "executing statement");
    cursor.execute(sql)
}

// ============================================================================
// MemoryCursor
// ============================================================================

/// Scripted response for [`MemoryCursor`]
#[derive(Debug, Clone)]
enum Response {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    Affected {
        count: usize,
        last_insert_id: Option<i64>,
    },
    Fail(Error),
}

/// In-memory cursor that replays scripted responses
///
/// Each `execute` consumes the next queued response, in order; with the
/// queue empty it behaves like a write that touched no rows. Every executed
/// statement is recorded, which is useful for testing.
///
/// ```
/// use monsql::api::{Cursor, MemoryCursor};
/// use monsql::Value;
///
/// let mut cursor = MemoryCursor::new()
///     .with_rows(&["n"], vec![vec![Value::Integer(1)]]);
/// let log = cursor.log();
///
/// cursor.execute("SELECT n FROM t").unwrap();
/// assert_eq!(cursor.fetch_all().unwrap(), vec![vec![Value::Integer(1)]]);
/// assert_eq!(log.lock().as_slice(), ["SELECT n FROM t"]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryCursor {
    responses: VecDeque<Response>,
    pending: VecDeque<Vec<Value>>,
    description: Option<Vec<String>>,
    last_insert_id: Option<i64>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl MemoryCursor {
    /// Create a cursor with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result set
    pub fn with_rows(mut self, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        self.responses.push_back(Response::Rows {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        });
        self
    }

    /// Queue a write result
    pub fn with_affected(mut self, count: usize, last_insert_id: Option<i64>) -> Self {
        self.responses.push_back(Response::Affected {
            count,
            last_insert_id,
        });
        self
    }

    /// Queue a failure
    pub fn with_error(mut self, error: Error) -> Self {
        self.responses.push_back(Response::Fail(error));
        self
    }

    /// Handle on the statements executed so far
    ///
    /// The handle stays valid after the cursor is boxed and shared.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }
}

impl Cursor for MemoryCursor {
    fn execute(&mut self, sql: &str) -> Result<usize> {
        self.executed.lock().push(sql.to_string());
        self.pending.clear();
        self.description = None;

        match self.responses.pop_front() {
            Some(Response::Rows { columns, rows }) => {
                self.description = Some(columns);
                self.pending = rows.into();
                Ok(0)
            }
            Some(Response::Affected {
                count,
                last_insert_id,
            }) => {
                if last_insert_id.is_some() {
                    self.last_insert_id = last_insert_id;
                }
                Ok(count)
            }
            Some(Response::Fail(err)) => Err(err),
            None => Ok(0),
        }
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
