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

//! Lazy result set
//!
//! A [`QuerySet`] holds a query descriptor and a cursor handle. Nothing
//! runs until a read needs rows; the rows are then fetched once and cached
//! until [`QuerySet::invalidate`] is called. Writes issued elsewhere never
//! invalidate the cache.
//!
//! `filter`, `limit` and `distinct` return a fresh, unfetched set bound to
//! a new descriptor. The receiver and its cache are left as they were.

use std::sync::Arc;

use tracing::trace;

use crate::core::{Dialect, Document, Error, Result, SortOrder};
use crate::query::{build_select, Query};

use super::cursor::{execute_logged, SharedCursor};
use super::row::DataRow;

/// Cache freshness of a [`QuerySet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Never executed
    Unfetched,
    /// Rows cached and not invalidated
    Fresh,
    /// Rows cached but explicitly invalidated; the next read refetches
    Stale,
}

/// Deferred, cached SELECT
pub struct QuerySet {
    cursor: SharedCursor,
    query: Query,
    dialect: Dialect,
    rows: Vec<DataRow>,
    state: FetchState,
}

impl QuerySet {
    /// Bind a descriptor to a cursor. Executes nothing.
    pub fn new(cursor: SharedCursor, query: Query, dialect: Dialect) -> Self {
        Self {
            cursor,
            query,
            dialect,
            rows: Vec::new(),
            state: FetchState::Unfetched,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// SELECT text this set runs when materialized
    pub fn sql(&self) -> Result<String> {
        build_select(&self.query, self.dialect)
    }

    // =========================================================================
    // Reads (materialize on demand)
    // =========================================================================

    /// Number of rows
    pub fn len(&mut self) -> Result<usize> {
        Ok(self.rows()?.len())
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.rows()?.is_empty())
    }

    /// Row at `index`, `None` past the end
    pub fn get(&mut self, index: usize) -> Result<Option<&DataRow>> {
        Ok(self.rows()?.get(index))
    }

    pub fn first(&mut self) -> Result<Option<&DataRow>> {
        self.get(0)
    }

    pub fn iter(&mut self) -> Result<std::slice::Iter<'_, DataRow>> {
        Ok(self.rows()?.iter())
    }

    /// All rows, fetching them first if needed
    pub fn rows(&mut self) -> Result<&[DataRow]> {
        if self.state != FetchState::Fresh {
            self.fetch()?;
        }
        Ok(&self.rows)
    }

    /// Take ownership of the rows
    pub fn into_rows(mut self) -> Result<Vec<DataRow>> {
        if self.state != FetchState::Fresh {
            self.fetch()?;
        }
        Ok(self.rows)
    }

    /// Every row as an ordered column to value document
    pub fn values(&mut self) -> Result<Vec<Document>> {
        Ok(self.rows()?.iter().map(DataRow::to_document).collect())
    }

    /// Number of rows; same as [`QuerySet::len`]
    pub fn count(&mut self) -> Result<usize> {
        self.len()
    }

    /// `count() > 0`
    pub fn exists(&mut self) -> Result<bool> {
        Ok(self.count()? > 0)
    }

    /// Mark cached rows stale so the next read refetches
    pub fn invalidate(&mut self) {
        if self.state == FetchState::Fresh {
            trace!("query set marked stale");
            self.state = FetchState::Stale;
        }
    }

    // =========================================================================
    // Transforms (copy-on-write)
    // =========================================================================

    /// New set whose filter is the current one ANDed with `extra`
    pub fn filter(&self, extra: Document) -> QuerySet {
        self.derive(self.query.with_filter_anded(extra))
    }

    /// New set with a limit and skip; a set may be limited once
    pub fn limit(&self, limit: u64, skip: u64) -> Result<QuerySet> {
        Ok(self.derive(self.query.with_limit(limit, skip)?))
    }

    /// New set selecting distinct rows
    pub fn distinct(&self) -> QuerySet {
        self.derive(self.query.with_distinct())
    }

    /// Sorting a result set is not supported; pass `sort` to the find call
    pub fn sort(&self, _sort: &[(&str, SortOrder)]) -> Result<QuerySet> {
        Err(Error::NotSupported(
            "sorting a query set; give the sort when issuing the query".to_string(),
        ))
    }

    fn derive(&self, query: Query) -> QuerySet {
        QuerySet::new(Arc::clone(&self.cursor), query, self.dialect)
    }

    fn fetch(&mut self) -> Result<()> {
        trace!(state = ?self.state, "materializing query set");
        let sql = self.sql()?;

        let (description, raw_rows) = {
            let mut cursor = self.cursor.lock();
            execute_logged(&mut **cursor, &sql)?;
            let description = cursor.description();
            (description, cursor.fetch_all()?)
        };

        // Rows are zipped with the requested fields; `*` falls back to
        // whatever the cursor reports.
        let fields = self.query.get_fields();
        let columns = if fields.is_empty() {
            description.unwrap_or_default()
        } else {
            fields.to_vec()
        };
        let columns = Arc::new(columns);

        let rows = raw_rows
            .into_iter()
            .map(|values| DataRow::new(Arc::clone(&columns), values))
            .collect::<Result<Vec<_>>>()?;

        trace!(rows = rows.len(), "query set fresh");
        self.rows = rows;
        self.state = FetchState::Fresh;
        Ok(())
    }
}

impl std::fmt::Debug for QuerySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySet")
            .field("query", &self.query)
            .field("dialect", &self.dialect)
            .field("state", &self.state)
            .field("rows", &self.rows.len())
            .finish()
    }
}
