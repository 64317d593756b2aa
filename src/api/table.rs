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

//! Table handle
//!
//! Filters, attribute documents and sort specs go in; SQL text is built
//! by [`crate::query`] and run on the database's shared cursor.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::{Document, Error, Result, SortOrder};
use crate::query::{build_count, build_delete, build_insert, build_update, CountSpec, Query, Source};

use super::cursor::execute_logged;
use super::database::Session;
use super::queryset::QuerySet;
use super::row::DataRow;

/// Options for [`Table::find`]
///
/// ```
/// use monsql::{Document, FindOptions, SortOrder};
///
/// let options = FindOptions::new()
///     .filter(Document::singleton("age", Document::singleton("$gt", 20)))
///     .fields(["id", "name"])
///     .sort([("age", SortOrder::Ascending)])
///     .limit(10);
/// assert_eq!(options.limit, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub filter: Option<Document>,
    /// Selected columns; empty selects every column of the table
    pub fields: Vec<String>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub sort: Vec<(String, SortOrder)>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Document) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Rows to skip; only applied together with a limit
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort<I, S>(mut self, sort: I) -> Self
    where
        I: IntoIterator<Item = (S, SortOrder)>,
        S: Into<String>,
    {
        self.sort = sort.into_iter().map(|(c, o)| (c.into(), o)).collect();
        self
    }
}

impl From<Document> for FindOptions {
    fn from(filter: Document) -> Self {
        FindOptions::new().filter(filter)
    }
}

/// Handle on one table of a [`Database`](super::Database)
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

struct TableInner {
    name: String,
    session: Arc<Session>,
    columns: Mutex<Option<Arc<Vec<String>>>>,
}

impl Table {
    pub(crate) fn new(name: &str, session: Arc<Session>) -> Self {
        Table {
            inner: Arc::new(TableInner {
                name: name.to_string(),
                session,
                columns: Mutex::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Column names, introspected once and cached
    pub fn columns(&self) -> Result<Arc<Vec<String>>> {
        if let Some(columns) = self.inner.columns.lock().as_ref() {
            return Ok(Arc::clone(columns));
        }

        let session = &self.inner.session;
        let columns = Arc::new(
            session
                .backend
                .columns_of(&mut **session.cursor.lock(), &self.inner.name)?,
        );
        trace!(table = %self.inner.name, columns = columns.len(), "columns introspected");
        *self.inner.columns.lock() = Some(Arc::clone(&columns));
        Ok(columns)
    }

    /// Lazy SELECT over this table
    ///
    /// Nothing runs until the returned set is read, except column
    /// introspection when no fields are given.
    pub fn find(&self, options: FindOptions) -> Result<QuerySet> {
        let FindOptions {
            filter,
            fields,
            skip,
            limit,
            sort,
        } = options;

        let fields = if fields.is_empty() {
            self.columns()?.as_ref().clone()
        } else {
            fields
        };

        let mut query = Query::table(self.name()).fields(fields).sort(sort).skip(skip);
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        if let Some(limit) = limit {
            query = query.with_limit(limit, skip)?;
        }

        let session = &self.inner.session;
        Ok(QuerySet::new(
            Arc::clone(&session.cursor),
            query,
            session.dialect(),
        ))
    }

    /// First matching row, if any; any limit in `options` is replaced by 1
    pub fn find_one(&self, options: FindOptions) -> Result<Option<DataRow>> {
        let rows = self.find(options.limit(1))?.into_rows()?;
        Ok(rows.into_iter().next())
    }

    /// Number of matching rows
    ///
    /// With `distinct` and no `distinct_fields`, distinct rows are counted
    /// over every column of the table. Without `distinct`, `distinct_fields`
    /// may name at most one column (non-null values of it are counted);
    /// more than one is a query syntax error.
    pub fn count(
        &self,
        filter: Option<&Document>,
        distinct: bool,
        distinct_fields: Option<&[&str]>,
    ) -> Result<i64> {
        let spec = match (distinct, distinct_fields) {
            (_, Some(fields)) => CountSpec {
                distinct,
                fields: fields.iter().map(|f| f.to_string()).collect(),
            },
            (true, None) => CountSpec::distinct(self.columns()?.iter().cloned()),
            (false, None) => CountSpec::all(),
        };

        let session = &self.inner.session;
        let sql = build_count(&self.source(), filter, &spec, session.dialect())?;
        let mut cursor = session.cursor.lock();
        execute_logged(&mut **cursor, &sql)?;
        let row = cursor
            .fetch_one()?
            .ok_or_else(|| Error::database("COUNT returned no row"))?;
        row.first()
            .and_then(|v| v.as_int64())
            .ok_or_else(|| Error::type_conversion("COUNT result", "Integer"))
    }

    /// Insert one row
    ///
    /// Returns the generated row id when a row was written.
    pub fn insert(&self, attributes: &Document) -> Result<Option<i64>> {
        let session = &self.inner.session;
        let sql = build_insert(&self.inner.name, attributes, session.dialect())?;
        let id = {
            let mut cursor = session.cursor.lock();
            let written = execute_logged(&mut **cursor, &sql)?;
            if written > 0 {
                cursor.last_insert_id()
            } else {
                None
            }
        };
        session.after_write()?;
        Ok(id)
    }

    /// Insert several rows, in order; stops at the first failure
    pub fn insert_many(&self, rows: &[Document]) -> Result<Vec<Option<i64>>> {
        rows.iter().map(|row| self.insert(row)).collect()
    }

    /// Update matching rows, returning how many changed
    ///
    /// With `upsert`, a filter that matches nothing inserts `attributes`
    /// instead and reports 1 if a row id came back, else 0.
    pub fn update(
        &self,
        filter: Option<&Document>,
        attributes: &Document,
        upsert: bool,
    ) -> Result<usize> {
        if upsert {
            let lookup = FindOptions {
                filter: filter.cloned(),
                ..FindOptions::default()
            };
            if self.find_one(lookup)?.is_none() {
                let id = self.insert(attributes)?;
                return Ok(usize::from(id.is_some_and(|id| id > 0)));
            }
        }

        let session = &self.inner.session;
        let sql = build_update(&self.source(), filter, attributes, session.dialect())?;
        let changed = session.execute(&sql)?;
        session.after_write()?;
        Ok(changed)
    }

    /// Delete matching rows, returning how many went
    pub fn remove(&self, filter: Option<&Document>) -> Result<usize> {
        let session = &self.inner.session;
        let sql = build_delete(&self.source(), filter, session.dialect())?;
        let removed = session.execute(&sql)?;
        session.after_write()?;
        Ok(removed)
    }

    /// Commit the database this table belongs to
    pub fn commit(&self) -> Result<&Self> {
        self.inner.session.commit()?;
        Ok(self)
    }

    /// Check whether two handles share the same cache entry
    pub fn same_handle(&self, other: &Table) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn source(&self) -> Source {
        Source::Table(self.inner.name.clone())
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.inner.name)
            .field("columns", &*self.inner.columns.lock())
            .finish()
    }
}
