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

//! Query descriptors
//!
//! A [`Query`] is a value: every transform returns a new descriptor and
//! leaves the receiver untouched, so descriptors can be shared and forked
//! freely.

use crate::core::{Document, Error, Node, Result, SortOrder};

/// Where a SELECT reads from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A plain table name
    Table(String),

    /// A nested query; it must carry an alias when rendered
    SubQuery(Box<Query>),
}

impl Source {
    /// Table name, if this is a table source
    pub fn table_name(&self) -> Option<&str> {
        match self {
            Source::Table(name) => Some(name),
            Source::SubQuery(_) => None,
        }
    }
}

impl From<&str> for Source {
    fn from(name: &str) -> Self {
        Source::Table(name.to_string())
    }
}

impl From<String> for Source {
    fn from(name: String) -> Self {
        Source::Table(name)
    }
}

/// Description of one SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: Source,
    filter: Option<Document>,
    fields: Vec<String>,
    sort: Vec<(String, SortOrder)>,
    skip: u64,
    limit: Option<u64>,
    distinct: bool,
    alias: Option<String>,
}

impl Query {
    /// Create a query reading every column of a table
    pub fn table(name: impl Into<String>) -> Self {
        Self::new(Source::Table(name.into()))
    }

    /// Create a query reading from another query
    pub fn subquery(inner: Query) -> Self {
        Self::new(Source::SubQuery(Box::new(inner)))
    }

    /// Create a query over any source
    pub fn new(source: Source) -> Self {
        Self {
            source,
            filter: None,
            fields: Vec::new(),
            sort: Vec::new(),
            skip: 0,
            limit: None,
            distinct: false,
            alias: None,
        }
    }

    // =========================================================================
    // Builder setters (construction time)
    // =========================================================================

    /// Set the selected columns, in order
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the raw filter
    pub fn filter(mut self, filter: Document) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the ORDER BY entries, in order
    pub fn sort<I, S>(mut self, sort: I) -> Self
    where
        I: IntoIterator<Item = (S, SortOrder)>,
        S: Into<String>,
    {
        self.sort = sort.into_iter().map(|(c, o)| (c.into(), o)).collect();
        self
    }

    /// Set the number of rows to skip. Only rendered when a limit is set.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Set the DISTINCT flag
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Name this query for use as a subquery source
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    // =========================================================================
    // Transforms (copy-on-write)
    // =========================================================================

    /// New descriptor whose filter is `{$and: [extra, old]}`
    ///
    /// The old filter is kept as the second branch; an absent old filter
    /// becomes an empty (vacuous) branch that the compiler drops.
    pub fn with_filter_anded(&self, extra: Document) -> Query {
        let old = self.filter.clone().unwrap_or_default();
        let combined = Document::singleton(
            "$and",
            Node::Array(vec![Node::Document(extra), Node::Document(old)]),
        );
        Query {
            filter: Some(combined),
            ..self.clone()
        }
    }

    /// New descriptor with a limit and skip
    ///
    /// A descriptor takes a limit at most once; asking again is an error
    /// rather than an overwrite.
    pub fn with_limit(&self, limit: u64, skip: u64) -> Result<Query> {
        if self.limit.is_some() {
            return Err(Error::query_syntax("limit already defined"));
        }
        if limit == 0 {
            return Err(Error::query_syntax("limit must be a positive integer"));
        }
        Ok(Query {
            limit: Some(limit),
            skip,
            ..self.clone()
        })
    }

    /// New descriptor with DISTINCT set
    pub fn with_distinct(&self) -> Query {
        Query {
            distinct: true,
            ..self.clone()
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn get_source(&self) -> &Source {
        &self.source
    }

    pub fn get_filter(&self) -> Option<&Document> {
        self.filter.as_ref()
    }

    pub fn get_fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get_sort(&self) -> &[(String, SortOrder)] {
        &self.sort
    }

    pub fn get_skip(&self) -> u64 {
        self.skip
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn get_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}
