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

//! Operator, combinator, sort order and dialect definitions
//!

use std::fmt;
use std::str::FromStr;

use super::error::{Error, Result};

/// Leaf comparison operators of the filter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `$eq` (=)
    Eq,

    /// `$gt` (>)
    Gt,

    /// `$gte` (>=)
    Gte,

    /// `$lt` (<)
    Lt,

    /// `$lte` (<=)
    Lte,

    /// `$in` (IN)
    In,

    /// `$contains` (LIKE '%v%')
    Contains,
}

impl Operator {
    /// The document key spelling of this operator
    pub fn as_key(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::In => "$in",
            Operator::Contains => "$contains",
        }
    }

    /// SQL symbol for the scalar comparison operators
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Operator::Eq => Some("="),
            Operator::Gt => Some(">"),
            Operator::Gte => Some(">="),
            Operator::Lt => Some("<"),
            Operator::Lte => Some("<="),
            Operator::In | Operator::Contains => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "$eq" => Ok(Operator::Eq),
            "$gt" => Ok(Operator::Gt),
            "$gte" => Ok(Operator::Gte),
            "$lt" => Ok(Operator::Lt),
            "$lte" => Ok(Operator::Lte),
            "$in" => Ok(Operator::In),
            "$contains" => Ok(Operator::Contains),
            _ => Err(Error::query_syntax(format!("unsupported operator: {}", s))),
        }
    }
}

/// Structural combinators of the filter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
    Not,
}

impl Combinator {
    /// Recognize a combinator key; any other key is a field name
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "$and" => Some(Combinator::And),
            "$or" => Some(Combinator::Or),
            "$not" => Some(Combinator::Not),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Combinator::And => "$and",
            Combinator::Or => "$or",
            Combinator::Not => "$not",
        }
    }
}

/// Sort direction of an ORDER BY entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// pymongo-style constant for ascending order
pub const ASCENDING: i32 = 1;

/// pymongo-style constant for descending order
pub const DESCENDING: i32 = -1;

impl SortOrder {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

impl TryFrom<i32> for SortOrder {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            ASCENDING => Ok(SortOrder::Ascending),
            DESCENDING => Ok(SortOrder::Descending),
            _ => Err(Error::query_syntax(format!(
                "unrecognized sort direction: {}",
                value
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Column names that must be quoted before emission
pub const RESERVED_WORDS: &[&str] = &["index", "key", "order", "group"];

/// SQL dialect of the target backend
///
/// Only the parts of the text that actually differ between backends live
/// here: identifier quoting and the LIMIT/OFFSET token order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// `LIMIT skip,limit`, backtick identifiers
    #[default]
    MySql,

    /// `LIMIT skip,limit`, double-quoted identifiers
    Sqlite,

    /// `LIMIT limit OFFSET skip`, double-quoted identifiers
    Postgres,
}

impl Dialect {
    /// Quote an identifier unconditionally
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Sqlite | Dialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Quote an identifier only if it is a reserved word
    pub fn column(&self, name: &str) -> String {
        if is_reserved_word(name) {
            self.quote_identifier(name)
        } else {
            name.to_string()
        }
    }

    /// Render the pagination clause (without leading space)
    pub fn limit_clause(&self, skip: u64, limit: u64) -> String {
        match self {
            Dialect::MySql | Dialect::Sqlite => format!("LIMIT {},{}", skip, limit),
            Dialect::Postgres => {
                if skip == 0 {
                    format!("LIMIT {}", limit)
                } else {
                    format!("LIMIT {} OFFSET {}", limit, skip)
                }
            }
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            _ => Err(Error::config(format!("unknown dialect: {}", s))),
        }
    }
}

/// Case-insensitive reserved word check
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.iter().any(|w| w.eq_ignore_ascii_case(name))
}
