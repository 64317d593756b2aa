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

//! Statement builder - renders complete SELECT/INSERT/UPDATE/DELETE text
//!
//! Every function here is pure: same descriptor and dialect in, same text
//! out. Shapes produced:
//!
//! ```text
//! SELECT [DISTINCT] <fields> FROM <source> [WHERE ..] [ORDER BY ..] [LIMIT ..]
//! SELECT COUNT(<expr>) FROM <source> [WHERE ..]
//! INSERT INTO <table>(<cols>) VALUES(<values>)
//! UPDATE <table> SET <col>=<value>, .. [WHERE ..]
//! DELETE FROM <table> [WHERE ..]
//! ```

use tracing::warn;

use crate::core::{Dialect, Document, Error, Result, Value};

use super::compiler::compile_with;
use super::descriptor::{Query, Source};
use super::encoder::encode;

/// What a COUNT statement counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountSpec {
    /// Wrap the counted expression in DISTINCT(..)
    pub distinct: bool,
    /// Columns inside COUNT(..); empty means `*`
    pub fields: Vec<String>,
}

impl CountSpec {
    /// `COUNT(*)`
    pub fn all() -> Self {
        Self::default()
    }

    /// `COUNT(DISTINCT(<fields>))`
    pub fn distinct<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            distinct: true,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Render a SELECT statement
pub fn build_select(query: &Query, dialect: Dialect) -> Result<String> {
    let mut sql = String::from("SELECT ");
    if query.is_distinct() {
        sql.push_str("DISTINCT ");
    }
    sql.push_str(&field_list(query.get_fields(), dialect));
    sql.push_str(" FROM ");
    sql.push_str(&render_source(query.get_source(), dialect)?);
    push_where(&mut sql, query.get_filter(), dialect)?;

    if !query.get_sort().is_empty() {
        let entries: Vec<String> = query
            .get_sort()
            .iter()
            .map(|(col, order)| format!("{} {}", dialect.column(col), order.as_sql()))
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&entries.join(","));
    }

    match query.get_limit() {
        Some(limit) => {
            sql.push(' ');
            sql.push_str(&dialect.limit_clause(query.get_skip(), limit));
        }
        None if query.get_skip() > 0 => {
            warn!(
                skip = query.get_skip(),
                "skip without limit is ignored; set a limit to paginate"
            );
        }
        None => {}
    }

    Ok(sql)
}

/// Render a COUNT statement
pub fn build_count(
    source: &Source,
    filter: Option<&Document>,
    spec: &CountSpec,
    dialect: Dialect,
) -> Result<String> {
    if !spec.distinct && spec.fields.len() > 1 {
        return Err(Error::query_syntax(
            "counting more than one column requires distinct",
        ));
    }
    let mut counted = if spec.fields.is_empty() {
        "*".to_string()
    } else {
        field_list(&spec.fields, dialect)
    };
    if spec.distinct {
        counted = format!("DISTINCT({})", counted);
    }

    let mut sql = format!(
        "SELECT COUNT({}) FROM {}",
        counted,
        render_source(source, dialect)?
    );
    push_where(&mut sql, filter, dialect)?;
    Ok(sql)
}

/// Render an INSERT statement; columns follow attribute order
pub fn build_insert(table: &str, attributes: &Document, dialect: Dialect) -> Result<String> {
    let pairs = scalar_attributes(attributes)?;
    let columns: Vec<String> = pairs.iter().map(|(c, _)| dialect.column(c)).collect();
    let values = pairs
        .iter()
        .map(|(_, v)| encode(v, dialect))
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "INSERT INTO {}({}) VALUES({})",
        dialect.column(table),
        columns.join(","),
        values.join(",")
    ))
}

/// Render an UPDATE statement
pub fn build_update(
    source: &Source,
    filter: Option<&Document>,
    attributes: &Document,
    dialect: Dialect,
) -> Result<String> {
    let table = writable_table(source, "cannot update a subquery")?;
    let assignments = scalar_attributes(attributes)?
        .into_iter()
        .map(|(c, v)| -> Result<String> {
            Ok(format!("{}={}", dialect.column(c), encode(v, dialect)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut sql = format!(
        "UPDATE {} SET {}",
        dialect.column(table),
        assignments.join(", ")
    );
    push_where(&mut sql, filter, dialect)?;
    Ok(sql)
}

/// Render a DELETE statement
pub fn build_delete(source: &Source, filter: Option<&Document>, dialect: Dialect) -> Result<String> {
    let table = writable_table(source, "cannot remove from subquery")?;
    let mut sql = format!("DELETE FROM {}", dialect.column(table));
    push_where(&mut sql, filter, dialect)?;
    Ok(sql)
}

fn render_source(source: &Source, dialect: Dialect) -> Result<String> {
    match source {
        Source::Table(name) => Ok(dialect.column(name)),
        Source::SubQuery(inner) => {
            let alias = inner
                .get_alias()
                .filter(|a| !a.is_empty())
                .ok_or_else(|| Error::source_error("subquery requires an alias"))?;
            Ok(format!("({}) AS {}", build_select(inner, dialect)?, alias))
        }
    }
}

fn writable_table<'a>(source: &'a Source, message: &str) -> Result<&'a str> {
    source
        .table_name()
        .ok_or_else(|| Error::source_error(message))
}

fn field_list(fields: &[String], dialect: Dialect) -> String {
    if fields.is_empty() {
        return "*".to_string();
    }
    fields
        .iter()
        .map(|f| dialect.column(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn push_where(sql: &mut String, filter: Option<&Document>, dialect: Dialect) -> Result<()> {
    if let Some(condition) = compile_with(filter, dialect)? {
        sql.push_str(" WHERE ");
        sql.push_str(&condition);
    }
    Ok(())
}

/// Attribute entries as (column, scalar) pairs, in document order
fn scalar_attributes(attributes: &Document) -> Result<Vec<(&str, &Value)>> {
    if attributes.is_empty() {
        return Err(Error::query_syntax("no attributes given"));
    }
    attributes
        .iter()
        .map(|(col, node)| {
            node.as_value().map(|v| (col, v)).ok_or_else(|| {
                Error::unsupported_value(format!(
                    "attribute {} must be a scalar, got {}",
                    col,
                    node.kind()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SortOrder;
    use serde_json::json;

    fn doc(json: serde_json::Value) -> Document {
        Document::try_from(json).unwrap()
    }

    #[test]
    fn test_select_without_filter_has_no_where() {
        let q = Query::table("t").fields(["name", "number"]);
        assert_eq!(
            build_select(&q, Dialect::MySql).unwrap(),
            "SELECT name,number FROM t"
        );

        let q = q.filter(Document::new());
        assert!(!build_select(&q, Dialect::MySql).unwrap().contains("WHERE"));
    }

    #[test]
    fn test_select_full_shape() {
        let q = Query::table("t")
            .fields(["a", "b"])
            .filter(doc(json!({"a": {"$gte": 1}})))
            .sort([("a", SortOrder::Descending), ("b", SortOrder::Ascending)])
            .with_limit(5, 10)
            .unwrap()
            .with_distinct();

        assert_eq!(
            build_select(&q, Dialect::MySql).unwrap(),
            "SELECT DISTINCT a,b FROM t WHERE a >= 1 ORDER BY a DESC,b ASC LIMIT 10,5"
        );
        assert_eq!(
            build_select(&q, Dialect::Postgres).unwrap(),
            "SELECT DISTINCT a,b FROM t WHERE a >= 1 ORDER BY a DESC,b ASC LIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn test_select_star_and_reserved_fields() {
        assert_eq!(
            build_select(&Query::table("t"), Dialect::MySql).unwrap(),
            "SELECT * FROM t"
        );
        let q = Query::table("t").fields(["id", "index"]);
        assert_eq!(
            build_select(&q, Dialect::MySql).unwrap(),
            "SELECT id,`index` FROM t"
        );
    }

    #[test]
    fn test_skip_without_limit_is_not_rendered() {
        let q = Query::table("t").fields(["a"]).skip(5);
        assert_eq!(build_select(&q, Dialect::MySql).unwrap(), "SELECT a FROM t");
    }

    #[test]
    fn test_subquery_source() {
        let inner = Query::table("t")
            .fields(["a"])
            .filter(doc(json!({"a": 1})))
            .alias("sub");
        let outer = Query::subquery(inner).fields(["a"]);
        assert_eq!(
            build_select(&outer, Dialect::MySql).unwrap(),
            "SELECT a FROM (SELECT a FROM t WHERE a = 1) AS sub"
        );
    }

    #[test]
    fn test_subquery_requires_alias() {
        let outer = Query::subquery(Query::table("t"));
        let err = build_select(&outer, Dialect::MySql).unwrap_err();
        assert!(err.is_source_error());

        let outer = Query::subquery(Query::table("t").alias(""));
        assert!(build_select(&outer, Dialect::MySql)
            .unwrap_err()
            .is_source_error());
    }

    #[test]
    fn test_insert_preserves_attribute_order() {
        let attrs = doc(json!({"b": 1, "a": 2}));
        assert_eq!(
            build_insert("t", &attrs, Dialect::MySql).unwrap(),
            "INSERT INTO t(b,a) VALUES(1,2)"
        );
    }

    #[test]
    fn test_insert_encodes_values() {
        let attrs = Document::new()
            .with("name", "o'neil")
            .with("score", 4.5)
            .with("note", Value::Null);
        assert_eq!(
            build_insert("people", &attrs, Dialect::Sqlite).unwrap(),
            "INSERT INTO people(name,score,note) VALUES('o''neil',4.5,null)"
        );
    }

    #[test]
    fn test_write_literals_follow_dialect_escaping() {
        let attrs = Document::new().with("path", "C:\\");
        assert_eq!(
            build_insert("t", &attrs, Dialect::MySql).unwrap(),
            "INSERT INTO t(path) VALUES('C:\\\\')"
        );
        assert_eq!(
            build_insert("t", &attrs, Dialect::Sqlite).unwrap(),
            "INSERT INTO t(path) VALUES('C:\\')"
        );
        assert_eq!(
            build_update(&Source::from("t"), None, &attrs, Dialect::MySql).unwrap(),
            "UPDATE t SET path='C:\\\\'"
        );
    }

    #[test]
    fn test_insert_rejects_bad_attributes() {
        assert!(build_insert("t", &Document::new(), Dialect::MySql)
            .unwrap_err()
            .is_query_syntax());
        assert!(matches!(
            build_insert("t", &doc(json!({"a": [1]})), Dialect::MySql),
            Err(Error::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_update() {
        let source = Source::from("t");
        let attrs = doc(json!({"number": -100, "name": "x"}));
        assert_eq!(
            build_update(&source, Some(&doc(json!({"number": 0}))), &attrs, Dialect::MySql)
                .unwrap(),
            "UPDATE t SET number=-100, name='x' WHERE number = 0"
        );
        assert_eq!(
            build_update(&source, None, &attrs, Dialect::MySql).unwrap(),
            "UPDATE t SET number=-100, name='x'"
        );
    }

    #[test]
    fn test_delete() {
        let source = Source::from("t");
        assert_eq!(
            build_delete(&source, None, Dialect::MySql).unwrap(),
            "DELETE FROM t"
        );
        assert_eq!(
            build_delete(&source, Some(&doc(json!({"n": {"$lt": 3}}))), Dialect::MySql).unwrap(),
            "DELETE FROM t WHERE n < 3"
        );
    }

    #[test]
    fn test_writes_against_subquery_are_rejected() {
        let source = Source::SubQuery(Box::new(Query::table("t").alias("s")));
        let err = build_delete(&source, None, Dialect::MySql).unwrap_err();
        assert_eq!(err, Error::source_error("cannot remove from subquery"));

        let attrs = doc(json!({"a": 1}));
        assert!(build_update(&source, None, &attrs, Dialect::MySql)
            .unwrap_err()
            .is_source_error());
    }

    #[test]
    fn test_count() {
        let source = Source::from("t");
        assert_eq!(
            build_count(&source, None, &CountSpec::all(), Dialect::MySql).unwrap(),
            "SELECT COUNT(*) FROM t"
        );
        assert_eq!(
            build_count(
                &source,
                Some(&doc(json!({"a": 1}))),
                &CountSpec::distinct(["a", "b"]),
                Dialect::MySql
            )
            .unwrap(),
            "SELECT COUNT(DISTINCT(a,b)) FROM t WHERE a = 1"
        );
    }

    #[test]
    fn test_count_plain_columns() {
        let source = Source::from("t");
        let single = CountSpec {
            distinct: false,
            fields: vec!["a".to_string()],
        };
        assert_eq!(
            build_count(&source, None, &single, Dialect::MySql).unwrap(),
            "SELECT COUNT(a) FROM t"
        );

        let several = CountSpec {
            distinct: false,
            fields: vec!["a".to_string(), "b".to_string()],
        };
        assert!(build_count(&source, None, &several, Dialect::MySql)
            .unwrap_err()
            .is_query_syntax());
    }

    #[test]
    fn test_filter_errors_propagate() {
        let q = Query::table("t").filter(doc(json!({"a": {"$nope": 1}})));
        assert!(build_select(&q, Dialect::MySql)
            .unwrap_err()
            .is_query_syntax());
        assert!(build_delete(&Source::from("t"), q.get_filter(), Dialect::MySql).is_err());
    }
}
