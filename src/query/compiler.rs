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

//! Filter compiler - renders a normalized filter as a WHERE condition
//!
//! ```
//! use monsql::query::compile;
//! use monsql::Document;
//! use serde_json::json;
//!
//! let filter = Document::try_from(json!({"age": {"$gte": 18}, "name": "Alice"})).unwrap();
//! assert_eq!(
//!     compile(Some(&filter)).unwrap().as_deref(),
//!     Some("(age >= 18) AND (name = 'Alice')")
//! );
//! assert_eq!(compile(None).unwrap(), None);
//! ```

use crate::core::{Dialect, Document, Error, Operator, Result, Value};

use super::encoder::encode;
use super::filter::{normalize, FilterExpression, Operand};

/// Compile a raw filter with the default dialect
///
/// `None` means the statement gets no WHERE clause.
pub fn compile(filter: Option<&Document>) -> Result<Option<String>> {
    compile_with(filter, Dialect::default())
}

/// Compile a raw filter for a specific dialect
pub fn compile_with(filter: Option<&Document>, dialect: Dialect) -> Result<Option<String>> {
    let expr = match filter {
        Some(doc) => normalize(doc)?,
        None => None,
    };
    expr.map(|e| render(&e, dialect)).transpose()
}

/// Render a normalized filter tree
pub fn render(expr: &FilterExpression, dialect: Dialect) -> Result<String> {
    match expr {
        FilterExpression::Compare { field, op, operand } => {
            render_compare(&dialect.column(field), *op, operand, dialect)
        }
        FilterExpression::And(children) => render_group(children, " AND ", dialect),
        FilterExpression::Or(children) => render_group(children, " OR ", dialect),
        FilterExpression::Not(inner) => Ok(format!("NOT ({})", render(inner, dialect)?)),
    }
}

fn render_group(children: &[FilterExpression], sep: &str, dialect: Dialect) -> Result<String> {
    let parts = children
        .iter()
        .map(|c| render(c, dialect).map(|sql| format!("({})", sql)))
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(sep))
}

fn render_compare(
    field: &str,
    op: Operator,
    operand: &Operand,
    dialect: Dialect,
) -> Result<String> {
    match (op, operand) {
        (Operator::In, Operand::List(values)) => {
            if values.is_empty() {
                // Nothing equals null, so this matches no row
                return Ok(format!("{} IN (null)", field));
            }
            let members = values
                .iter()
                .map(|v| encode(v, dialect))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{} IN ({})", field, members.join(", ")))
        }
        (Operator::Contains, Operand::Scalar(value)) => {
            let pattern = Value::text(format!("%{}%", value));
            Ok(format!("{} LIKE {}", field, encode(&pattern, dialect)?))
        }
        (op, Operand::Scalar(value)) => match op.symbol() {
            Some(symbol) => Ok(format!("{} {} {}", field, symbol, encode(value, dialect)?)),
            None => Err(mismatch(op)),
        },
        (op, Operand::List(_)) => Err(mismatch(op)),
    }
}

fn mismatch(op: Operator) -> Error {
    Error::query_syntax(format!("operand shape does not fit operator {}", op))
}
