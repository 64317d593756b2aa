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

//! Filter normalization
//!
//! Turns a raw filter [`Document`] into a typed [`FilterExpression`] tree.
//! All shape inspection of the loosely-typed grammar happens here; the
//! renderer in [`super::compiler`] only ever sees the typed tree.
//!
//! Rules, applied recursively:
//!
//! - `{}` is vacuous and normalizes to `None`
//! - `{a: .., b: ..}` becomes `$and` of `{a: ..}`, `{b: ..}` in key order
//! - `$and`/`$or` take a list of at least two sub-filters; vacuous
//!   sub-filters are dropped, zero survivors is vacuous, one survivor
//!   stands alone
//! - `$not` of a vacuous filter is vacuous
//! - `{f: v}` with a non-document `v` means `{f: {$eq: v}}`
//! - `{f: {$op1: .., $op2: ..}}` becomes `$and` of one comparison per
//!   operator, in key order

use crate::core::{Combinator, Document, Error, Node, Operator, Result, Value};

/// Right-hand side of a field comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Value),
    List(Vec<Value>),
}

/// Normalized filter tree
///
/// `And` and `Or` always hold at least two children; use [`FilterExpression::and`]
/// and [`FilterExpression::or`] to build them from a list of survivors.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Compare {
        field: String,
        op: Operator,
        operand: Operand,
    },
    And(Vec<FilterExpression>),
    Or(Vec<FilterExpression>),
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    /// Scalar comparison `field op value`
    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        FilterExpression::Compare {
            field: field.into(),
            op,
            operand: Operand::Scalar(value.into()),
        }
    }

    /// Membership test `field IN (values)`
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        FilterExpression::Compare {
            field: field.into(),
            op: Operator::In,
            operand: Operand::List(values),
        }
    }

    /// Conjunction of the given children, collapsing degenerate arities
    pub fn and(children: Vec<FilterExpression>) -> Option<Self> {
        Self::group(children, FilterExpression::And)
    }

    /// Disjunction of the given children, collapsing degenerate arities
    pub fn or(children: Vec<FilterExpression>) -> Option<Self> {
        Self::group(children, FilterExpression::Or)
    }

    /// Negation
    pub fn negate(inner: FilterExpression) -> Self {
        FilterExpression::Not(Box::new(inner))
    }

    fn group(
        mut children: Vec<FilterExpression>,
        make: fn(Vec<FilterExpression>) -> FilterExpression,
    ) -> Option<Self> {
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(make(children)),
        }
    }

    /// Number of leaf comparisons in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            FilterExpression::Compare { .. } => 1,
            FilterExpression::And(c) | FilterExpression::Or(c) => {
                c.iter().map(FilterExpression::leaf_count).sum()
            }
            FilterExpression::Not(inner) => inner.leaf_count(),
        }
    }
}

/// Normalize a raw filter document
///
/// Returns `Ok(None)` when the filter places no condition on rows.
pub fn normalize(filter: &Document) -> Result<Option<FilterExpression>> {
    if filter.is_empty() {
        return Ok(None);
    }

    let (key, node) = match filter.single_entry() {
        Some(entry) => entry,
        None => {
            let parts = filter
                .split()
                .iter()
                .map(normalize)
                .collect::<Result<Vec<_>>>()?;
            return Ok(FilterExpression::and(parts.into_iter().flatten().collect()));
        }
    };

    match Combinator::from_key(key) {
        Some(Combinator::Not) => {
            let inner = node.as_document().ok_or_else(|| {
                Error::query_syntax(format!("$not expects a document, got {}", node.kind()))
            })?;
            Ok(normalize(inner)?.map(FilterExpression::negate))
        }
        Some(combinator) => {
            let children = normalize_branches(combinator, node)?;
            Ok(match combinator {
                Combinator::Or => FilterExpression::or(children),
                _ => FilterExpression::and(children),
            })
        }
        None => normalize_field(key, node).map(Some),
    }
}

/// Normalize the sub-filters of `$and`/`$or`, dropping vacuous ones
fn normalize_branches(combinator: Combinator, node: &Node) -> Result<Vec<FilterExpression>> {
    let branches = match node.as_array() {
        Some(items) if items.len() >= 2 => items,
        _ => {
            return Err(Error::query_syntax(format!(
                "value for {} must be a list of at least 2 filters",
                combinator.as_key()
            )))
        }
    };

    let mut survivors = Vec::with_capacity(branches.len());
    for branch in branches {
        let doc = branch.as_document().ok_or_else(|| {
            Error::query_syntax(format!(
                "{} members must be documents, got {}",
                combinator.as_key(),
                branch.kind()
            ))
        })?;
        if let Some(expr) = normalize(doc)? {
            survivors.push(expr);
        }
    }
    Ok(survivors)
}

/// Normalize `{field: node}` where `field` is not a combinator
fn normalize_field(field: &str, node: &Node) -> Result<FilterExpression> {
    let ops = match node {
        Node::Document(ops) => ops,
        // Plain value means equality
        _ => return comparison(field, Operator::Eq, node),
    };

    match ops.single_entry() {
        Some((op, operand)) => comparison(field, op.parse()?, operand),
        None if ops.is_empty() => Err(Error::query_syntax(format!(
            "empty operator document for field {}",
            field
        ))),
        None => {
            let parts = ops
                .iter()
                .map(|(op, operand)| comparison(field, op.parse()?, operand))
                .collect::<Result<Vec<_>>>()?;
            // More than one operator, so the group is never degenerate
            Ok(FilterExpression::And(parts))
        }
    }
}

/// Build one leaf comparison, checking the operand shape for the operator
fn comparison(field: &str, op: Operator, node: &Node) -> Result<FilterExpression> {
    match op {
        Operator::In => {
            let members = node.as_array().ok_or_else(|| {
                Error::query_syntax(format!("$in on {} expects a list, got {}", field, node.kind()))
            })?;
            let values = members
                .iter()
                .map(|m| scalar(field, m).cloned())
                .collect::<Result<Vec<_>>>()?;
            Ok(FilterExpression::in_list(field, values))
        }
        Operator::Contains => match node.as_value() {
            Some(v @ Value::Text(_)) => Ok(FilterExpression::compare(field, op, v.clone())),
            _ => Err(Error::query_syntax(format!(
                "$contains on {} expects a text value",
                field
            ))),
        },
        _ => Ok(FilterExpression::compare(field, op, scalar(field, node)?.clone())),
    }
}

fn scalar<'a>(field: &str, node: &'a Node) -> Result<&'a Value> {
    node.as_value().ok_or_else(|| {
        Error::unsupported_value(format!(
            "{} cannot be compared against a {}",
            field,
            node.kind()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(json: serde_json::Value) -> Document {
        Document::try_from(json).unwrap()
    }

    fn norm(json: serde_json::Value) -> Result<Option<FilterExpression>> {
        normalize(&doc(json))
    }

    #[test]
    fn test_empty_is_vacuous() {
        assert_eq!(norm(json!({})).unwrap(), None);
    }

    #[test]
    fn test_plain_value_is_eq() {
        assert_eq!(
            norm(json!({"id": 1})).unwrap(),
            Some(FilterExpression::compare("id", Operator::Eq, 1))
        );
    }

    #[test]
    fn test_sibling_keys_become_and_in_order() {
        assert_eq!(
            norm(json!({"b": 1, "a": "x"})).unwrap(),
            Some(FilterExpression::And(vec![
                FilterExpression::compare("b", Operator::Eq, 1),
                FilterExpression::compare("a", Operator::Eq, "x"),
            ]))
        );
    }

    #[test]
    fn test_multi_operator_field_splits() {
        assert_eq!(
            norm(json!({"n": {"$gt": 1, "$lt": 10}})).unwrap(),
            Some(FilterExpression::And(vec![
                FilterExpression::compare("n", Operator::Gt, 1),
                FilterExpression::compare("n", Operator::Lt, 10),
            ]))
        );
    }

    #[test]
    fn test_vacuous_branches_are_dropped() {
        // One survivor stands alone
        assert_eq!(
            norm(json!({"$and": [{}, {"a": 1}]})).unwrap(),
            Some(FilterExpression::compare("a", Operator::Eq, 1))
        );
        // No survivors is vacuous
        assert_eq!(norm(json!({"$or": [{}, {"$not": {}}]})).unwrap(), None);
    }

    #[test]
    fn test_not() {
        assert_eq!(
            norm(json!({"$not": {"n": {"$gte": 1}}})).unwrap(),
            Some(FilterExpression::negate(FilterExpression::compare(
                "n",
                Operator::Gte,
                1
            )))
        );
        assert_eq!(norm(json!({"$not": {}})).unwrap(), None);
    }

    #[test]
    fn test_combinator_arity() {
        for bad in [
            json!({"$or": [{"a": 1}]}),
            json!({"$and": []}),
            json!({"$and": {"a": 1}}),
            json!({"$or": "a"}),
        ] {
            assert!(norm(bad).unwrap_err().is_query_syntax());
        }
    }

    #[test]
    fn test_combinator_members_must_be_documents() {
        assert!(norm(json!({"$and": [{"a": 1}, 2]}))
            .unwrap_err()
            .is_query_syntax());
        assert!(norm(json!({"$not": [1, 2]})).unwrap_err().is_query_syntax());
    }

    #[test]
    fn test_unsupported_operator() {
        let err = norm(json!({"a": {"$regex": "x"}})).unwrap_err();
        assert!(err.is_query_syntax());
        assert!(err.to_string().contains("unsupported operator"));

        // Unknown operator hidden among valid ones
        assert!(norm(json!({"a": {"$gt": 1, "$ne": 2}})).is_err());
        assert!(norm(json!({"a": {}})).unwrap_err().is_query_syntax());
    }

    #[test]
    fn test_in_shapes() {
        assert_eq!(
            norm(json!({"n": {"$in": []}})).unwrap(),
            Some(FilterExpression::in_list("n", vec![]))
        );
        assert!(norm(json!({"n": {"$in": 1}})).unwrap_err().is_query_syntax());
        assert!(matches!(
            norm(json!({"n": {"$in": [[1]]}})),
            Err(Error::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_contains_requires_text() {
        assert!(norm(json!({"name": {"$contains": "de"}})).unwrap().is_some());
        assert!(norm(json!({"name": {"$contains": 5}}))
            .unwrap_err()
            .is_query_syntax());
    }

    #[test]
    fn test_non_scalar_comparison() {
        assert!(matches!(
            norm(json!({"a": [1, 2]})),
            Err(Error::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_group_constructors() {
        let leaf = FilterExpression::compare("a", Operator::Eq, 1);
        assert_eq!(FilterExpression::and(vec![]), None);
        assert_eq!(FilterExpression::or(vec![leaf.clone()]), Some(leaf.clone()));
        assert_eq!(
            FilterExpression::or(vec![leaf.clone(), leaf.clone()]).map(|e| e.leaf_count()),
            Some(2)
        );
    }
}
