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

//! Ordered documents - the raw input grammar for filters and attributes
//!
//! A [`Document`] is an insertion-ordered mapping from keys to [`Node`]s.
//! Key order is significant: sibling keys of a filter are ANDed in the
//! order they were written, and INSERT columns follow attribute order.
//!
//! # Example
//!
//! ```
//! use monsql::{Document, Value};
//! use serde_json::json;
//!
//! let filter = Document::try_from(json!({"age": {"$gte": 18}, "name": "Alice"})).unwrap();
//! assert_eq!(filter.keys().collect::<Vec<_>>(), vec!["age", "name"]);
//!
//! let mut attrs = Document::new();
//! attrs.insert("b", 1);
//! attrs.insert("a", Value::text("x"));
//! assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["b", "a"]);
//! ```

use std::fmt;

use super::error::{Error, Result};
use super::value::Value;

/// One entry of a document: a scalar, a list, or a nested document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Value(Value),
    Array(Vec<Node>),
    Document(Document),
}

impl Node {
    /// Returns the scalar if this node is one
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Node::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the nested document if this node is one
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Node::Document(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the list if this node is one
    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Short description of the node kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Value(_) => "value",
            Node::Array(_) => "array",
            Node::Document(_) => "document",
        }
    }
}

impl<T: Into<Value>> From<T> for Node {
    fn from(v: T) -> Self {
        Node::Value(v.into())
    }
}

impl From<Document> for Node {
    fn from(d: Document) -> Self {
        Node::Document(d)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

/// Insertion-ordered mapping from keys to nodes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    entries: Vec<(String, Node)>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document holding a single entry
    pub fn singleton(key: impl Into<String>, node: impl Into<Node>) -> Self {
        Self {
            entries: vec![(key.into(), node.into())],
        }
    }

    /// Insert an entry. An existing key keeps its position and has its node
    /// replaced; a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) -> &mut Self {
        let key = key.into();
        let node = node.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = node,
            None => self.entries.push((key, node)),
        }
        self
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(key, node);
        self
    }

    /// Look up a node by key
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the document has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// The only entry, if the document has exactly one
    pub fn single_entry(&self) -> Option<(&str, &Node)> {
        match self.entries.as_slice() {
            [(k, n)] => Some((k.as_str(), n)),
            _ => None,
        }
    }

    /// Split into one single-entry document per key, preserving order
    pub fn split(&self) -> Vec<Document> {
        self.entries
            .iter()
            .map(|(k, n)| Document::singleton(k.clone(), n.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, n)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", k, n)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Value(Value::Text(s)) => write!(f, "{:?}", s),
            Node::Value(v) => write!(f, "{}", v),
            Node::Array(items) => {
                write!(f, "[")?;
                for (i, n) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", n)?;
                }
                write!(f, "]")
            }
            Node::Document(d) => write!(f, "{}", d),
        }
    }
}

// =========================================================================
// JSON conversion
// =========================================================================

impl TryFrom<serde_json::Value> for Node {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Node::Value(Value::Null)),
            Json::String(s) => Ok(Node::Value(Value::from(s))),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Node::Value(Value::Integer(i)))
                } else if let Some(f) = n.as_f64() {
                    Ok(Node::Value(Value::Float(f)))
                } else {
                    Err(Error::unsupported_value(format!("number {}", n)))
                }
            }
            Json::Bool(b) => Err(Error::unsupported_value(format!(
                "boolean {} has no SQL literal encoding",
                b
            ))),
            Json::Array(items) => items
                .into_iter()
                .map(Node::try_from)
                .collect::<Result<Vec<_>>>()
                .map(Node::Array),
            Json::Object(_) => Document::try_from(json).map(Node::Document),
        }
    }
}

impl TryFrom<serde_json::Value> for Document {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => {
                let mut doc = Document::new();
                // preserve_order keeps the map in source order
                for (k, v) in map {
                    doc.insert(k, Node::try_from(v)?);
                }
                Ok(doc)
            }
            other => Err(Error::query_syntax(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}
