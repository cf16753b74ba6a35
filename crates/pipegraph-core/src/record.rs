//! Vertex and edge records, and the flat `{"V": [...], "E": [...]}` form

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::hash::{Hash, Hasher};

/// Identifier of a vertex
///
/// Integer and string ids share one key space: `10` and `"10"` name the same
/// vertex, both for lookups and for collision checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VertexId {
    Int(i64),
    Text(String),
}

impl VertexId {
    /// Canonical key used by the store's index
    pub fn key(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Int(n) => std::borrow::Cow::Owned(n.to_string()),
            Self::Text(s) => std::borrow::Cow::Borrowed(s),
        }
    }

    /// Read an id out of a JSON value (string or integer)
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .ok_or_else(|| Error::InvalidId(n.to_string())),
            other => Err(Error::InvalidId(other.to_string())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl PartialEq for VertexId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => self.key() == other.key(),
        }
    }
}

impl Eq for VertexId {}

impl Hash for VertexId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl From<i64> for VertexId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for VertexId {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A vertex as supplied by callers and as written to the flat form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    /// Assigned from the store's counter when absent
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VertexId>,

    /// User attributes
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl VertexRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<VertexId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// An edge as supplied by callers and as written to the flat form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(rename = "_out")]
    pub out: VertexId,

    #[serde(rename = "_in")]
    pub in_: VertexId,

    #[serde(rename = "_label", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// User attributes
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl EdgeRecord {
    pub fn new(out: impl Into<VertexId>, in_: impl Into<VertexId>, label: impl Into<String>) -> Self {
        Self {
            out: out.into(),
            in_: in_.into(),
            label: Some(label.into()),
            props: Map::new(),
        }
    }

    /// Edge without a label
    pub fn unlabeled(out: impl Into<VertexId>, in_: impl Into<VertexId>) -> Self {
        Self {
            out: out.into(),
            in_: in_.into(),
            label: None,
            props: Map::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// Flat, serializable snapshot of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatGraph {
    #[serde(rename = "V", default)]
    pub vertices: Vec<VertexRecord>,

    #[serde(rename = "E", default)]
    pub edges: Vec<EdgeRecord>,
}

/// Partial-record equality: every key of `filter` must be present in the
/// record with an equal value
pub(crate) fn record_matches<'a>(
    filter: &Map<String, Value>,
    mut lookup: impl FnMut(&str) -> Option<std::borrow::Cow<'a, Value>>,
) -> bool {
    filter
        .iter()
        .all(|(key, expected)| lookup(key).is_some_and(|actual| actual.as_ref() == expected))
}
