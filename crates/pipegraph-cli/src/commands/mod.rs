//! CLI command implementations

pub mod completions;
pub mod config;
pub mod edge;
pub mod graph;
pub mod io;
pub mod query;
pub mod vertex;

use pipegraph_core::{VertexId, EDGE_RESERVED_KEYS, VERTEX_RESERVED_KEYS};
use serde_json::{Map, Value};

/// Vertex id from a command-line word: integers stay integers
pub fn parse_id(s: &str) -> VertexId {
    s.parse::<i64>()
        .map(VertexId::Int)
        .unwrap_or_else(|_| VertexId::Text(s.to_string()))
}

/// Properties for `vertex add`; `_id` belongs in `--id`
pub fn parse_vertex_props(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let props = parse_props(pairs)?;
    if let Some(key) = VERTEX_RESERVED_KEYS.iter().find(|k| props.contains_key(**k)) {
        anyhow::bail!(
            "'{}' is reserved and cannot be a vertex property; set the id with --id",
            key
        );
    }
    Ok(props)
}

/// Properties for `edge add`; endpoints and label are positional and `--label`
pub fn parse_edge_props(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let props = parse_props(pairs)?;
    if let Some(key) = EDGE_RESERVED_KEYS.iter().find(|k| props.contains_key(**k)) {
        anyhow::bail!(
            "'{}' is reserved and cannot be an edge property; give endpoints as arguments and the label with --label",
            key
        );
    }
    Ok(props)
}

/// `key=value` pairs; values are read as JSON, falling back to plain strings
fn parse_props(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut props = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected key=value, got '{}'", pair))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Empty property name in '{}'", pair);
        }
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        props.insert(key.to_string(), value);
    }
    Ok(props)
}
