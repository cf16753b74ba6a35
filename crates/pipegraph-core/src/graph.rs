//! In-memory graph store
//!
//! Vertices and edges live in two arenas owned by [`Graph`]. Adjacency lists
//! and edge endpoints hold arena handles ([`VertexIx`], [`EdgeIx`]) rather than
//! ids, so walking an edge never goes through the id index.

use crate::error::{Error, Result};
use crate::pipe::Arg;
use crate::record::{record_matches, EdgeRecord, FlatGraph, VertexId, VertexRecord};
use crate::registry::Registry;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Keys a vertex may not carry as user attributes
pub const VERTEX_RESERVED_KEYS: [&str; 3] = ["_id", "_in", "_out"];

/// Keys an edge may not carry as user attributes; the flat form writes its
/// endpoints and label under them
pub const EDGE_RESERVED_KEYS: [&str; 3] = ["_in", "_out", "_label"];

/// Handle of a vertex inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexIx(usize);

impl VertexIx {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of an edge inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIx(usize);

impl EdgeIx {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Edge direction, seen from a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Out => Self::In,
            Self::In => Self::Out,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Out => write!(f, "out"),
            Self::In => write!(f, "in"),
        }
    }
}

/// A vertex (node) stored in a [`Graph`]
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    props: Map<String, Value>,
    out_edges: Vec<EdgeIx>,
    in_edges: Vec<EdgeIx>,
}

impl Vertex {
    pub fn id(&self) -> &VertexId {
        &self.id
    }

    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    /// Look up an attribute; `_id` resolves to the vertex id
    pub fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        if key == "_id" {
            return Some(Cow::Owned(self.id.to_value()));
        }
        self.props.get(key).map(Cow::Borrowed)
    }

    /// Partial-record equality against this vertex's attributes
    pub fn matches(&self, filter: &Map<String, Value>) -> bool {
        record_matches(filter, |key| self.get(key))
    }

    pub fn to_record(&self) -> VertexRecord {
        VertexRecord {
            id: Some(self.id.clone()),
            props: self.props.clone(),
        }
    }
}

/// A directed, labeled edge stored in a [`Graph`]
#[derive(Debug, Clone)]
pub struct Edge {
    label: Option<String>,
    out: VertexIx,
    in_: VertexIx,
    props: Map<String, Value>,
}

impl Edge {
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Tail of the edge
    pub fn out(&self) -> VertexIx {
        self.out
    }

    /// Head of the edge
    pub fn in_(&self) -> VertexIx {
        self.in_
    }

    pub fn endpoint(&self, side: Direction) -> VertexIx {
        match side {
            Direction::Out => self.out,
            Direction::In => self.in_,
        }
    }

    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }
}

/// In-memory graph store
#[derive(Debug)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    vertex_index: HashMap<VertexId, VertexIx>,
    autoid: i64,
    registry: Arc<Registry>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Empty graph using the built-in pipetypes
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            vertex_index: HashMap::new(),
            autoid: 1,
            registry: Arc::new(Registry::default()),
        }
    }

    /// Build a graph from vertex and edge records, in order
    pub fn from_records(
        vertices: impl IntoIterator<Item = VertexRecord>,
        edges: impl IntoIterator<Item = EdgeRecord>,
    ) -> Self {
        let mut graph = Self::new();
        graph.add_vertices(vertices);
        graph.add_edges(edges);
        graph
    }

    /// Use a custom registry for queries over this graph
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a vertex, assigning an id from the counter when none is given
    pub fn add_vertex(&mut self, record: VertexRecord) -> Result<VertexId> {
        let VertexRecord { id, mut props } = record;

        let id = match id {
            Some(id) if self.vertex_index.contains_key(&id) => {
                return Err(Error::VertexExists(id));
            }
            Some(id) => id,
            None => self.next_auto_id(),
        };

        for key in VERTEX_RESERVED_KEYS {
            props.remove(key);
        }

        let ix = VertexIx(self.vertices.len());
        self.vertices.push(Vertex {
            id: id.clone(),
            props,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        });
        self.vertex_index.insert(id.clone(), ix);

        Ok(id)
    }

    fn next_auto_id(&mut self) -> VertexId {
        loop {
            let id = VertexId::Int(self.autoid);
            self.autoid += 1;
            if !self.vertex_index.contains_key(&id) {
                return id;
            }
        }
    }

    /// Insert an edge between two existing vertices
    pub fn add_edge(&mut self, record: EdgeRecord) -> Result<EdgeIx> {
        let EdgeRecord {
            out,
            in_,
            label,
            mut props,
        } = record;

        for key in EDGE_RESERVED_KEYS {
            if props.remove(key).is_some() {
                tracing::warn!("Dropping reserved edge attribute '{}'", key);
            }
        }

        let in_ix = self.find_vertex_by_id(&in_).ok_or(Error::MissingEndpoint {
            side: Direction::In,
            id: in_,
        })?;
        let out_ix = self.find_vertex_by_id(&out).ok_or(Error::MissingEndpoint {
            side: Direction::Out,
            id: out,
        })?;

        let ix = EdgeIx(self.edges.len());
        self.edges.push(Edge {
            label,
            out: out_ix,
            in_: in_ix,
            props,
        });
        self.vertices[out_ix.0].out_edges.push(ix);
        self.vertices[in_ix.0].in_edges.push(ix);

        Ok(ix)
    }

    /// Insert vertices one by one; failures are logged and skipped.
    /// Returns how many were inserted.
    pub fn add_vertices(&mut self, records: impl IntoIterator<Item = VertexRecord>) -> usize {
        let mut added = 0;
        for record in records {
            match self.add_vertex(record) {
                Ok(_) => added += 1,
                Err(e) => tracing::warn!("Skipping vertex: {}", e),
            }
        }
        added
    }

    /// Insert edges one by one; failures are logged and skipped.
    /// Returns how many were inserted.
    pub fn add_edges(&mut self, records: impl IntoIterator<Item = EdgeRecord>) -> usize {
        let mut added = 0;
        for record in records {
            match self.add_edge(record) {
                Ok(_) => added += 1,
                Err(e) => tracing::warn!("Skipping edge: {}", e),
            }
        }
        added
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    pub fn vertex(&self, ix: VertexIx) -> &Vertex {
        &self.vertices[ix.0]
    }

    pub fn edge(&self, ix: EdgeIx) -> &Edge {
        &self.edges[ix.0]
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertex selection for query sources.
    ///
    /// No arguments selects every vertex, a leading record selects vertices
    /// matching it, and anything else is read as a list of ids.
    pub fn find_vertices(&self, args: &[Arg]) -> Vec<VertexIx> {
        match args.first() {
            None => (0..self.vertices.len()).map(VertexIx).collect(),
            Some(Arg::Value(Value::Object(filter))) => self.search_vertices(filter),
            Some(_) => {
                let ids: Vec<VertexId> = args
                    .iter()
                    .filter_map(|arg| match VertexId::from_value(arg.as_value()?) {
                        Ok(id) => Some(id),
                        Err(e) => {
                            tracing::warn!("Ignoring vertex selector: {}", e);
                            None
                        }
                    })
                    .collect();
                self.find_vertices_by_ids(&ids)
            }
        }
    }

    /// Resolve ids in order, dropping the ones that are not present
    pub fn find_vertices_by_ids(&self, ids: &[VertexId]) -> Vec<VertexIx> {
        ids.iter()
            .filter_map(|id| self.find_vertex_by_id(id))
            .collect()
    }

    pub fn find_vertex_by_id(&self, id: &VertexId) -> Option<VertexIx> {
        self.vertex_index.get(id).copied()
    }

    /// Convenience lookup returning the vertex itself
    pub fn get_vertex(&self, id: impl Into<VertexId>) -> Option<&Vertex> {
        self.find_vertex_by_id(&id.into()).map(|ix| self.vertex(ix))
    }

    /// Vertices whose attributes match every key of `filter`
    pub fn search_vertices(&self, filter: &Map<String, Value>) -> Vec<VertexIx> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, vertex)| vertex.matches(filter))
            .map(|(i, _)| VertexIx(i))
            .collect()
    }

    pub fn find_out_edges(&self, ix: VertexIx) -> &[EdgeIx] {
        &self.vertices[ix.0].out_edges
    }

    pub fn find_in_edges(&self, ix: VertexIx) -> &[EdgeIx] {
        &self.vertices[ix.0].in_edges
    }

    /// Adjacency list of `ix` in the given direction
    pub fn find_edges(&self, ix: VertexIx, direction: Direction) -> &[EdgeIx] {
        match direction {
            Direction::Out => self.find_out_edges(ix),
            Direction::In => self.find_in_edges(ix),
        }
    }

    /// Partial-record equality against an edge.
    ///
    /// `_label` matches the label, `_in`/`_out` match endpoint ids, any other
    /// key matches an edge attribute.
    pub fn edge_matches(&self, ix: EdgeIx, filter: &Map<String, Value>) -> bool {
        let edge = self.edge(ix);
        record_matches(filter, |key| match key {
            "_label" => edge.label.as_ref().map(|l| Cow::Owned(Value::String(l.clone()))),
            "_out" => Some(Cow::Owned(self.vertex(edge.out).id.to_value())),
            "_in" => Some(Cow::Owned(self.vertex(edge.in_).id.to_value())),
            other => edge.props.get(other).map(Cow::Borrowed),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Flat form
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot with endpoints rendered as ids and adjacency lists dropped
    pub fn to_flat(&self) -> FlatGraph {
        FlatGraph {
            vertices: self.vertices.iter().map(Vertex::to_record).collect(),
            edges: self
                .edges
                .iter()
                .map(|edge| EdgeRecord {
                    out: self.vertex(edge.out).id.clone(),
                    in_: self.vertex(edge.in_).id.clone(),
                    label: edge.label.clone(),
                    props: edge.props.clone(),
                })
                .collect(),
        }
    }

    pub fn to_flat_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_flat())?)
    }

    /// Rebuild a graph by replaying the snapshot's inserts
    pub fn from_flat(flat: FlatGraph) -> Self {
        Self::from_records(flat.vertices, flat.edges)
    }

    pub fn from_flat_str(s: &str) -> Result<Self> {
        let flat: FlatGraph = serde_json::from_str(s)?;
        Ok(Self::from_flat(flat))
    }
}
