//! Traversal tokens

use crate::graph::VertexIx;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Label -> vertex table shared by every gremlin descended from one origin
pub type Bindings = Rc<RefCell<HashMap<String, VertexIx>>>;

/// A token standing at one vertex during a traversal
///
/// Moving a gremlin creates a new one that shares the binding table, so an
/// `as` on one branch is visible to everything that walked on from it.
#[derive(Debug, Clone)]
pub struct Gremlin {
    vertex: VertexIx,
    bindings: Bindings,
    result: Option<Value>,
}

impl Gremlin {
    /// Gremlin with a fresh, empty binding table
    pub fn new(vertex: VertexIx) -> Self {
        Self::with_bindings(vertex, Bindings::default())
    }

    pub fn with_bindings(vertex: VertexIx, bindings: Bindings) -> Self {
        Self {
            vertex,
            bindings,
            result: None,
        }
    }

    /// A new gremlin at `vertex` sharing this one's bindings
    pub fn goto(&self, vertex: VertexIx) -> Self {
        Self::with_bindings(vertex, Rc::clone(&self.bindings))
    }

    pub fn vertex(&self) -> VertexIx {
        self.vertex
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Bind the current vertex under `label`
    pub fn bind(&self, label: impl Into<String>) {
        self.bindings.borrow_mut().insert(label.into(), self.vertex);
    }

    pub fn bound(&self, label: &str) -> Option<VertexIx> {
        self.bindings.borrow().get(label).copied()
    }

    /// Projected value, if a pipe set one
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, value: Option<Value>) {
        self.result = value;
    }

    pub fn into_result(self) -> Option<Value> {
        self.result
    }
}
