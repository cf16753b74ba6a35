//! Pipegraph Core - in-memory graph store with a lazy pipeline query engine
//!
//! A [`Graph`] owns vertices and edges. Queries are built by chaining steps
//! onto [`Graph::v`] and evaluated by [`Query::run`], a pull-driven virtual
//! machine that does only as much work as the last step asks for.
//!
//! ```
//! use pipegraph_core::{EdgeRecord, Graph, VertexRecord};
//!
//! let graph = Graph::from_records(
//!     vec![
//!         VertexRecord::new().with_prop("name", "alice"),
//!         VertexRecord::new().with_id(10).with_prop("name", "bob"),
//!     ],
//!     vec![EdgeRecord::new(1, 10, "knows")],
//! );
//!
//! let results = graph.v([1]).out("knows").property("name").run();
//! assert_eq!(results[0].to_json(), "bob");
//! ```

pub mod error;
pub mod graph;
pub mod gremlin;
pub mod pipe;
pub mod pipes;
pub mod query;
pub mod record;
pub mod registry;

pub use error::{Error, Result};
pub use graph::{
    Direction, Edge, EdgeIx, Graph, Vertex, VertexIx, EDGE_RESERVED_KEYS, VERTEX_RESERVED_KEYS,
};
pub use gremlin::{Bindings, Gremlin};
pub use pipe::{passthrough, Arg, Args, PipeState, Pipetype, Predicate, Step, Token};
pub use query::{Output, Query};
pub use record::{EdgeRecord, FlatGraph, VertexId, VertexRecord};
pub use registry::{Registry, TransformFn, ALIAS_PRIORITY};
