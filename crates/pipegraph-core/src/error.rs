//! Error types for Pipegraph Core

use crate::graph::Direction;
use crate::record::VertexId;
use thiserror::Error;

/// Result type alias using Pipegraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Pipegraph error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("A vertex with id {0} already exists")]
    VertexExists(VertexId),

    #[error("That edge's {side} vertex wasn't found: {id}")]
    MissingEndpoint { side: Direction, id: VertexId },

    #[error("Invalid vertex id: {0}")]
    InvalidId(String),

    #[error("Unrecognized pipe type: {0}")]
    UnknownPipetype(String),

    #[error("Filter arg is not a record or predicate: {0}")]
    InvalidFilter(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
