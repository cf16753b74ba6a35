//! Pipegraph Storage - Key-value persistence for graphs
//!
//! Graphs are stored in their flat JSON form under `PIPEGRAPH::<name>` keys.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use traits::{storage_key, GraphStorage, DEFAULT_GRAPH_NAME, KEY_PREFIX};

#[cfg(feature = "redb")]
pub use redb::RedbStorage;

pub use memory::MemoryStorage;
