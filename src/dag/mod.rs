// src/dag/mod.rs

//! Dependency tree construction and the wire form of tasks.
//!
//! - [`tree`] turns a parsed graph into the leaf set and back-links the
//!   executor protocol fans out over.
//! - [`payload`] is the self-contained task copy shipped over the queue.

pub mod payload;
pub mod tree;

pub use payload::TaskPayload;
pub use tree::{DepTree, build};
