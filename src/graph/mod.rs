//! Call-path graph model.
//!
//! This module provides:
//! - Frames (structural identity of a call-path position)
//! - An arena-backed multi-rooted DAG of nodes
//! - Traversal, path queries and structural algebra (copy, equality, union)

pub mod algebra;
pub mod dag;
pub mod frame;
pub mod node;

// Re-export main types
pub use algebra::Union;
pub use dag::Graph;
pub use frame::{Frame, FrameValue};
pub use node::{Node, NodeId, TraversalOrder, Traverse};
