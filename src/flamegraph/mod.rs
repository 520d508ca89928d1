//! Flamegraph generation.
//!
//! This module turns a GraphFrame into a self-contained SVG flamegraph whose
//! box widths follow an inclusive metric.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, FlamegraphConfig};
