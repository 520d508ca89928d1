//! Callpath Studio
//!
//! Graph algebra for hierarchical call-path performance profiles.
//!
//! A [`GraphFrame`](graphframe::GraphFrame) couples a multi-rooted call-path
//! DAG with a table of per-node metrics. The crate provides structural
//! equality, copy and union of graphs, row filtering, squashing the graph
//! around filtered rows, and re-deriving inclusive metrics after any
//! topology change.
//!
//! ## Getting Started
//!
//! ```ignore
//! use callpath_studio::reader::from_literal;
//!
//! let gf = from_literal(&literal)?;
//! let calc = gf.filter(|row| row.name().is_some_and(|n| n.starts_with("Calc")));
//! let squashed = calc.squash()?;
//! ```
//!
//! The `callpath` binary exposes the same operations on JSON files:
//!
//! ```bash
//! callpath tree profile.json --threshold 0.05
//! callpath squash profile.json --keep Calc -o calc.json
//! ```

pub mod commands;
pub mod flamegraph;
pub mod graph;
pub mod graphframe;
pub mod output;
pub mod reader;
pub mod render;
pub mod table;
pub mod utils;

pub use graph::{Frame, FrameValue, Graph, NodeId};
pub use graphframe::GraphFrame;
