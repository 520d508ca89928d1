//! Read-only text renderers for a GraphFrame.
//!
//! - `tree.rs`: indented call tree for the terminal
//! - `dot.rs`: graphviz digraph
//!
//! Renderers never touch the graph or the table; they only look values up.

pub mod dot;
pub mod tree;

pub use dot::{render_dot, DotOptions};
pub use tree::{render_tree, TreeOptions};

use crate::graph::NodeId;
use crate::graphframe::GraphFrame;
use crate::table::{RowKey, Table};

/// Secondary index tuple to display
///
/// A requested tuple is used as is. Otherwise node-only tables use the empty
/// tuple and indexed tables use their smallest tuple (e.g. rank 0).
pub(crate) fn resolve_index(table: &Table, requested: Option<&[i64]>) -> Vec<i64> {
    if let Some(index) = requested {
        return index.to_vec();
    }
    if table.index_names().is_empty() {
        return Vec::new();
    }
    table
        .rows()
        .iter()
        .map(|row| &row.key.index)
        .min()
        .cloned()
        .unwrap_or_default()
}

/// Metric value of one node at one index tuple
pub(crate) fn node_metric(gf: &GraphFrame, node: NodeId, index: &[i64], metric: &str) -> Option<f64> {
    gf.table()
        .metric(&RowKey::new(node, index.to_vec()), metric)
}

/// Display name: the name column, then the frame's `name`, then the whole frame
pub(crate) fn node_label(gf: &GraphFrame, node: NodeId, index: &[i64], name_column: &str) -> String {
    let key = RowKey::new(node, index.to_vec());
    if let Some(name) = gf.table().value(&key, name_column).and_then(|v| v.as_str()) {
        return name.to_string();
    }
    let frame = gf.graph().frame(node);
    frame
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| frame.to_string())
}

/// Largest value of `metric` among the rows at `index`
pub(crate) fn max_metric(gf: &GraphFrame, index: &[i64], metric: &str) -> f64 {
    gf.table()
        .views()
        .filter(|row| row.key().index.as_slice() == index)
        .filter_map(|row| row.metric(metric))
        .fold(0.0, f64::max)
}
