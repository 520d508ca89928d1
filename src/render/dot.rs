//! Graphviz export.
//!
//! Nodes are numbered in pre-order and labelled with their name and metric;
//! every parent/child pair becomes one edge, so shared DAG nodes keep all of
//! their incoming edges.

use super::{max_metric, node_label, node_metric, resolve_index};
use crate::graph::{NodeId, TraversalOrder};
use crate::graphframe::GraphFrame;
use crate::utils::config::{DEFAULT_METRIC, DEFAULT_PRECISION, NAME_COLUMN};
use std::collections::HashMap;
use std::fmt::Write;

/// DOT rendering options
#[derive(Debug, Clone)]
pub struct DotOptions {
    pub metric: String,
    pub name_column: String,
    pub index: Option<Vec<i64>>,
    pub precision: usize,

    /// Shade nodes from white to red by metric value
    pub fill: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            metric: DEFAULT_METRIC.to_string(),
            name_column: NAME_COLUMN.to_string(),
            index: None,
            precision: DEFAULT_PRECISION,
            fill: true,
        }
    }
}

/// Render the frame as a `strict digraph`
///
/// **Public** - output is meant for `dot -Tsvg`
pub fn render_dot(gf: &GraphFrame, options: &DotOptions) -> String {
    let index = resolve_index(gf.table(), options.index.as_deref());
    let max = max_metric(gf, &index, &options.metric);
    let graph = gf.graph();

    let order: Vec<NodeId> = graph.traverse(TraversalOrder::Pre).collect();
    let ids: HashMap<NodeId, usize> = order.iter().enumerate().map(|(i, n)| (*n, i)).collect();

    let mut out = String::from("strict digraph {\n");
    out.push_str("  node [shape=box, style=filled, fillcolor=\"#ffffff\"];\n");

    for &node in &order {
        let name = escape(&node_label(gf, node, &index, &options.name_column));
        let value = node_metric(gf, node, &index, &options.metric);
        let label = match value {
            Some(v) => format!("{}\\n{:.*}", name, options.precision, v),
            None => name,
        };
        let _ = write!(out, "  \"{}\" [label=\"{}\"", ids[&node], label);
        if let (true, Some(v)) = (options.fill, value) {
            let _ = write!(out, ", fillcolor=\"{}\"", shade(v, max));
        }
        out.push_str("];\n");
    }

    for &node in &order {
        for child in graph.children(node) {
            let _ = writeln!(out, "  \"{}\" -> \"{}\";", ids[&node], ids[child]);
        }
    }

    out.push_str("}\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `#ffffff` for zero, `#ff0000` for the maximum
fn shade(value: f64, max: f64) -> String {
    let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let channel = (255.0 * (1.0 - ratio)).round() as u8;
    format!("#ff{:02x}{:02x}", channel, channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::from_literal;
    use serde_json::json;

    #[test]
    fn test_render_dot_lists_nodes_and_edges() {
        let gf = from_literal(&json!({
            "name": "main",
            "metrics": {"time": 2.0},
            "children": [{"name": "say \"hi\"", "metrics": {"time": 1.0}}]
        }))
        .unwrap();

        let dot = render_dot(&gf, &DotOptions { fill: false, ..DotOptions::default() });
        assert!(dot.starts_with("strict digraph {\n"));
        assert!(dot.contains("\"0\" [label=\"main\\n2.000\"];"));
        assert!(dot.contains("\"1\" [label=\"say \\\"hi\\\"\\n1.000\"];"));
        assert!(dot.contains("\"0\" -> \"1\";"));
    }

    #[test]
    fn test_shade_scales_with_value() {
        assert_eq!(shade(0.0, 4.0), "#ffffff");
        assert_eq!(shade(4.0, 4.0), "#ff0000");
        assert_eq!(shade(1.0, 0.0), "#ffffff");
    }
}
