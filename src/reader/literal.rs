//! Builds a GraphFrame from a nested JSON literal.
//!
//! Literal format (one record, or an array of records for several roots):
//! `{"name": "main", "metrics": {"time": 1.0, "time (inc)": 3.0}, "children": [...]}`
//!
//! Every record becomes its own node, so the result is a forest. Metric names
//! containing `(inc)` are inclusive; the others are exclusive.

use crate::graph::{Frame, FrameValue, Graph, NodeId};
use crate::graphframe::GraphFrame;
use crate::table::{RowKey, Table, Value};
use crate::utils::config::{INCLUSIVE_MARKER, NAME_ATTR, NAME_COLUMN};
use crate::utils::error::{GraphError, GraphFrameError};
use log::debug;
use serde_json::Map;
use std::collections::BTreeMap;

/// One parsed record before the table is assembled
struct LiteralRow {
    node: NodeId,
    name: String,
    metrics: Vec<(String, f64)>,
}

/// Parse a literal into a GraphFrame
///
/// **Public** - main entry point for literal input
///
/// # Errors
/// * `GraphError::InvalidLiteral` - a record is not an object, has no string
///   `name`, has non-numeric metrics, or `children` is not an array
pub fn from_literal(value: &serde_json::Value) -> Result<GraphFrame, GraphFrameError> {
    let records: &[serde_json::Value] = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(_) => std::slice::from_ref(value),
        other => {
            return Err(GraphError::InvalidLiteral(format!(
                "expected a record or a list of records, found {}",
                other
            ))
            .into())
        }
    };

    let mut graph = Graph::new();
    let mut rows = Vec::new();
    for record in records {
        let root = parse_record(&mut graph, record, &mut rows)?;
        graph.push_root(root);
    }

    // Columns: name, then every metric in first-seen order
    let mut metric_names: Vec<String> = Vec::new();
    for row in &rows {
        for (metric, _) in &row.metrics {
            if !metric_names.contains(metric) {
                metric_names.push(metric.clone());
            }
        }
    }
    let (inc_metrics, exc_metrics): (Vec<String>, Vec<String>) = metric_names
        .iter()
        .cloned()
        .partition(|m| m.contains(INCLUSIVE_MARKER));

    let mut columns = vec![NAME_COLUMN.to_string()];
    columns.extend(metric_names.iter().cloned());
    let mut table = Table::new(Vec::new(), columns);
    for row in rows {
        let mut values = vec![Value::Str(row.name)];
        values.extend(metric_names.iter().map(|metric| {
            row.metrics
                .iter()
                .find(|(m, _)| m == metric)
                .map_or(Value::Null, |(_, v)| Value::Float(*v))
        }));
        table.push(RowKey::node(row.node), values)?;
    }

    debug!(
        "Literal parsed: {} nodes, {} exclusive / {} inclusive metrics",
        table.len(),
        exc_metrics.len(),
        inc_metrics.len()
    );
    GraphFrame::from_parts(graph, table, exc_metrics, inc_metrics)
}

fn parse_record(
    graph: &mut Graph,
    record: &serde_json::Value,
    rows: &mut Vec<LiteralRow>,
) -> Result<NodeId, GraphError> {
    let fields = record
        .as_object()
        .ok_or_else(|| GraphError::InvalidLiteral(format!("expected a record, found {}", record)))?;
    let name = fields
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| GraphError::InvalidLiteral("record without a string name".to_string()))?;

    let mut attrs = BTreeMap::new();
    attrs.insert(NAME_ATTR.to_string(), FrameValue::from(name));
    let node = graph.add_node(Frame::with_key(attrs, vec![NAME_ATTR.to_string()]));

    rows.push(LiteralRow {
        node,
        name: name.to_string(),
        metrics: parse_metrics(name, fields)?,
    });

    match fields.get("children") {
        None => {}
        Some(serde_json::Value::Array(children)) => {
            for child in children {
                let child_id = parse_record(graph, child, rows)?;
                graph.add_edge(node, child_id);
            }
        }
        Some(other) => {
            return Err(GraphError::InvalidLiteral(format!(
                "children of {} must be a list, found {}",
                name, other
            )))
        }
    }
    Ok(node)
}

fn parse_metrics(
    name: &str,
    fields: &Map<String, serde_json::Value>,
) -> Result<Vec<(String, f64)>, GraphError> {
    let Some(metrics) = fields.get("metrics") else {
        return Ok(Vec::new());
    };
    let metrics = metrics.as_object().ok_or_else(|| {
        GraphError::InvalidLiteral(format!("metrics of {} must be a record", name))
    })?;
    metrics
        .iter()
        .map(|(metric, value)| {
            value
                .as_f64()
                .map(|v| (metric.clone(), v))
                .ok_or_else(|| {
                    GraphError::InvalidLiteral(format!(
                        "metric {} of {} is not a number: {}",
                        metric, name, value
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_builds_tree_and_table() {
        let gf = from_literal(&json!({
            "name": "main",
            "metrics": {"time": 1.0, "time (inc)": 3.0},
            "children": [
                {"name": "solve", "metrics": {"time": 2.0, "time (inc)": 2.0}}
            ]
        }))
        .unwrap();

        assert_eq!(gf.graph().len(), 2);
        assert_eq!(gf.exc_metrics(), &["time".to_string()]);
        assert_eq!(gf.inc_metrics(), &["time (inc)".to_string()]);
        assert_eq!(gf.table().columns(), &["name", "time", "time (inc)"]);

        let root = gf.graph().roots()[0];
        assert_eq!(gf.table().metric(&RowKey::node(root), "time (inc)"), Some(3.0));
    }

    #[test]
    fn test_literal_accepts_multiple_roots() {
        let gf = from_literal(&json!([
            {"name": "a", "metrics": {"time": 1.0}},
            {"name": "b", "metrics": {"time": 2.0}}
        ]))
        .unwrap();
        assert_eq!(gf.graph().roots().len(), 2);
    }

    #[test]
    fn test_literal_rejects_non_record() {
        let err = from_literal(&json!({"name": "a", "children": ["b"]})).unwrap_err();
        assert!(matches!(
            err,
            GraphFrameError::Graph(GraphError::InvalidLiteral(_))
        ));

        assert!(from_literal(&json!(42)).is_err());
        assert!(from_literal(&json!({"name": "a", "metrics": {"time": "slow"}})).is_err());
    }
}
