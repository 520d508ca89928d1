//! Snapshot JSON schema definitions.
//!
//! A snapshot is a GraphFrame written to disk: the reachable graph with
//! renumbered node ids, the table rows pointing at those ids, and the metric
//! lists. The schema is versioned to allow future evolution.

use crate::graph::{Frame, FrameValue, Graph, NodeId, TraversalOrder};
use crate::graphframe::GraphFrame;
use crate::table::{RowKey, Table, Value};
use crate::utils::config::SNAPSHOT_VERSION;
use crate::utils::error::{GraphFrameError, ReadError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Top-level snapshot structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the snapshot was written
    pub generated_at: String,

    pub exc_metrics: Vec<String>,
    pub inc_metrics: Vec<String>,

    /// Secondary index dimensions (e.g. `rank`), empty for node-only tables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index_names: Vec<String>,

    pub columns: Vec<String>,

    /// Ids of the root nodes, in root order
    pub roots: Vec<usize>,

    pub nodes: Vec<SnapshotNode>,
    pub rows: Vec<SnapshotRow>,
}

/// One graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: usize,
    pub frame: BTreeMap<String, FrameValue>,

    /// Identity attributes; omitted when every attribute is part of the identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
}

/// One table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub node: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index: Vec<i64>,

    pub values: Vec<Value>,
}

impl Snapshot {
    /// Capture a GraphFrame
    ///
    /// **Public** - nodes are renumbered `0..n` in pre-order from the roots, so
    /// the output is stable regardless of arena history
    pub fn from_graphframe(gf: &GraphFrame) -> Self {
        let graph = gf.graph();
        let order: Vec<NodeId> = graph.traverse(TraversalOrder::Pre).collect();
        let ids: HashMap<NodeId, usize> = order.iter().enumerate().map(|(i, n)| (*n, i)).collect();

        let nodes = order
            .iter()
            .map(|&node| {
                let frame = graph.frame(node);
                let full_key = frame.key().len() == frame.attrs().len()
                    && frame.key().iter().all(|k| frame.attrs().contains_key(k));
                SnapshotNode {
                    id: ids[&node],
                    frame: frame.attrs().clone(),
                    key: (!full_key).then(|| frame.key().to_vec()),
                    children: graph.children(node).iter().map(|c| ids[c]).collect(),
                }
            })
            .collect();

        let table = gf.table();
        let rows = table
            .rows()
            .iter()
            .map(|row| SnapshotRow {
                node: ids[&row.key.node],
                index: row.key.index.clone(),
                values: row.values.clone(),
            })
            .collect();

        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            exc_metrics: gf.exc_metrics().to_vec(),
            inc_metrics: gf.inc_metrics().to_vec(),
            index_names: table.index_names().to_vec(),
            columns: table.columns().to_vec(),
            roots: graph.roots().iter().map(|r| ids[r]).collect(),
            nodes,
            rows,
        }
    }

    /// Rebuild the GraphFrame
    ///
    /// # Errors
    /// * `ReadError::InvalidSnapshot` - unsupported version, duplicate or dangling
    ///   node ids, or a root that has a parent
    /// * `ReadError::Frame` - rows do not fit the table or the metric lists
    pub fn into_graphframe(self) -> Result<GraphFrame, ReadError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(ReadError::InvalidSnapshot(format!(
                "unsupported version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }

        let mut graph = Graph::new();
        let mut ids: HashMap<usize, NodeId> = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let frame = match &node.key {
                Some(key) => Frame::with_key(node.frame.clone(), key.clone()),
                None => Frame::new(node.frame.clone()),
            };
            if ids.insert(node.id, graph.add_node(frame)).is_some() {
                return Err(ReadError::InvalidSnapshot(format!("duplicate node id {}", node.id)));
            }
        }

        let lookup = |id: usize| {
            ids.get(&id)
                .copied()
                .ok_or_else(|| ReadError::InvalidSnapshot(format!("unknown node id {}", id)))
        };
        for node in &self.nodes {
            let parent = lookup(node.id)?;
            for &child in &node.children {
                graph.add_edge(parent, lookup(child)?);
            }
        }
        for &root in &self.roots {
            let id = lookup(root)?;
            if !graph.node(id).is_root() {
                return Err(ReadError::InvalidSnapshot(format!("root {} has a parent", root)));
            }
            graph.push_root(id);
        }

        let mut table = Table::new(self.index_names, self.columns);
        for row in self.rows {
            let key = RowKey::new(lookup(row.node)?, row.index);
            table
                .push(key, row.values)
                .map_err(GraphFrameError::from)?;
        }

        Ok(GraphFrame::from_parts(
            graph,
            table,
            self.exc_metrics,
            self.inc_metrics,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::from_literal;
    use serde_json::json;

    #[test]
    fn test_snapshot_roundtrip_keeps_structure() {
        let gf = from_literal(&json!({
            "name": "main",
            "metrics": {"time": 1.0, "time (inc)": 3.0},
            "children": [{"name": "solve", "metrics": {"time": 2.0, "time (inc)": 2.0}}]
        }))
        .unwrap();

        let snapshot = Snapshot::from_graphframe(&gf);
        assert_eq!(snapshot.roots, vec![0]);
        assert_eq!(snapshot.nodes[0].children, vec![1]);
        assert!(snapshot.nodes[0].key.is_none());

        let back = snapshot.into_graphframe().unwrap();
        assert_eq!(back.graph(), gf.graph());
        assert_eq!(back.table().len(), 2);
        assert_eq!(back.exc_metrics(), gf.exc_metrics());
    }

    #[test]
    fn test_snapshot_rejects_bad_version_and_dangling_child() {
        let gf = from_literal(&json!({"name": "a", "metrics": {"time": 1.0}})).unwrap();

        let mut snapshot = Snapshot::from_graphframe(&gf);
        snapshot.version = "0.1.0".to_string();
        assert!(matches!(
            snapshot.into_graphframe(),
            Err(ReadError::InvalidSnapshot(_))
        ));

        let mut snapshot = Snapshot::from_graphframe(&gf);
        snapshot.nodes[0].children.push(7);
        assert!(matches!(
            snapshot.into_graphframe(),
            Err(ReadError::InvalidSnapshot(_))
        ));
    }
}
