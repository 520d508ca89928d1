//! The call-path graph: an arena of nodes plus an ordered list of roots.
//!
//! Structural algebra (copy, equality, union) lives in `algebra.rs`; this file
//! covers construction, edges, traversal and path queries.

use super::frame::{Frame, FrameValue};
use super::node::{Node, NodeId, TraversalOrder, Traverse};
use crate::utils::config::{DEFAULT_FRAME_TYPE, NAME_ATTR, TYPE_ATTR};
use crate::utils::error::GraphError;
use std::collections::{HashSet, VecDeque};

/// A possibly multi-rooted DAG of call-path nodes
///
/// **Public** - shared by every GraphFrame built on top of it
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node to the arena
    pub fn add_node(&mut self, frame: Frame) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(frame));
        id
    }

    /// Add a node and register it as a root
    pub fn add_root(&mut self, frame: Frame) -> NodeId {
        let id = self.add_node(frame);
        self.roots.push(id);
        id
    }

    /// Add a node as a child of `parent`
    pub fn add_child(&mut self, parent: NodeId, frame: Frame) -> NodeId {
        let id = self.add_node(frame);
        self.add_edge(parent, id);
        id
    }

    /// Connect `parent -> child`, updating both ends
    ///
    /// Returns false if the edge already existed.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> bool {
        debug_assert!(self.contains(parent) && self.contains(child));
        if self.nodes[parent.0].children.contains(&child) {
            return false;
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parents.push(parent);
        true
    }

    /// Append an existing node to the root list (no-op if already a root)
    pub fn push_root(&mut self, id: NodeId) {
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }

    /// Keep only roots matching `keep`
    pub(crate) fn retain_roots(&mut self, mut keep: impl FnMut(&Node) -> bool) {
        let nodes = &self.nodes;
        self.roots.retain(|id| keep(&nodes[id.0]));
    }

    pub(crate) fn sort_roots_by_frame(&mut self) {
        let nodes = &self.nodes;
        self.roots.sort_by(|a, b| nodes[a.0].frame.cmp(&nodes[b.0].frame));
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Look up a node
    ///
    /// # Panics
    /// If `id` was issued by a different graph with a larger arena.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn frame(&self, id: NodeId) -> &Frame {
        &self.nodes[id.0].frame
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].parents
    }

    pub(crate) fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct nodes reachable from the roots
    pub fn len(&self) -> usize {
        self.traverse(TraversalOrder::Pre).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Walk every root with one shared visited set
    pub fn traverse(&self, order: TraversalOrder) -> Traverse<'_> {
        Traverse::new(self, self.roots.clone(), order, true)
    }

    /// Walk the subgraph below `start`
    pub fn traverse_from(&self, start: NodeId, order: TraversalOrder, dedupe: bool) -> Traverse<'_> {
        Traverse::new(self, vec![start], order, dedupe)
    }

    /// True if `to` is `from` or one of its descendants
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        self.traverse_from(from, TraversalOrder::Pre, true)
            .any(|id| id == to)
    }

    /// Breadth-first order over everything reachable from `starts`
    pub fn bfs_from(&self, starts: &[NodeId]) -> Vec<NodeId> {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let mut order = Vec::new();

        for &start in starts {
            if seen.insert(start) {
                queue.push_back(start);
            }
        }
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &child in &self.nodes[id.0].children {
                if seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        order
    }

    /// Every root-to-node sequence of frames, one per parent chain
    pub fn paths(&self, id: NodeId) -> Vec<Vec<&Frame>> {
        let node = &self.nodes[id.0];
        if node.parents.is_empty() {
            return vec![vec![&node.frame]];
        }
        let mut paths = Vec::new();
        for &parent in &node.parents {
            for mut path in self.paths(parent) {
                path.push(&node.frame);
                paths.push(path);
            }
        }
        paths
    }

    /// The unique root-to-node path
    ///
    /// # Errors
    /// * `GraphError::MultiplePaths` - the node is reachable along more than one parent chain
    pub fn path(&self, id: NodeId) -> Result<Vec<&Frame>, GraphError> {
        let mut paths = self.paths(id);
        if paths.len() > 1 {
            return Err(GraphError::MultiplePaths { node: id });
        }
        Ok(paths.pop().unwrap_or_default())
    }

    /// [`Graph::path`] projected onto one frame attribute
    pub fn path_attr(&self, id: NodeId, attr: &str) -> Result<Vec<Option<&FrameValue>>, GraphError> {
        Ok(self
            .path(id)?
            .into_iter()
            .map(|frame| frame.get(attr))
            .collect())
    }

    /// Reachable nodes whose frame has `attr == value`, in pre-order
    pub fn find_by_attr(&self, attr: &str, value: &FrameValue) -> Vec<NodeId> {
        self.traverse(TraversalOrder::Pre)
            .filter(|&id| self.frame(id).get(attr) == Some(value))
            .collect()
    }

    /// Build a tree from the nested-list shorthand
    ///
    /// A string is a leaf; an array is `[name, child, child, ...]`.
    ///
    /// # Example
    /// ```ignore
    /// let graph = Graph::from_lists(&json!(["a", ["b", "d", "e"], ["c", "f", "g"]]))?;
    /// ```
    pub fn from_lists(value: &serde_json::Value) -> Result<Self, GraphError> {
        Self::from_lists_multi(std::slice::from_ref(value))
    }

    /// Build a multi-rooted graph, one root per nested list
    pub fn from_lists_multi(values: &[serde_json::Value]) -> Result<Self, GraphError> {
        let mut graph = Graph::new();
        for value in values {
            let root = graph.build_list_node(value)?;
            graph.roots.push(root);
        }
        Ok(graph)
    }

    fn build_list_node(&mut self, value: &serde_json::Value) -> Result<NodeId, GraphError> {
        match value {
            serde_json::Value::String(name) => Ok(self.add_node(list_frame(name))),
            serde_json::Value::Array(items) => {
                let (head, rest) = items
                    .split_first()
                    .ok_or_else(|| GraphError::InvalidLiteral("empty list".to_string()))?;
                let name = head.as_str().ok_or_else(|| {
                    GraphError::InvalidLiteral(format!("expected a name, found {}", head))
                })?;
                let id = self.add_node(list_frame(name));
                for child in rest {
                    let child_id = self.build_list_node(child)?;
                    self.add_edge(id, child_id);
                }
                Ok(id)
            }
            other => Err(GraphError::InvalidLiteral(format!(
                "expected a string or a list, found {}",
                other
            ))),
        }
    }

    /// Verify parent/child symmetry and root parentlessness
    pub(crate) fn check_invariants(&self) -> bool {
        let symmetric = self.nodes.iter().enumerate().all(|(i, node)| {
            let id = NodeId(i);
            node.children
                .iter()
                .all(|c| self.nodes[c.0].parents.contains(&id))
                && node
                    .parents
                    .iter()
                    .all(|p| self.nodes[p.0].children.contains(&id))
        });
        symmetric && self.roots.iter().all(|r| self.nodes[r.0].is_root())
    }
}

fn list_frame(name: &str) -> Frame {
    Frame::from_pairs([(NAME_ATTR, name), (TYPE_ATTR, DEFAULT_FRAME_TYPE)])
}
