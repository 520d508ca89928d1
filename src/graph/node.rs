//! Graph vertices and lazy DAG traversal.
//!
//! Nodes live in the arena of the [`Graph`] that created them and refer to
//! each other through [`NodeId`]s, so a node may have any number of parents
//! without shared-ownership cycles.

use super::dag::Graph;
use super::frame::Frame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of a node inside its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A DAG vertex: one frame plus parent and child edges
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) frame: Frame,
    pub(crate) parents: Vec<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(frame: Frame) -> Self {
        Self {
            frame,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Order in which [`Traverse`] yields nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Node before its children
    #[default]
    Pre,
    /// Node after its children
    Post,
}

/// Lazy depth-first walk over a graph
///
/// With deduplication on, a node reachable through several parents (or from
/// several starting points) is yielded exactly once. Without it, the node is
/// yielded once per path; the walk still terminates because the graph is acyclic.
pub struct Traverse<'g> {
    graph: &'g Graph,
    order: TraversalOrder,
    visited: Option<Vec<bool>>,
    starts: std::vec::IntoIter<NodeId>,
    // (node, index of the next child to descend into)
    stack: Vec<(NodeId, usize)>,
}

impl<'g> Traverse<'g> {
    pub(crate) fn new(
        graph: &'g Graph,
        starts: Vec<NodeId>,
        order: TraversalOrder,
        dedupe: bool,
    ) -> Self {
        Self {
            graph,
            order,
            visited: dedupe.then(|| vec![false; graph.arena_len()]),
            starts: starts.into_iter(),
            stack: Vec::new(),
        }
    }

    /// Marks `id` visited; returns false if it already was
    fn enter(&mut self, id: NodeId) -> bool {
        match self.visited.as_mut() {
            Some(visited) => !std::mem::replace(&mut visited[id.0], true),
            None => true,
        }
    }
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let Some(top) = self.stack.last_mut() else {
                let start = self.starts.next()?;
                if !self.enter(start) {
                    continue;
                }
                self.stack.push((start, 0));
                if self.order == TraversalOrder::Pre {
                    return Some(start);
                }
                continue;
            };

            let (id, next_child) = *top;
            let children = &self.graph.node(id).children;
            if next_child < children.len() {
                top.1 += 1;
                let child = children[next_child];
                if !self.enter(child) {
                    continue;
                }
                self.stack.push((child, 0));
                if self.order == TraversalOrder::Pre {
                    return Some(child);
                }
            } else {
                self.stack.pop();
                if self.order == TraversalOrder::Post {
                    return Some(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str) -> Frame {
        Frame::from_pairs([("name", name)])
    }

    /// a -> b -> d, a -> c -> d
    fn diamond() -> (Graph, [NodeId; 4]) {
        let mut graph = Graph::new();
        let a = graph.add_root(frame("a"));
        let b = graph.add_child(a, frame("b"));
        let c = graph.add_child(a, frame("c"));
        let d = graph.add_child(b, frame("d"));
        graph.add_edge(c, d);
        (graph, [a, b, c, d])
    }

    #[test]
    fn test_post_order_without_dedupe_repeats_shared_node() {
        let (graph, [a, b, c, d]) = diamond();
        let order: Vec<NodeId> = Traverse::new(&graph, vec![a], TraversalOrder::Post, false).collect();
        assert_eq!(order, vec![d, b, d, c, a]);
    }

    #[test]
    fn test_post_order_with_dedupe() {
        let (graph, [a, b, c, d]) = diamond();
        let order: Vec<NodeId> = Traverse::new(&graph, vec![a], TraversalOrder::Post, true).collect();
        assert_eq!(order, vec![d, b, c, a]);
    }

    #[test]
    fn test_multiple_starts() {
        let (graph, [_, b, c, d]) = diamond();

        let shared: Vec<NodeId> = Traverse::new(&graph, vec![b, c], TraversalOrder::Pre, true).collect();
        assert_eq!(shared, vec![b, d, c]);

        let repeated: Vec<NodeId> =
            Traverse::new(&graph, vec![b, c], TraversalOrder::Pre, false).collect();
        assert_eq!(repeated, vec![b, d, c, d]);

        let post: Vec<NodeId> = Traverse::new(&graph, vec![c, b], TraversalOrder::Post, true).collect();
        assert_eq!(post, vec![d, c, b]);
    }

    #[test]
    fn test_start_listed_twice_is_walked_once() {
        let (graph, [a, ..]) = diamond();
        let count = Traverse::new(&graph, vec![a, a], TraversalOrder::Pre, true).count();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_node_accessors() {
        let (graph, [a, b, c, d]) = diamond();
        let shared = graph.node(d);
        assert_eq!(shared.parents(), &[b, c]);
        assert!(shared.children().is_empty());
        assert!(graph.node(a).is_root());
        assert!(!shared.is_root());
        assert_eq!(shared.frame(), &frame("d"));
        assert_eq!(d.to_string(), "#3");
    }
}
