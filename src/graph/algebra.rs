//! Structural graph algebra: copy, DAG equality and union.
//!
//! Every operation here reads its inputs and builds a brand new [`Graph`];
//! nothing is rewired in place.

use super::dag::Graph;
use super::frame::Frame;
use super::node::NodeId;
use crate::utils::error::GraphError;
use log::debug;
use std::collections::{HashMap, HashSet, VecDeque};

/// Result of [`Graph::union`]
///
/// **Public** - callers use the mappings to re-point table rows
#[derive(Debug, Clone)]
pub struct Union {
    /// The merged graph
    pub graph: Graph,

    /// Node of the left input -> node of `graph`
    pub left: HashMap<NodeId, NodeId>,

    /// Node of the right input -> node of `graph`
    pub right: HashMap<NodeId, NodeId>,
}

impl Graph {
    /// Deep-copy the graph
    ///
    /// **Public** - used by GraphFrame::copy and the equal-graph union path
    ///
    /// # Returns
    /// The clone and the mapping `old node -> cloned node`, covering every
    /// node reachable from the roots exactly once.
    ///
    /// # Algorithm
    /// 1. Breadth-first from the roots, allocate one clone per node
    /// 2. Re-register cloned roots in their original order
    /// 3. Wire every `parent -> child` edge between clones
    ///
    /// Allocating all clones before wiring means a child never waits on a parent
    /// that breadth-first order has not reached yet (possible in DAGs where one
    /// parent sits deeper than another).
    pub fn copy(&self) -> (Graph, HashMap<NodeId, NodeId>) {
        let order = self.bfs_from(self.roots());
        let mut graph = Graph::new();
        let mut clones = HashMap::with_capacity(order.len());

        for &id in &order {
            clones.insert(id, graph.add_node(self.frame(id).clone()));
        }
        for root in self.roots() {
            graph.push_root(clones[root]);
        }
        for &id in &order {
            for child in self.children(id) {
                graph.add_edge(clones[&id], clones[child]);
            }
        }

        debug_assert!(graph.check_invariants());
        (graph, clones)
    }

    /// Structural equality of the subgraphs below `node` and `other_node`
    ///
    /// Frames must match and children must pair up one-to-one after sorting
    /// both child lists by frame.
    pub fn dag_equal(&self, node: NodeId, other: &Graph, other_node: NodeId) -> bool {
        let mut matcher = Matcher::new(self, other);
        matcher.walk(node, other_node)
    }

    /// Pair every node of `self` with its structural counterpart in `other`
    ///
    /// # Returns
    /// `None` if the graphs are not structurally equal
    pub fn match_nodes(&self, other: &Graph) -> Option<HashMap<NodeId, NodeId>> {
        if self.roots().len() != other.roots().len() || self.len() != other.len() {
            return None;
        }

        let mut matcher = Matcher::new(self, other);
        let left_roots = sorted_by_frame(self, self.roots());
        let right_roots = sorted_by_frame(other, other.roots());
        for (l, r) in left_roots.into_iter().zip(right_roots) {
            if !matcher.walk(l, r) {
                return None;
            }
        }
        Some(matcher.pairs)
    }

    /// Merge two graphs, matching nodes by frame equality
    ///
    /// **Public** - main entry point for combining profiles
    ///
    /// Structurally equal inputs produce a copy of `self`. Otherwise every
    /// distinct frame across both inputs gets one node, and the merged node
    /// carries the union of the edges its frame has in either input. Recursion
    /// is the exception: a frame repeated below itself gets one node per
    /// depth, shared by both inputs. The roots are the merged nodes of input
    /// roots that stay parentless, sorted by frame.
    ///
    /// # Errors
    /// * `GraphError::CycleIntroduced` - one frame is an ancestor of another in
    ///   one input and a descendant of it in the other
    pub fn union(&self, other: &Graph) -> Result<Union, GraphError> {
        if let Some(pairs) = self.match_nodes(other) {
            let (graph, left) = self.copy();
            let right = pairs.iter().map(|(l, r)| (*r, left[l])).collect();
            debug!("Union of structurally equal graphs ({} nodes)", graph.len());
            return Ok(Union { graph, left, right });
        }

        let mut graph = Graph::new();
        let mut table: HashMap<Frame, Vec<NodeId>> = HashMap::new();
        let left = merge_into(&mut graph, &mut table, self);
        let right = merge_into(&mut graph, &mut table, other);

        let candidates = self
            .roots()
            .iter()
            .map(|r| left[r])
            .chain(other.roots().iter().map(|r| right[r]));
        for id in candidates {
            if graph.node(id).is_root() {
                graph.push_root(id);
            }
        }
        graph.sort_roots_by_frame();

        if let Some(id) = find_cycle(&graph) {
            return Err(GraphError::CycleIntroduced(graph.frame(id).to_string()));
        }

        debug!(
            "Union merged {} + {} nodes into {} ({} roots)",
            left.len(),
            right.len(),
            graph.len(),
            graph.roots().len()
        );
        debug_assert!(graph.check_invariants());
        Ok(Union { graph, left, right })
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.match_nodes(other).is_some()
    }
}

/// Lock-step walk over two graphs with one visited set per side
struct Matcher<'a> {
    left: &'a Graph,
    right: &'a Graph,
    visited_left: Vec<bool>,
    visited_right: Vec<bool>,
    pairs: HashMap<NodeId, NodeId>,
}

impl<'a> Matcher<'a> {
    fn new(left: &'a Graph, right: &'a Graph) -> Self {
        Self {
            left,
            right,
            visited_left: vec![false; left.arena_len()],
            visited_right: vec![false; right.arena_len()],
            pairs: HashMap::new(),
        }
    }

    fn walk(&mut self, l: NodeId, r: NodeId) -> bool {
        self.visited_left[l.index()] = true;
        self.visited_right[r.index()] = true;
        self.pairs.insert(l, r);

        let (left, right) = (self.left, self.right);
        if left.frame(l) != right.frame(r) || left.children(l).len() != right.children(r).len() {
            return false;
        }

        let left_children = sorted_by_frame(left, left.children(l));
        let right_children = sorted_by_frame(right, right.children(r));
        for (lc, rc) in left_children.into_iter().zip(right_children) {
            let seen_left = self.visited_left[lc.index()];
            let seen_right = self.visited_right[rc.index()];
            if seen_left != seen_right {
                return false;
            }
            if seen_left {
                // reconverging paths must reconverge on the same pair
                if self.pairs.get(&lc) != Some(&rc) {
                    return false;
                }
                continue;
            }
            if !self.walk(lc, rc) {
                return false;
            }
        }
        true
    }
}

fn sorted_by_frame(graph: &Graph, ids: &[NodeId]) -> Vec<NodeId> {
    let mut ids = ids.to_vec();
    ids.sort_by(|a, b| graph.frame(*a).cmp(graph.frame(*b)));
    ids
}

/// Fold `source` into `graph`, one node per distinct frame
///
/// A frame that repeats along one call path (recursion) gets a further node
/// for every level, so a node is never folded into one of its own ancestors.
fn merge_into(
    graph: &mut Graph,
    table: &mut HashMap<Frame, Vec<NodeId>>,
    source: &Graph,
) -> HashMap<NodeId, NodeId> {
    let roots = sorted_by_frame(source, source.roots());
    let order = topological_order(source, &roots);

    let mut mapping: HashMap<NodeId, NodeId> = HashMap::with_capacity(order.len());
    // merged nodes standing above each source node, over all of its paths
    let mut above: HashMap<NodeId, HashSet<NodeId>> = HashMap::with_capacity(order.len());
    for &id in &order {
        let mut ancestors = HashSet::new();
        for parent in source.parents(id) {
            if let (Some(&rep), Some(up)) = (mapping.get(parent), above.get(parent)) {
                ancestors.insert(rep);
                ancestors.extend(up.iter().copied());
            }
        }

        let frame = source.frame(id);
        let reps = table.entry(frame.clone()).or_default();
        let free = reps.iter().copied().find(|rep| !ancestors.contains(rep));
        let rep = match free {
            Some(rep) => rep,
            None => {
                let rep = graph.add_node(frame.clone());
                reps.push(rep);
                rep
            }
        };
        mapping.insert(id, rep);
        above.insert(id, ancestors);
    }

    for &id in &order {
        for child in sorted_by_frame(source, source.children(id)) {
            graph.add_edge(mapping[&id], mapping[&child]);
        }
    }
    mapping
}

/// Reachable nodes with every parent ahead of its children
///
/// Siblings are taken in frame order so the result does not depend on
/// child insertion order.
fn topological_order(graph: &Graph, roots: &[NodeId]) -> Vec<NodeId> {
    let reachable = graph.bfs_from(roots);
    let members: HashSet<NodeId> = reachable.iter().copied().collect();
    let mut pending: HashMap<NodeId, usize> = reachable
        .iter()
        .map(|&id| {
            let parents = graph.parents(id).iter().filter(|p| members.contains(p)).count();
            (id, parents)
        })
        .collect();

    let mut queue: VecDeque<NodeId> = roots
        .iter()
        .copied()
        .filter(|id| pending.get(id) == Some(&0))
        .collect();
    let mut order = Vec::with_capacity(reachable.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for child in sorted_by_frame(graph, graph.children(id)) {
            if let Some(count) = pending.get_mut(&child) {
                *count -= 1;
                if *count == 0 {
                    queue.push_back(child);
                }
            }
        }
    }
    order
}

/// Any node on a directed cycle, searching the whole arena
fn find_cycle(graph: &Graph) -> Option<NodeId> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    let mut marks = vec![Mark::New; graph.arena_len()];
    for start in 0..graph.arena_len() {
        if marks[start] != Mark::New {
            continue;
        }
        let mut stack: Vec<(NodeId, usize)> = vec![(NodeId(start), 0)];
        marks[start] = Mark::Active;

        while let Some((id, next)) = stack.last_mut() {
            let children = graph.children(*id);
            if *next < children.len() {
                let child = children[*next];
                *next += 1;
                match marks[child.index()] {
                    Mark::Active => return Some(child),
                    Mark::New => {
                        marks[child.index()] = Mark::Active;
                        stack.push((child, 0));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[id.index()] = Mark::Done;
                stack.pop();
            }
        }
    }
    None
}
