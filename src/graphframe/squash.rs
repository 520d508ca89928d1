//! Squash: rebuild the graph around the nodes that survived a filter.
//!
//! Every retained node is connected directly to its nearest retained
//! descendants, skipping over any chain of removed nodes. Retained descendants
//! reached from one clone that share a frame collapse into a single child, and
//! their rows are summed.

use super::{rebase_rows, GraphFrame};
use crate::graph::{Frame, Graph, NodeId};
use crate::table::Aggregation;
use crate::utils::error::GraphFrameError;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

impl GraphFrame {
    /// Compact the graph to the nodes still present in the table
    ///
    /// **Public** - usually called right after [`GraphFrame::filter`]
    ///
    /// # Returns
    /// A new frame with a rewired graph, rows re-pointed at the new nodes and
    /// merged by sum, and inclusive columns recomputed. An unfiltered frame
    /// yields a plain copy.
    ///
    /// # Algorithm
    /// 1. Retained roots are cloned; removed roots promote their nearest
    ///    retained descendants to roots
    /// 2. Each clone gets one child per distinct frame among the nearest retained
    ///    descendants of its original, recursively. A descendant reached again
    ///    is linked to its existing clone, unless that clone is already above
    ///    this one; it then gets a row-less duplicate so the graph stays acyclic
    /// 3. Rows are re-keyed to the clones; colliding rows sum their metrics and
    ///    keep the first value of other columns
    /// 4. Inclusive metrics are recomputed over the new topology
    ///
    /// Subtrees with no retained node are dropped entirely.
    pub fn squash(&self) -> Result<GraphFrame, GraphFrameError> {
        let retained: HashSet<NodeId> = self.table.nodes().into_iter().collect();
        let graph_size = self.graph.len();
        if retained.len() == graph_size {
            debug!("Squash on an unfiltered frame ({} nodes), copying", graph_size);
            return Ok(self.copy());
        }

        let mut rewire = Rewire::new(&self.graph, &retained);
        for &root in self.graph.roots() {
            if retained.contains(&root) {
                rewire.place_root(root);
            } else {
                for descendant in rewire.nearest_retained(root) {
                    rewire.place_root(descendant);
                }
            }
        }
        let Rewire {
            mut graph, clones, ..
        } = rewire;
        graph.retain_roots(|node| node.is_root());
        debug_assert!(graph.check_invariants());

        let unplaced = retained.iter().filter(|n| !clones.contains_key(n)).count();
        if unplaced > 0 {
            warn!("Squash dropped rows of {} nodes unreachable from any root", unplaced);
        }

        let metrics: HashSet<&str> = self.metrics().collect();
        let table = rebase_rows(&self.table, &clones, |col| {
            metrics.contains(col).then_some(Aggregation::Sum)
        });

        debug!(
            "Squashed {} nodes down to {} ({} rows)",
            graph_size,
            graph.len(),
            table.len()
        );

        let mut squashed = GraphFrame {
            graph: Arc::new(graph),
            table,
            exc_metrics: self.exc_metrics.clone(),
            inc_metrics: self.inc_metrics.clone(),
        };
        squashed.update_inclusive_columns()?;
        Ok(squashed)
    }
}

/// Working state of one squash
struct Rewire<'a> {
    source: &'a Graph,
    retained: &'a HashSet<NodeId>,
    graph: Graph,
    // original node -> its clone
    clones: HashMap<NodeId, NodeId>,
    roots_by_frame: HashMap<Frame, NodeId>,
}

impl<'a> Rewire<'a> {
    fn new(source: &'a Graph, retained: &'a HashSet<NodeId>) -> Self {
        Self {
            source,
            retained,
            graph: Graph::new(),
            clones: HashMap::new(),
            roots_by_frame: HashMap::new(),
        }
    }

    /// Nearest retained descendants of `node`, in depth-first sibling order
    fn nearest_retained(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeId> = self.source.children(node).iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if self.retained.contains(&id) {
                found.push(id);
            } else {
                stack.extend(self.source.children(id).iter().rev());
            }
        }
        found
    }

    /// Clone `node` as a root unless it was already placed
    fn place_root(&mut self, node: NodeId) {
        if self.clones.contains_key(&node) {
            return;
        }
        let source = self.source;
        let frame = source.frame(node);
        let clone = match self.roots_by_frame.get(frame) {
            Some(&clone) => clone,
            None => {
                let clone = self.graph.add_root(frame.clone());
                self.roots_by_frame.insert(frame.clone(), clone);
                clone
            }
        };
        self.clones.insert(node, clone);
        self.descend(node, clone);
    }

    fn descend(&mut self, node: NodeId, clone: NodeId) {
        let source = self.source;
        let mut by_frame: HashMap<Frame, NodeId> = self
            .graph
            .children(clone)
            .iter()
            .map(|&c| (self.graph.frame(c).clone(), c))
            .collect();

        for descendant in self.nearest_retained(node) {
            let frame = source.frame(descendant);
            let placed = self.clones.get(&descendant).copied();

            if let Some(&child) = by_frame.get(frame) {
                if placed.is_none() {
                    self.clones.insert(descendant, child);
                    self.descend(descendant, child);
                }
                continue;
            }

            let child = match placed {
                // reached again through another retained ancestor
                Some(existing) if !self.graph.reaches(existing, clone) => {
                    self.graph.add_edge(clone, existing);
                    existing
                }
                // an edge to `existing` would close a cycle through a merged frame
                Some(_) => {
                    let child = self.graph.add_child(clone, frame.clone());
                    self.descend(descendant, child);
                    child
                }
                None => {
                    let child = self.graph.add_child(clone, frame.clone());
                    self.clones.insert(descendant, child);
                    self.descend(descendant, child);
                    child
                }
            };
            by_frame.insert(frame.clone(), child);
        }
    }
}
