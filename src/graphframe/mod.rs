//! GraphFrame: a call-path graph coupled with its metric table.
//!
//! This module handles:
//! - Construction from reader output (graph, table, metric lists)
//! - Copy and row filtering
//! - Squash (rewiring the graph around filtered rows), see `squash.rs`
//! - Inclusive-metric recomputation and index collapsing, see `columns.rs`
//! - Unification of two frames onto one merged graph, and metric arithmetic

mod columns;
mod squash;

use crate::graph::{Graph, NodeId, TraversalOrder};
use crate::table::{Aggregation, RowKey, RowView, Table, Value};
use crate::utils::error::GraphFrameError;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A graph plus a row-indexed metric table
///
/// **Public** - main type of the library
///
/// The graph sits behind an `Arc` so that `filter` can share it; graphs are
/// never mutated once wrapped; every structural operation builds a new one.
#[derive(Debug, Clone)]
pub struct GraphFrame {
    graph: Arc<Graph>,
    table: Table,
    exc_metrics: Vec<String>,
    inc_metrics: Vec<String>,
}

impl GraphFrame {
    /// Wrap reader output
    ///
    /// # Errors
    /// * `GraphFrameError::ForeignNode` - a row points at a node not reachable in `graph`
    /// * `GraphFrameError::UnknownMetric` - a declared metric has no table column
    pub fn from_parts(
        graph: Graph,
        table: Table,
        exc_metrics: Vec<String>,
        inc_metrics: Vec<String>,
    ) -> Result<Self, GraphFrameError> {
        Self::from_shared(Arc::new(graph), table, exc_metrics, inc_metrics)
    }

    /// Like [`GraphFrame::from_parts`], reusing an already shared graph
    pub fn from_shared(
        graph: Arc<Graph>,
        table: Table,
        exc_metrics: Vec<String>,
        inc_metrics: Vec<String>,
    ) -> Result<Self, GraphFrameError> {
        let gf = Self {
            graph,
            table,
            exc_metrics,
            inc_metrics,
        };
        gf.validate()?;
        Ok(gf)
    }

    fn validate(&self) -> Result<(), GraphFrameError> {
        let reachable: HashSet<NodeId> = self.graph.traverse(TraversalOrder::Pre).collect();
        if let Some(row) = self
            .table
            .rows()
            .iter()
            .find(|row| !reachable.contains(&row.key.node))
        {
            return Err(GraphFrameError::ForeignNode(row.key.node));
        }
        if let Some(metric) = self
            .metrics()
            .find(|metric| !self.table.has_column(metric))
        {
            return Err(GraphFrameError::UnknownMetric(metric.to_string()));
        }
        Ok(())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn shared_graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn exc_metrics(&self) -> &[String] {
        &self.exc_metrics
    }

    pub fn inc_metrics(&self) -> &[String] {
        &self.inc_metrics
    }

    /// Exclusive then inclusive metric names
    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.exc_metrics
            .iter()
            .chain(self.inc_metrics.iter())
            .map(String::as_str)
    }

    /// Deep copy: a cloned graph and a table re-pointed at the clones
    pub fn copy(&self) -> GraphFrame {
        let (graph, clones) = self.graph.copy();
        let table = rebase_rows(&self.table, &clones, |_| None);
        GraphFrame {
            graph: Arc::new(graph),
            table,
            exc_metrics: self.exc_metrics.clone(),
            inc_metrics: self.inc_metrics.clone(),
        }
    }

    /// Keep the rows satisfying `predicate`
    ///
    /// The result shares this frame's graph; only the table shrinks.
    ///
    /// # Example
    /// ```ignore
    /// let calc = gf.filter(|row| row.name().is_some_and(|n| n.starts_with("Calc")));
    /// ```
    pub fn filter(&self, predicate: impl FnMut(&RowView<'_>) -> bool) -> GraphFrame {
        let table = self.table.filter(predicate);
        debug!("Filter kept {} of {} rows", table.len(), self.table.len());
        GraphFrame {
            graph: Arc::clone(&self.graph),
            table,
            exc_metrics: self.exc_metrics.clone(),
            inc_metrics: self.inc_metrics.clone(),
        }
    }

    /// Merge both graphs and point both tables at the single merged graph
    ///
    /// **Public** - prerequisite for comparing two profiles row by row
    ///
    /// Rows whose nodes fold into one merged node are summed (metrics) or keep
    /// their first value (other columns). Afterwards both frames hold the same
    /// `Arc<Graph>`.
    pub fn unify(&mut self, other: &mut GraphFrame) -> Result<(), GraphFrameError> {
        if Arc::ptr_eq(&self.graph, &other.graph) {
            return Ok(());
        }

        let union = self.graph.union(&other.graph)?;
        let graph = Arc::new(union.graph);

        let own_metrics: HashSet<String> = self.metrics().map(str::to_string).collect();
        self.table = rebase_rows(&self.table, &union.left, |col| {
            own_metrics.contains(col).then_some(Aggregation::Sum)
        });
        let other_metrics: HashSet<String> = other.metrics().map(str::to_string).collect();
        other.table = rebase_rows(&other.table, &union.right, |col| {
            other_metrics.contains(col).then_some(Aggregation::Sum)
        });

        debug!("Unified frames onto a graph of {} nodes", graph.len());
        self.graph = Arc::clone(&graph);
        other.graph = graph;
        Ok(())
    }

    /// Row-wise sum of every metric column with a structurally equal frame
    pub fn add_metrics(&self, other: &GraphFrame) -> Result<GraphFrame, GraphFrameError> {
        self.combine_metrics(other, |a, b| a + b)
    }

    /// Row-wise difference of every metric column with a structurally equal frame
    pub fn sub_metrics(&self, other: &GraphFrame) -> Result<GraphFrame, GraphFrameError> {
        self.combine_metrics(other, |a, b| a - b)
    }

    fn combine_metrics(
        &self,
        other: &GraphFrame,
        op: fn(f64, f64) -> f64,
    ) -> Result<GraphFrame, GraphFrameError> {
        let pairs: HashMap<NodeId, NodeId> = if Arc::ptr_eq(&self.graph, &other.graph) {
            self.table.nodes().into_iter().map(|n| (n, n)).collect()
        } else {
            self.graph
                .match_nodes(&other.graph)
                .ok_or(GraphFrameError::GraphMismatch)?
        };

        let mut result = self.clone();
        let metrics: Vec<String> = self.metrics().map(str::to_string).collect();
        for metric in &metrics {
            if !other.table.has_column(metric) {
                return Err(GraphFrameError::UnknownMetric(metric.clone()));
            }
        }

        for row in self.table.rows() {
            let Some(&other_node) = pairs.get(&row.key.node) else {
                continue;
            };
            let other_key = RowKey::new(other_node, row.key.index.clone());
            for metric in &metrics {
                let (Some(mine), Some(theirs)) = (
                    self.table.metric(&row.key, metric),
                    other.table.metric(&other_key, metric),
                ) else {
                    continue;
                };
                result
                    .table
                    .set_value(&row.key, metric, Value::Float(op(mine, theirs)))?;
            }
        }
        Ok(result)
    }
}

/// Re-point rows through `mapping` and merge rows that land on the same key
fn rebase_rows(
    table: &Table,
    mapping: &HashMap<NodeId, NodeId>,
    aggregation: impl Fn(&str) -> Option<Aggregation>,
) -> Table {
    table.regroup(
        table.index_names().to_vec(),
        |key| {
            mapping
                .get(&key.node)
                .map(|node| RowKey::new(*node, key.index.clone()))
        },
        aggregation,
    )
}
