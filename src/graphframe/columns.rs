//! Derived columns and index collapsing.

use super::GraphFrame;
use crate::graph::{NodeId, TraversalOrder};
use crate::table::{Aggregation, RowKey, Value};
use crate::utils::config::inclusive_name;
use crate::utils::error::GraphFrameError;
use log::debug;
use std::collections::{BTreeSet, HashMap, HashSet};

impl GraphFrame {
    /// Recompute `<metric> (inc)` for every exclusive metric
    ///
    /// **Public** - required after any operation that rewires the graph
    ///
    /// Walks the graph in post-order, so each node sees its children's inclusive
    /// values first: `inc(node) = exc(node) + sum(inc(child))`. The sum runs
    /// separately for every secondary index tuple (rank, thread, ...). Nodes
    /// without a row count as zero exclusive time but still pass up their
    /// descendants' totals.
    ///
    /// # Errors
    /// * `GraphFrameError::UnknownMetric` - an exclusive metric has no column
    pub fn update_inclusive_columns(&mut self) -> Result<(), GraphFrameError> {
        let tuples: Vec<Vec<i64>> = self
            .table
            .rows()
            .iter()
            .map(|row| row.key.index.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let order: Vec<NodeId> = self.graph.traverse(TraversalOrder::Post).collect();

        for metric in self.exc_metrics.clone() {
            if !self.table.has_column(&metric) {
                return Err(GraphFrameError::UnknownMetric(metric));
            }
            let inc_column = inclusive_name(&metric);

            let mut inclusive: HashMap<NodeId, Vec<f64>> = HashMap::with_capacity(order.len());
            for &node in &order {
                let mut totals: Vec<f64> = tuples
                    .iter()
                    .map(|index| {
                        self.table
                            .metric(&RowKey::new(node, index.clone()), &metric)
                            .unwrap_or(0.0)
                    })
                    .collect();
                for child in self.graph.children(node) {
                    if let Some(child_totals) = inclusive.get(child) {
                        for (total, add) in totals.iter_mut().zip(child_totals) {
                            *total += add;
                        }
                    }
                }
                inclusive.insert(node, totals);
            }

            self.table.add_column(&inc_column, Value::Null);
            let keys: Vec<RowKey> = self.table.rows().iter().map(|r| r.key.clone()).collect();
            for key in keys {
                let Some(totals) = inclusive.get(&key.node) else {
                    continue;
                };
                let Ok(pos) = tuples.binary_search(&key.index) else {
                    continue;
                };
                self.table.set_value(&key, &inc_column, Value::Float(totals[pos]))?;
            }

            if !self.inc_metrics.contains(&inc_column) {
                self.inc_metrics.push(inc_column);
            }
        }

        debug!(
            "Recomputed {} inclusive metrics over {} nodes",
            self.exc_metrics.len(),
            order.len()
        );
        Ok(())
    }

    /// Collapse every secondary index dimension down to one row per node
    ///
    /// **Public** - e.g. average a per-rank profile
    ///
    /// # Arguments
    /// * `aggregation` - reduction for metric columns (`Aggregation::Mean` by default);
    ///   other columns keep their first value
    ///
    /// The graph is untouched.
    pub fn drop_index_levels(&mut self, aggregation: Aggregation) {
        let metrics: HashSet<&str> = self.metrics().collect();
        let table = self.table.regroup(
            Vec::new(),
            |key| Some(RowKey::node(key.node)),
            |col| metrics.contains(col).then_some(aggregation),
        );
        debug!(
            "Dropped index levels {:?}: {} rows -> {}",
            self.table.index_names(),
            self.table.len(),
            table.len()
        );
        self.table = table;
    }
}
