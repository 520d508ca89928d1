//! Row-indexed metric table.
//!
//! Rows are keyed by a [`RowKey`] (node + secondary index values) and hold one
//! [`Value`] per column. Rows keep their insertion order; a hash index gives
//! O(1) lookup by key.

use super::aggregate::Aggregation;
use super::value::{RowKey, Value};
use crate::graph::NodeId;
use crate::utils::config::NAME_COLUMN;
use crate::utils::error::TableError;
use std::collections::{HashMap, HashSet};

/// One table row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: RowKey,
    pub values: Vec<Value>,
}

/// Metric table keyed by node and secondary index dimensions
///
/// **Public** - the tabular half of a GraphFrame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    index_names: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Row>,
    lookup: HashMap<RowKey, usize>,
}

/// Borrowed view of one row, handed to filter predicates
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    row: &'a Row,
}

impl<'a> RowView<'a> {
    pub fn key(&self) -> &'a RowKey {
        &self.row.key
    }

    pub fn node(&self) -> NodeId {
        self.row.key.node
    }

    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.table.column_index(column)?;
        self.row.values.get(idx)
    }

    pub fn metric(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    /// Value of a secondary index dimension such as `rank`
    pub fn index(&self, name: &str) -> Option<i64> {
        let pos = self.table.index_names.iter().position(|n| n == name)?;
        self.row.key.index.get(pos).copied()
    }

    /// The `name` column as a string
    pub fn name(&self) -> Option<&'a str> {
        self.get(NAME_COLUMN).and_then(Value::as_str)
    }
}

impl Table {
    /// Create an empty table
    ///
    /// # Arguments
    /// * `index_names` - secondary index dimensions (empty for node-only tables)
    /// * `columns` - column names, in order
    pub fn new(index_names: Vec<String>, columns: Vec<String>) -> Self {
        Self {
            index_names,
            columns,
            rows: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn views(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |row| RowView { table: self, row })
    }

    /// Append a row
    ///
    /// # Errors
    /// * `TableError::IndexArity` - key has the wrong number of secondary values
    /// * `TableError::ColumnCountMismatch` - one value per column is required
    /// * `TableError::DuplicateRow` - the key is already present
    pub fn push(&mut self, key: RowKey, values: Vec<Value>) -> Result<(), TableError> {
        if key.index.len() != self.index_names.len() {
            return Err(TableError::IndexArity {
                expected: self.index_names.len(),
                found: key.index.len(),
            });
        }
        if values.len() != self.columns.len() {
            return Err(TableError::ColumnCountMismatch {
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        if self.lookup.contains_key(&key) {
            return Err(TableError::DuplicateRow(key.to_string()));
        }
        self.lookup.insert(key.clone(), self.rows.len());
        self.rows.push(Row { key, values });
        Ok(())
    }

    pub fn row(&self, key: &RowKey) -> Option<&Row> {
        self.lookup.get(key).map(|&i| &self.rows[i])
    }

    pub fn view(&self, key: &RowKey) -> Option<RowView<'_>> {
        self.row(key).map(|row| RowView { table: self, row })
    }

    pub fn value(&self, key: &RowKey, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.row(key).and_then(|row| row.values.get(idx))
    }

    pub fn metric(&self, key: &RowKey, column: &str) -> Option<f64> {
        self.value(key, column).and_then(Value::as_f64)
    }

    /// Overwrite one cell
    pub fn set_value(&mut self, key: &RowKey, column: &str, value: Value) -> Result<(), TableError> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;
        let row = self
            .lookup
            .get(key)
            .ok_or_else(|| TableError::UnknownRow(key.to_string()))?;
        self.rows[*row].values[idx] = value;
        Ok(())
    }

    /// Append a column filled with `fill`; returns its position
    ///
    /// An existing column of the same name is reused untouched.
    pub fn add_column(&mut self, name: &str, fill: Value) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.values.push(fill.clone());
        }
        self.columns.len() - 1
    }

    /// Distinct nodes referenced by the rows, in first-seen order
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.key.node)
            .filter(|node| seen.insert(*node))
            .collect()
    }

    /// Rows for which `predicate` holds, order preserved
    pub fn filter(&self, mut predicate: impl FnMut(&RowView<'_>) -> bool) -> Table {
        let mut table = Table::new(self.index_names.clone(), self.columns.clone());
        for view in self.views() {
            if predicate(&view) {
                table.lookup.insert(view.row.key.clone(), table.rows.len());
                table.rows.push(view.row.clone());
            }
        }
        table
    }

    /// Re-key every row and merge rows whose new keys collide
    ///
    /// **Public** - shared by squash, unify and drop_index_levels
    ///
    /// # Arguments
    /// * `index_names` - secondary dimensions of the result
    /// * `rekey` - new key for a row, or `None` to drop the row
    /// * `aggregation` - reduction for a column, `None` means "first value seen"
    ///
    /// Groups keep the order in which their first row appears.
    pub fn regroup(
        &self,
        index_names: Vec<String>,
        mut rekey: impl FnMut(&RowKey) -> Option<RowKey>,
        aggregation: impl Fn(&str) -> Option<Aggregation>,
    ) -> Table {
        let mut groups: Vec<(RowKey, Vec<&Row>)> = Vec::new();
        let mut slot: HashMap<RowKey, usize> = HashMap::new();
        for row in &self.rows {
            let Some(key) = rekey(&row.key) else {
                continue;
            };
            match slot.get(&key) {
                Some(&i) => groups[i].1.push(row),
                None => {
                    slot.insert(key.clone(), groups.len());
                    groups.push((key, vec![row]));
                }
            }
        }

        let reducers: Vec<Option<Aggregation>> =
            self.columns.iter().map(|c| aggregation(c)).collect();

        let mut table = Table::new(index_names, self.columns.clone());
        for (key, members) in groups {
            let values = reducers
                .iter()
                .enumerate()
                .map(|(col, reducer)| reduce(&members, col, reducer.as_ref()))
                .collect();
            table.lookup.insert(key.clone(), table.rows.len());
            table.rows.push(Row { key, values });
        }
        table
    }
}

fn reduce(members: &[&Row], col: usize, reducer: Option<&Aggregation>) -> Value {
    let first = members[0].values[col].clone();
    let Some(reducer) = reducer else {
        return first;
    };
    let numbers: Vec<f64> = members
        .iter()
        .filter_map(|row| row.values[col].as_f64())
        .collect();
    if numbers.is_empty() {
        return first;
    }
    Value::Float(reducer.apply(&numbers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: usize) -> NodeId {
        NodeId(i)
    }

    fn ranked_table() -> Table {
        let mut table = Table::new(
            vec!["rank".to_string()],
            vec!["name".to_string(), "time".to_string()],
        );
        for rank in 0..3 {
            table
                .push(
                    RowKey::new(node(0), vec![rank]),
                    vec![Value::from("main"), Value::from(rank as f64 + 1.0)],
                )
                .unwrap();
        }
        table
            .push(
                RowKey::new(node(1), vec![0]),
                vec![Value::from("solve"), Value::from(10.0)],
            )
            .unwrap();
        table
    }

    #[test]
    fn test_push_validates_shape() {
        let mut table = ranked_table();
        let arity = table.push(RowKey::node(node(2)), vec![Value::Null, Value::Null]);
        assert!(matches!(arity, Err(TableError::IndexArity { .. })));

        let columns = table.push(RowKey::new(node(2), vec![0]), vec![Value::Null]);
        assert!(matches!(columns, Err(TableError::ColumnCountMismatch { .. })));

        let duplicate = table.push(
            RowKey::new(node(1), vec![0]),
            vec![Value::Null, Value::Null],
        );
        assert!(matches!(duplicate, Err(TableError::DuplicateRow(_))));
    }

    #[test]
    fn test_filter_and_lookup() {
        let table = ranked_table();
        let filtered = table.filter(|row| row.index("rank") == Some(0));
        assert_eq!(filtered.len(), 2);
        assert_eq!(
            filtered.metric(&RowKey::new(node(1), vec![0]), "time"),
            Some(10.0)
        );
        assert!(filtered.row(&RowKey::new(node(0), vec![1])).is_none());
    }

    #[test]
    fn test_regroup_sums_metrics_and_keeps_first_label() {
        let table = ranked_table();
        let grouped = table.regroup(
            Vec::new(),
            |key| Some(RowKey::node(key.node)),
            |col| (col == "time").then_some(Aggregation::Sum),
        );
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.metric(&RowKey::node(node(0)), "time"), Some(6.0));
        assert_eq!(
            grouped.value(&RowKey::node(node(0)), "name"),
            Some(&Value::from("main"))
        );
    }

    #[test]
    fn test_add_column_and_set_value() {
        let mut table = ranked_table();
        let idx = table.add_column("time (inc)", Value::Float(0.0));
        assert_eq!(idx, 2);
        let key = RowKey::new(node(1), vec![0]);
        table.set_value(&key, "time (inc)", Value::Float(3.5)).unwrap();
        assert_eq!(table.metric(&key, "time (inc)"), Some(3.5));
        assert!(table.set_value(&key, "missing", Value::Null).is_err());
    }
}
