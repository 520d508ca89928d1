//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::graph::NodeId;
use thiserror::Error;

/// Errors raised by graph construction and graph algebra
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {node} has more than one path from a root; use paths() instead")]
    MultiplePaths { node: NodeId },

    #[error("Invalid graph literal: {0}")]
    InvalidLiteral(String),

    #[error("Merging would introduce a cycle through frame {0}")]
    CycleIntroduced(String),
}

/// Errors raised while building or editing a metric table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Row has {found} values but the table has {expected} columns")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("Row index has {found} secondary values but the table declares {expected}")]
    IndexArity { expected: usize, found: usize },

    #[error("Duplicate row for {0}")]
    DuplicateRow(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("No row for {0}")]
    UnknownRow(String),
}

/// Errors raised by GraphFrame operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphFrameError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Table row references node {0} which is not part of the graph")]
    ForeignNode(NodeId),

    #[error("Metric column not present in table: {0}")]
    UnknownMetric(String),

    #[error("Graphs are not structurally equal")]
    GraphMismatch,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading a literal or snapshot file
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Frame(#[from] GraphFrameError),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlamegraphError {
    #[error("Graph has nothing to draw for metric {0}")]
    EmptyGraph(String),

    #[error("Metric column not present in table: {0}")]
    UnknownMetric(String),
}
