//! Output writers for snapshots and rendered views.
//!
//! This module handles writing data to disk in various formats:
//! - JSON snapshots of a GraphFrame (and reading them back)
//! - Text outputs: terminal trees, DOT graphs, SVG flamegraphs

pub mod json;
pub mod schema;
pub mod text;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

pub use json::{read_snapshot, snapshot_to_string, write_snapshot};
pub use schema::{Snapshot, SnapshotNode, SnapshotRow};
pub use text::write_text;

/// Validate that an output path is writable, creating missing parent directories
///
/// **Private** - shared by every writer
pub(crate) fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}
