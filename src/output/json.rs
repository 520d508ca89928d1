//! JSON snapshot writer and reader.
//!
//! Writes GraphFrame snapshots to JSON files with pretty formatting, and
//! loads them back.

use super::schema::Snapshot;
use super::validate_output_path;
use crate::graphframe::GraphFrame;
use crate::utils::error::{OutputError, ReadError};
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a GraphFrame snapshot to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `gf` - frame to persist
/// * `output_path` - path to output JSON file (parent directories are created)
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - path is empty, a directory, or cannot be created
///
/// # Example
/// ```ignore
/// let squashed = gf.filter(|row| row.name() != Some("MPI_Wait")).squash()?;
/// write_snapshot(&squashed, "squashed.json")?;
/// ```
pub fn write_snapshot(gf: &GraphFrame, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing snapshot to: {}", output_path.display());
    validate_output_path(output_path)?;

    let snapshot = Snapshot::from_graphframe(gf);
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &snapshot)?;

    info!(
        "Snapshot written successfully ({} nodes, {} rows, {} bytes)",
        snapshot.nodes.len(),
        snapshot.rows.len(),
        calculate_file_size(output_path)
    );
    Ok(())
}

/// Serialize a snapshot to a string (for tests and piping to stdout)
pub fn snapshot_to_string(gf: &GraphFrame) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(&Snapshot::from_graphframe(gf))?)
}

/// Read a GraphFrame snapshot from a JSON file
///
/// **Public** - used by validate and by the loader for snapshot inputs
///
/// # Errors
/// * `ReadError::Io` - file read error
/// * `ReadError::Json` - JSON parse error
/// * `ReadError::InvalidSnapshot` / `ReadError::Frame` - content does not describe a valid frame
pub fn read_snapshot(input_path: impl AsRef<Path>) -> Result<GraphFrame, ReadError> {
    let input_path = input_path.as_ref();
    debug!("Reading snapshot from: {}", input_path.display());

    let file = File::open(input_path)?;
    let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
    debug!(
        "Snapshot loaded: version {}, {} nodes, generated at {}",
        snapshot.version,
        snapshot.nodes.len(),
        snapshot.generated_at
    );
    snapshot.into_graphframe()
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::from_literal;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn create_test_frame() -> GraphFrame {
        from_literal(&json!({
            "name": "main",
            "metrics": {"time": 1.0, "time (inc)": 4.0},
            "children": [
                {"name": "solve", "metrics": {"time": 3.0, "time (inc)": 3.0}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_write_and_read_snapshot() {
        let gf = create_test_frame();
        let temp_file = NamedTempFile::new().unwrap();

        write_snapshot(&gf, temp_file.path()).unwrap();
        let loaded = read_snapshot(temp_file.path()).unwrap();

        assert_eq!(loaded.graph(), gf.graph());
        assert_eq!(loaded.table().columns(), gf.table().columns());
        assert_eq!(loaded.inc_metrics(), gf.inc_metrics());
    }

    #[test]
    fn test_snapshot_to_string_contains_version() {
        let text = snapshot_to_string(&create_test_frame()).unwrap();
        assert!(text.contains("\"version\": \"1.0.0\""));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/frame.json");

        write_snapshot(&create_test_frame(), &nested_path).unwrap();
        assert!(nested_path.exists());
    }

    #[test]
    fn test_read_rejects_garbage() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "{not json").unwrap();
        assert!(matches!(read_snapshot(temp_file.path()), Err(ReadError::Json(_))));
    }
}
