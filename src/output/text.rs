//! Plain-text output writer for rendered trees, DOT graphs and SVG flamegraphs.

use super::validate_output_path;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write rendered content to a file
///
/// **Public** - shared by the tree, dot and flamegraph commands
///
/// # Arguments
/// * `content` - rendered text
/// * `output_path` - destination; parent directories are created
/// * `extension` - expected file extension, only checked to warn
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - path is empty or a directory
pub fn write_text(
    content: &str,
    output_path: impl AsRef<Path>,
    extension: &str,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing {} output to: {}", extension, output_path.display());

    validate_output_path(output_path)?;
    if output_path.extension().is_some_and(|ext| ext != extension) {
        debug!(
            "Warning: File does not have .{} extension: {}",
            extension,
            output_path.display()
        );
    }

    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;

    info!(
        "Output written successfully ({} bytes, {:.2} KB)",
        content.len(),
        content.len() as f64 / 1024.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const DOT: &str = "strict digraph {\n}\n";

    #[test]
    fn test_write_text_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        write_text(DOT, temp_file.path(), "dot").unwrap();
        assert_eq!(std::fs::read_to_string(temp_file.path()).unwrap(), DOT);
    }

    #[test]
    fn test_write_text_rejects_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(write_text(DOT, temp_dir.path(), "dot").is_err());
    }
}
