//! Input readers that produce a GraphFrame.
//!
//! Two formats are accepted:
//! - nested JSON literals (see `literal.rs`)
//! - snapshots previously written by `output::write_snapshot`

pub mod literal;

pub use literal::from_literal;

use crate::graphframe::GraphFrame;
use crate::output::Snapshot;
use crate::utils::error::ReadError;
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a GraphFrame from a literal or snapshot JSON file
///
/// **Public** - used by every CLI command that takes an input profile
///
/// An object carrying both `version` and `nodes` is treated as a snapshot;
/// anything else is parsed as a literal.
///
/// # Errors
/// * `ReadError::Io` / `ReadError::Json` - file cannot be read or parsed
/// * `ReadError::Frame` - the literal is malformed
/// * `ReadError::InvalidSnapshot` - the snapshot is inconsistent
pub fn load_graphframe(path: impl AsRef<Path>) -> Result<GraphFrame, ReadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    if is_snapshot(&value) {
        debug!("{} looks like a snapshot", path.display());
        let snapshot: Snapshot = serde_json::from_value(value)?;
        snapshot.into_graphframe()
    } else {
        debug!("{} looks like a literal", path.display());
        Ok(from_literal(&value)?)
    }
}

fn is_snapshot(value: &serde_json::Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("version") && obj.contains_key("nodes"))
}
