//! Configuration and constants for the library and CLI.

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Suffix appended to an exclusive metric to name its inclusive column
pub const INCLUSIVE_SUFFIX: &str = " (inc)";

// Literal metric names containing this marker are inclusive
pub const INCLUSIVE_MARKER: &str = "(inc)";

/// Column holding the display name of a node
pub const NAME_COLUMN: &str = "name";

/// Frame attribute used for identity by literal builders
pub const NAME_ATTR: &str = "name";

/// `type` attribute given to frames built from nested lists
pub const TYPE_ATTR: &str = "type";
pub const DEFAULT_FRAME_TYPE: &str = "None";

// Rendering defaults
pub const DEFAULT_METRIC: &str = "time";
pub const DEFAULT_CONTEXT_COLUMN: &str = "file";
pub const DEFAULT_PRECISION: usize = 3;
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// Returns the inclusive column name for an exclusive metric
pub fn inclusive_name(metric: &str) -> String {
    format!("{}{}", metric, INCLUSIVE_SUFFIX)
}
