use crate::output::read_snapshot;
use crate::utils::config::SNAPSHOT_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a snapshot JSON file
pub fn validate_snapshot_file(file_path: PathBuf) -> Result<()> {
    println!("Validating snapshot: {}", file_path.display());

    let gf = read_snapshot(&file_path)?;

    println!("✓ Valid snapshot JSON");
    println!("  Nodes: {}", gf.graph().len());
    println!("  Roots: {}", gf.graph().roots().len());
    println!("  Rows: {}", gf.table().len());
    println!("  Exclusive metrics: {}", gf.exc_metrics().join(", "));
    println!("  Inclusive metrics: {}", gf.inc_metrics().join(", "));
    if !gf.table().index_names().is_empty() {
        println!("  Index levels: {}", gf.table().index_names().join(", "));
    }

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Callpath Studio Snapshot Schema");
    println!("Current Version: {}", SNAPSHOT_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string     - ISO 8601 timestamp");
        println!("  exc_metrics: array       - Exclusive metric columns");
        println!("  inc_metrics: array       - Inclusive metric columns");
        println!("  index_names: array?      - Secondary index levels (e.g. 'rank')");
        println!("  columns: array           - Table column names, in order");
        println!("  roots: array             - Ids of root nodes");
        println!("  nodes: array             - Graph nodes in pre-order");
        println!("    id: number             - Node id");
        println!("    frame: object          - Frame attributes");
        println!("    key: array?            - Identity attributes (default: all)");
        println!("    children: array?       - Ids of child nodes");
        println!("  rows: array              - Table rows");
        println!("    node: number           - Node id");
        println!("    index: array?          - Secondary index values");
        println!("    values: array          - One value per column");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Callpath Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Snapshot Schema: v{}", SNAPSHOT_VERSION);
    println!();
    println!("Call-path graph algebra for hierarchical performance profiles.");
}
