//! Union command implementation.
//!
//! Loads two profiles, merges their graphs, re-points both tables at the
//! merged graph and writes both unified snapshots. With `--diff`, the
//! row-wise difference `right - left` is written as well.

use super::models::UnionArgs;
use crate::output::write_snapshot;
use crate::reader::load_graphframe;
use anyhow::{Context, Result};
use log::info;

/// Execute the union command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Either input cannot be read
/// * The merge would introduce a cycle
/// * Output cannot be written
pub fn execute_union(args: UnionArgs) -> Result<()> {
    info!("Step 1/3: Loading inputs...");
    let mut left = load_graphframe(&args.left)
        .with_context(|| format!("Failed to load {}", args.left.display()))?;
    let mut right = load_graphframe(&args.right)
        .with_context(|| format!("Failed to load {}", args.right.display()))?;

    info!(
        "Step 2/3: Unifying graphs ({} + {} nodes)...",
        left.graph().len(),
        right.graph().len()
    );
    left.unify(&mut right).context("Failed to unify graphs")?;
    info!("Unified graph has {} nodes", left.graph().len());

    info!("Step 3/3: Writing output files...");
    write_snapshot(&left, &args.output_left).context("Failed to write left snapshot")?;
    info!("✓ Left snapshot written to: {}", args.output_left.display());
    write_snapshot(&right, &args.output_right).context("Failed to write right snapshot")?;
    info!("✓ Right snapshot written to: {}", args.output_right.display());

    if let Some(diff_path) = &args.diff {
        let diff = right
            .sub_metrics(&left)
            .context("Failed to subtract metrics")?;
        write_snapshot(&diff, diff_path).context("Failed to write diff snapshot")?;
        info!("✓ Diff snapshot written to: {}", diff_path.display());
    }
    Ok(())
}
