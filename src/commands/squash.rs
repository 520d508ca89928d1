//! Squash command implementation.
//!
//! The squash command:
//! 1. Loads a literal or snapshot
//! 2. Optionally collapses secondary index levels
//! 3. Filters rows by name prefix
//! 4. Squashes the graph around the surviving rows
//! 5. Writes the resulting snapshot

use super::models::SquashArgs;
use crate::graphframe::GraphFrame;
use crate::output::{snapshot_to_string, write_snapshot};
use crate::reader::load_graphframe;
use crate::render::{render_tree, TreeOptions};
use crate::table::RowView;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the squash command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input cannot be read or is not a valid frame
/// * Squash fails (e.g. inclusive columns cannot be recomputed)
/// * Output cannot be written
pub fn execute_squash(args: SquashArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/4: Loading {}...", args.input.display());
    let mut gf = load_graphframe(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    debug!("Loaded {} nodes, {} rows", gf.graph().len(), gf.table().len());

    if let Some(mode) = args.collapse {
        info!("Step 2/4: Collapsing index levels ({:?})...", mode);
        gf.drop_index_levels(mode.into());
    } else {
        info!("Step 2/4: Keeping index levels");
    }

    info!("Step 3/4: Filtering and squashing...");
    let squashed = filter_by_prefix(&gf, &args.keep, &args.drop)
        .squash()
        .context("Failed to squash graph")?;
    info!(
        "Squashed {} nodes down to {}",
        gf.graph().len(),
        squashed.graph().len()
    );

    info!("Step 4/4: Writing output...");
    match &args.output {
        Some(path) => {
            write_snapshot(&squashed, path).context("Failed to write squashed snapshot")?;
            info!("✓ Snapshot written to: {}", path.display());
        }
        None => println!("{}", snapshot_to_string(&squashed)?),
    }

    if args.print_tree {
        println!(
            "{}",
            render_tree(&squashed, &TreeOptions::new().with_metric(&args.metric))
        );
    }

    info!(
        "Squash completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Keep rows matching a `keep` prefix (all rows if none given), then remove
/// rows matching a `drop` prefix
///
/// **Public** - exposed for tests
pub fn filter_by_prefix(gf: &GraphFrame, keep: &[String], drop: &[String]) -> GraphFrame {
    let starts_with_any = |row: &RowView<'_>, prefixes: &[String]| {
        row.name()
            .is_some_and(|name| prefixes.iter().any(|p| name.starts_with(p.as_str())))
    };
    gf.filter(|row| {
        (keep.is_empty() || starts_with_any(row, keep)) && !starts_with_any(row, drop)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::from_literal;
    use serde_json::json;

    #[test]
    fn test_filter_by_prefix_keep_and_drop() {
        let gf = from_literal(&json!({
            "name": "main",
            "metrics": {"time": 1.0},
            "children": [
                {"name": "CalcForce", "metrics": {"time": 2.0}},
                {"name": "CalcEnergy", "metrics": {"time": 3.0}},
                {"name": "MPI_Wait", "metrics": {"time": 4.0}}
            ]
        }))
        .unwrap();

        let kept = filter_by_prefix(&gf, &["Calc".to_string()], &[]);
        assert_eq!(kept.table().len(), 2);

        let dropped = filter_by_prefix(&gf, &[], &["MPI_".to_string()]);
        assert_eq!(dropped.table().len(), 3);

        let both = filter_by_prefix(&gf, &["Calc".to_string()], &["CalcE".to_string()]);
        assert_eq!(both.table().len(), 1);
    }
}
