//! Render command implementation (tree, dot and flamegraph output).

use super::models::{RenderArgs, RenderFormat};
use crate::flamegraph::generate_flamegraph;
use crate::output::write_text;
use crate::reader::load_graphframe;
use crate::render::{render_dot, render_tree, DotOptions};
use anyhow::{Context, Result};
use log::{debug, info};

/// Execute the tree, dot or flamegraph command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input cannot be read
/// * The flamegraph metric is missing or all-zero
/// * Output cannot be written
pub fn execute_render(args: RenderArgs) -> Result<()> {
    let gf = load_graphframe(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    debug!(
        "Rendering {} nodes as {:?}",
        gf.graph().len(),
        args.format
    );

    let content = match args.format {
        RenderFormat::Tree => render_tree(&gf, &args.tree),
        RenderFormat::Dot => render_dot(
            &gf,
            &DotOptions {
                metric: args.tree.metric.clone(),
                name_column: args.tree.name_column.clone(),
                index: args.tree.index.clone(),
                precision: args.tree.precision,
                ..DotOptions::default()
            },
        ),
        RenderFormat::Flamegraph => {
            generate_flamegraph(&gf, &args.tree.metric, Some(&args.flamegraph))
                .context("Failed to generate flamegraph")?
        }
    };

    match &args.output {
        Some(path) => {
            write_text(&content, path, args.format.extension())
                .context("Failed to write output")?;
            info!("✓ Output written to: {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flamegraph::FlamegraphConfig;
    use crate::render::TreeOptions;
    use serde_json::json;

    fn args(dir: &std::path::Path, format: RenderFormat) -> RenderArgs {
        let input = dir.join("profile.json");
        let literal = json!({"name": "main", "metrics": {"time": 1.0},
                             "children": [{"name": "solve", "metrics": {"time": 5.0}}]});
        std::fs::write(&input, literal.to_string()).unwrap();
        RenderArgs {
            input,
            format,
            output: Some(dir.join(format!("out.{}", format.extension()))),
            tree: TreeOptions::default().with_metric("time"),
            flamegraph: FlamegraphConfig::default().with_title("Profile"),
        }
    }

    #[test]
    fn test_execute_render_dot_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), RenderFormat::Dot);
        let output = args.output.clone().unwrap();
        execute_render(args).unwrap();

        let dot = std::fs::read_to_string(output).unwrap();
        assert!(dot.starts_with("strict digraph"));
        assert!(dot.contains("solve"));
    }

    #[test]
    fn test_execute_render_flamegraph_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), RenderFormat::Flamegraph);
        let output = args.output.clone().unwrap();
        execute_render(args).unwrap();

        let svg = std::fs::read_to_string(output).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Profile"));
    }
}
