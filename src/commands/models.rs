//! Argument structs shared by main.rs and the command implementations.

use crate::flamegraph::FlamegraphConfig;
use crate::render::TreeOptions;
use crate::table::Aggregation;
use crate::utils::config::DEFAULT_METRIC;
use anyhow::Result;
use clap::ValueEnum;
use std::path::PathBuf;

/// Reduction used when secondary index levels are collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollapseMode {
    Sum,
    Mean,
    Min,
    Max,
}

impl From<CollapseMode> for Aggregation {
    fn from(mode: CollapseMode) -> Self {
        match mode {
            CollapseMode::Sum => Aggregation::Sum,
            CollapseMode::Mean => Aggregation::Mean,
            CollapseMode::Min => Aggregation::Min,
            CollapseMode::Max => Aggregation::Max,
        }
    }
}

/// Arguments for the squash command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct SquashArgs {
    /// Literal or snapshot input
    pub input: PathBuf,

    /// Keep only rows whose name starts with one of these prefixes
    pub keep: Vec<String>,

    /// Remove rows whose name starts with one of these prefixes
    pub drop: Vec<String>,

    /// Collapse secondary index levels before filtering
    pub collapse: Option<CollapseMode>,

    /// Where to write the squashed snapshot (stdout when absent)
    pub output: Option<PathBuf>,

    /// Also print the squashed tree
    pub print_tree: bool,

    pub metric: String,
}

impl Default for SquashArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            keep: Vec::new(),
            drop: Vec::new(),
            collapse: None,
            output: None,
            print_tree: false,
            metric: DEFAULT_METRIC.to_string(),
        }
    }
}

/// Arguments for the union command
#[derive(Debug, Clone)]
pub struct UnionArgs {
    pub left: PathBuf,
    pub right: PathBuf,

    /// Snapshot paths for the unified frames
    pub output_left: PathBuf,
    pub output_right: PathBuf,

    /// Write `right - left` over the shared graph to this path
    pub diff: Option<PathBuf>,
}

/// Output format of the render command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Tree,
    Dot,
    Flamegraph,
}

impl RenderFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RenderFormat::Tree => "txt",
            RenderFormat::Dot => "dot",
            RenderFormat::Flamegraph => "svg",
        }
    }
}

/// Arguments for the tree, dot and flamegraph commands
#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub input: PathBuf,
    pub format: RenderFormat,

    /// Write to this file instead of stdout
    pub output: Option<PathBuf>,

    pub tree: TreeOptions,
    pub flamegraph: FlamegraphConfig,
}

/// Validate squash arguments
///
/// **Public** - can be called before execute_squash for early validation
pub fn validate_squash_args(args: &SquashArgs) -> Result<()> {
    if args.keep.is_empty() && args.drop.is_empty() && args.collapse.is_none() {
        anyhow::bail!("Nothing to do: pass --keep, --drop or --collapse");
    }
    if args.keep.iter().chain(&args.drop).any(|p| p.is_empty()) {
        anyhow::bail!("Name prefixes cannot be empty");
    }
    if args.metric.is_empty() {
        anyhow::bail!("Metric name cannot be empty");
    }
    Ok(())
}

/// Validate render arguments
pub fn validate_render_args(args: &RenderArgs) -> Result<()> {
    if !(0.0..=1.0).contains(&args.tree.threshold) {
        anyhow::bail!("Threshold must be between 0 and 1");
    }
    if args.format == RenderFormat::Flamegraph && args.flamegraph.width < 100 {
        anyhow::bail!("Flamegraph width is too small (min 100)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_squash_args_requires_an_action() {
        let args = SquashArgs {
            input: PathBuf::from("profile.json"),
            ..Default::default()
        };
        assert!(validate_squash_args(&args).is_err());

        let args = SquashArgs {
            keep: vec!["Calc".to_string()],
            ..args
        };
        assert!(validate_squash_args(&args).is_ok());
    }

    #[test]
    fn test_validate_squash_args_rejects_empty_prefix() {
        let args = SquashArgs {
            drop: vec![String::new()],
            ..Default::default()
        };
        assert!(validate_squash_args(&args).is_err());
    }

    #[test]
    fn test_validate_render_args_threshold() {
        let args = RenderArgs {
            input: PathBuf::from("profile.json"),
            format: RenderFormat::Tree,
            output: None,
            tree: TreeOptions::new().with_threshold(1.5),
            flamegraph: FlamegraphConfig::default(),
        };
        assert!(validate_render_args(&args).is_err());
    }

    #[test]
    fn test_collapse_mode_maps_to_aggregation() {
        assert!(matches!(Aggregation::from(CollapseMode::Sum), Aggregation::Sum));
        assert!(matches!(Aggregation::from(CollapseMode::Max), Aggregation::Max));
    }
}
