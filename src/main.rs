//! Callpath Studio CLI
//!
//! Inspect and transform hierarchical call-path profiles: render trees,
//! squash filtered graphs, merge two profiles and draw flamegraphs.

use anyhow::Result;
use callpath_studio::commands::{
    display_schema, display_version, execute_render, execute_squash, execute_union,
    validate_render_args, validate_snapshot_file, validate_squash_args, CollapseMode, RenderArgs,
    RenderFormat, SquashArgs, UnionArgs,
};
use callpath_studio::flamegraph::FlamegraphConfig;
use callpath_studio::render::TreeOptions;
use callpath_studio::utils::config::{DEFAULT_METRIC, DEFAULT_PRECISION, NAME_COLUMN};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Callpath Studio - graph algebra for call-path profiles
#[derive(Parser, Debug)]
#[command(name = "callpath")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by the rendering commands
#[derive(Args, Debug)]
struct ViewOpts {
    /// Literal or snapshot JSON file
    input: PathBuf,

    /// Metric column to display
    #[arg(short, long, env = "CALLPATH_METRIC", default_value = DEFAULT_METRIC)]
    metric: String,

    /// Column used as the node label
    #[arg(long, default_value = NAME_COLUMN)]
    name_column: String,

    /// Secondary index values to display (e.g. --index 0 for rank 0)
    #[arg(long, value_delimiter = ',')]
    index: Option<Vec<i64>>,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the call tree of a profile
    Tree {
        #[command(flatten)]
        view: ViewOpts,

        /// Extra column printed after each name
        #[arg(long)]
        context: Option<String>,

        /// Hide subtrees below this fraction of the largest value
        #[arg(short, long, default_value = "0.0")]
        threshold: f64,

        /// Digits after the decimal point
        #[arg(long, default_value_t = DEFAULT_PRECISION)]
        precision: usize,

        /// Use ASCII instead of unicode branches
        #[arg(long)]
        ascii: bool,

        /// Colour values by magnitude
        #[arg(long)]
        color: bool,
    },

    /// Filter rows by name and squash the graph around them
    Squash {
        /// Literal or snapshot JSON file
        input: PathBuf,

        /// Keep rows whose name starts with this prefix (repeatable)
        #[arg(short, long)]
        keep: Vec<String>,

        /// Remove rows whose name starts with this prefix (repeatable)
        #[arg(short, long)]
        drop: Vec<String>,

        /// Collapse secondary index levels first
        #[arg(long, value_enum)]
        collapse: Option<CollapseMode>,

        /// Output path for the squashed snapshot (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the squashed tree
        #[arg(long)]
        tree: bool,

        /// Metric shown by --tree
        #[arg(short, long, env = "CALLPATH_METRIC", default_value = DEFAULT_METRIC)]
        metric: String,
    },

    /// Merge two profiles onto one graph
    Union {
        left: PathBuf,
        right: PathBuf,

        /// Output path for the unified left snapshot
        #[arg(long, default_value = "left.unified.json")]
        output_left: PathBuf,

        /// Output path for the unified right snapshot
        #[arg(long, default_value = "right.unified.json")]
        output_right: PathBuf,

        /// Also write right minus left to this path
        #[arg(long)]
        diff: Option<PathBuf>,
    },

    /// Export the graph in graphviz DOT format
    Dot {
        #[command(flatten)]
        view: ViewOpts,
    },

    /// Draw an SVG flamegraph of an inclusive metric
    Flamegraph {
        #[command(flatten)]
        view: ViewOpts,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,
    },

    /// Validate a snapshot JSON file
    Validate {
        /// Path to snapshot JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

impl ViewOpts {
    fn into_args(self, format: RenderFormat, tree: TreeOptions) -> RenderArgs {
        RenderArgs {
            input: self.input,
            format,
            output: self.output,
            tree: TreeOptions {
                metric: self.metric,
                name_column: self.name_column,
                index: self.index,
                ..tree
            },
            flamegraph: FlamegraphConfig::default(),
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Tree {
            view,
            context,
            threshold,
            precision,
            ascii,
            color,
        } => {
            let tree = TreeOptions {
                context_column: context,
                threshold,
                precision,
                unicode: !ascii,
                color,
                ..TreeOptions::default()
            };
            let args = view.into_args(RenderFormat::Tree, tree);
            validate_render_args(&args)?;
            execute_render(args)?;
        }

        Commands::Squash {
            input,
            keep,
            drop,
            collapse,
            output,
            tree,
            metric,
        } => {
            let args = SquashArgs {
                input,
                keep,
                drop,
                collapse,
                output,
                print_tree: tree,
                metric,
            };
            validate_squash_args(&args)?;
            execute_squash(args)?;
        }

        Commands::Union {
            left,
            right,
            output_left,
            output_right,
            diff,
        } => {
            execute_union(UnionArgs {
                left,
                right,
                output_left,
                output_right,
                diff,
            })?;
        }

        Commands::Dot { view } => {
            let args = view.into_args(RenderFormat::Dot, TreeOptions::default());
            execute_render(args)?;
        }

        Commands::Flamegraph { view, title, width } => {
            let mut args = view.into_args(RenderFormat::Flamegraph, TreeOptions::default());
            let mut config = FlamegraphConfig::new().with_width(width);
            if let Some(title) = title {
                config = config.with_title(title);
            }
            config.index = args.tree.index.clone();
            args.flamegraph = config;
            validate_render_args(&args)?;
            execute_render(args)?;
        }

        Commands::Validate { file } => {
            validate_snapshot_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
