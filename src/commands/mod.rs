//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod render;
pub mod squash;
pub mod union;
pub mod utils;

// Re-export main command functions
pub use models::{
    validate_render_args, validate_squash_args, CollapseMode, RenderArgs, RenderFormat,
    SquashArgs, UnionArgs,
};
pub use render::execute_render;
pub use squash::{execute_squash, filter_by_prefix};
pub use union::execute_union;
pub use utils::{display_schema, display_version, validate_snapshot_file};
