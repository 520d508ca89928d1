//! Terminal call-tree renderer.
//!
//! Output shape (unicode branches):
//! ```text
//! 10.000 main  main.c
//! ├─ 6.000 solve  solve.c
//! │  └─ 2.000 MPI_Wait
//! └─ 4.000 io
//! ```
//!
//! A node reached through several parents is printed under each of them.

use super::{max_metric, node_label, node_metric, resolve_index};
use crate::graph::NodeId;
use crate::graphframe::GraphFrame;
use crate::table::{RowKey, Value};
use crate::utils::config::{
    DEFAULT_CONTEXT_COLUMN, DEFAULT_METRIC, DEFAULT_PRECISION, DEFAULT_THRESHOLD, NAME_COLUMN,
};

const RESET: &str = "\x1b[0m";

/// Tree rendering options
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Column whose value prefixes every line
    pub metric: String,
    pub name_column: String,

    /// Extra column printed after the name, skipped when absent or empty
    pub context_column: Option<String>,

    /// Secondary index tuple to show (`None` picks the first one)
    pub index: Option<Vec<i64>>,

    /// Hide subtrees whose value is below `threshold * max`
    pub threshold: f64,
    pub precision: usize,
    pub unicode: bool,
    pub color: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            metric: DEFAULT_METRIC.to_string(),
            name_column: NAME_COLUMN.to_string(),
            context_column: Some(DEFAULT_CONTEXT_COLUMN.to_string()),
            index: None,
            threshold: DEFAULT_THRESHOLD,
            precision: DEFAULT_PRECISION,
            unicode: true,
            color: false,
        }
    }
}

impl TreeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = metric.into();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }
}

struct Branches {
    tee: &'static str,
    last: &'static str,
    pipe: &'static str,
    blank: &'static str,
}

static UNICODE: Branches = Branches {
    tee: "├─ ",
    last: "└─ ",
    pipe: "│  ",
    blank: "   ",
};

static ASCII: Branches = Branches {
    tee: "|- ",
    last: "`- ",
    pipe: "|  ",
    blank: "   ",
};

/// Render the frame as an indented tree
///
/// **Public** - main entry point for terminal output
///
/// # Returns
/// One line per printed node, newline-terminated. Nodes without a row print
/// `-` in place of the value. An empty graph renders as an empty string.
pub fn render_tree(gf: &GraphFrame, options: &TreeOptions) -> String {
    let index = resolve_index(gf.table(), options.index.as_deref());
    let renderer = TreeRenderer {
        gf,
        options,
        max: max_metric(gf, &index, &options.metric),
        branches: if options.unicode { &UNICODE } else { &ASCII },
        index,
    };

    let mut out = String::new();
    for &root in gf.graph().roots() {
        renderer.render(root, "", None, &mut out);
    }
    out
}

struct TreeRenderer<'a> {
    gf: &'a GraphFrame,
    options: &'a TreeOptions,
    index: Vec<i64>,
    max: f64,
    branches: &'static Branches,
}

impl TreeRenderer<'_> {
    /// `is_last` is `None` for roots, which get no branch glyph
    fn render(&self, node: NodeId, prefix: &str, is_last: Option<bool>, out: &mut String) {
        let value = node_metric(self.gf, node, &self.index, &self.options.metric);

        out.push_str(prefix);
        if let Some(last) = is_last {
            out.push_str(if last { self.branches.last } else { self.branches.tee });
        }
        out.push_str(&self.line(node, value));
        out.push('\n');

        let child_prefix = match is_last {
            None => prefix.to_string(),
            Some(true) => format!("{}{}", prefix, self.branches.blank),
            Some(false) => format!("{}{}", prefix, self.branches.pipe),
        };
        let children: Vec<NodeId> = self
            .gf
            .graph()
            .children(node)
            .iter()
            .copied()
            .filter(|&child| self.visible(child))
            .collect();
        for (i, &child) in children.iter().enumerate() {
            self.render(child, &child_prefix, Some(i + 1 == children.len()), out);
        }
    }

    fn visible(&self, node: NodeId) -> bool {
        match node_metric(self.gf, node, &self.index, &self.options.metric) {
            Some(value) => value >= self.options.threshold * self.max,
            None => true,
        }
    }

    fn line(&self, node: NodeId, value: Option<f64>) -> String {
        let formatted = match value {
            Some(v) => format!("{:.*}", self.options.precision, v),
            None => "-".to_string(),
        };
        let formatted = match value {
            Some(v) if self.options.color => {
                format!("{}{}{}", ratio_color(v, self.max), formatted, RESET)
            }
            _ => formatted,
        };

        let mut line = format!(
            "{} {}",
            formatted,
            node_label(self.gf, node, &self.index, &self.options.name_column)
        );
        if let Some(context) = self.context(node) {
            line.push_str("  ");
            line.push_str(&context);
        }
        line
    }

    fn context(&self, node: NodeId) -> Option<String> {
        let column = self.options.context_column.as_deref()?;
        let key = RowKey::new(node, self.index.clone());
        let text = match self.gf.table().value(&key, column)? {
            Value::Null => return None,
            value => value.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

fn ratio_color(value: f64, max: f64) -> &'static str {
    let ratio = if max > 0.0 { value / max } else { 0.0 };
    if ratio >= 0.9 {
        "\x1b[31;1m" // Red
    } else if ratio >= 0.7 {
        "\x1b[33;1m" // Bright yellow
    } else if ratio >= 0.5 {
        "\x1b[33m" // Yellow
    } else if ratio >= 0.3 {
        "\x1b[32m" // Green
    } else if ratio >= 0.1 {
        "\x1b[36m" // Cyan
    } else {
        "\x1b[34m" // Blue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::from_literal;
    use serde_json::json;

    fn sample() -> GraphFrame {
        from_literal(&json!({
            "name": "main",
            "metrics": {"time": 1.0},
            "children": [
                {"name": "solve", "metrics": {"time": 6.0},
                 "children": [{"name": "wait", "metrics": {"time": 0.5}}]},
                {"name": "io", "metrics": {"time": 3.0}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_render_tree_ascii() {
        let text = render_tree(&sample(), &TreeOptions::new().with_unicode(false));
        assert_eq!(
            text,
            "1.000 main\n|- 6.000 solve\n|  `- 0.500 wait\n`- 3.000 io\n"
        );
    }

    #[test]
    fn test_render_tree_threshold_hides_small_subtrees() {
        let text = render_tree(&sample(), &TreeOptions::new().with_threshold(0.1));
        assert!(!text.contains("wait"));
        assert!(text.contains("└─ 3.000 io"));
    }

    #[test]
    fn test_ratio_color_bands() {
        assert_eq!(ratio_color(10.0, 10.0), "\x1b[31;1m");
        assert_eq!(ratio_color(0.0, 10.0), "\x1b[34m");
        assert_eq!(ratio_color(1.0, 0.0), "\x1b[34m");
    }
}
