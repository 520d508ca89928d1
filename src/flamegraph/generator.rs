//! SVG flamegraph generation from a GraphFrame.
//!
//! Draws an icicle-style flamegraph (root on top) where each box is as wide
//! as the node's inclusive metric. A synthetic `all` box spans the roots.
//! Shared DAG nodes are drawn once under each parent.

use crate::graph::NodeId;
use crate::graphframe::GraphFrame;
use crate::render::{node_label, node_metric, resolve_index};
use crate::utils::config::{inclusive_name, NAME_COLUMN};
use crate::utils::error::FlamegraphError;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt::Write;

const LEVEL_HEIGHT: usize = 20;
const TITLE_MARGIN: usize = 30;
const MIN_BOX_WIDTH: f64 = 0.5;
const CHAR_WIDTH: f64 = 7.0;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
    pub index: Option<Vec<i64>>,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Call Path Profile".to_string(),
            width: 1200,
            index: None,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Generate an SVG flamegraph
///
/// **Public** - main entry point for SVG output
///
/// # Arguments
/// * `gf` - frame to draw
/// * `metric` - an exclusive metric (its `(inc)` column gives the widths) or an
///   inclusive metric
/// * `config` - title and size; `None` uses the defaults
///
/// # Errors
/// * `FlamegraphError::UnknownMetric` - neither `metric` nor its inclusive column exists
/// * `FlamegraphError::EmptyGraph` - nothing has a positive value
pub fn generate_flamegraph(
    gf: &GraphFrame,
    metric: &str,
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    let config = config.cloned().unwrap_or_default();
    let width_metric = width_column(gf, metric)?;
    let index = resolve_index(gf.table(), config.index.as_deref());
    info!(
        "Generating flamegraph of {} over {} nodes",
        width_metric,
        gf.graph().len()
    );

    let mut weights = Weights {
        gf,
        index: &index,
        metric: &width_metric,
        memo: HashMap::new(),
    };
    let roots = gf.graph().roots();
    let total: f64 = roots.iter().map(|&r| weights.of(r)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(FlamegraphError::EmptyGraph(width_metric));
    }

    let mut depths = HashMap::new();
    let max_depth = roots
        .iter()
        .map(|&r| depth(gf, r, &mut depths))
        .max()
        .unwrap_or(0);

    let width = config.width;
    let total_height = (max_depth + 1) * LEVEL_HEIGHT + TITLE_MARGIN + 10;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, total_height, width, total_height
    );
    svg.push_str(
        r#"<style>.func { font: 12px sans-serif; } .func:hover { stroke: black; stroke-width: 1; cursor: pointer; opacity: 0.9; }</style>"#,
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&config.title)
    );

    let mut painter = Painter {
        weights,
        out: svg,
        boxes: 0,
    };
    painter.draw_box("all", total, 0, 0.0, width as f64);
    let mut x = 0.0;
    for &root in roots {
        let w = painter.weights.of(root) / total * width as f64;
        painter.draw(root, 1, x, w);
        x += w;
    }

    let Painter { mut out, boxes, .. } = painter;
    out.push_str("</svg>");
    debug!("Flamegraph drew {} boxes, depth {}", boxes, max_depth + 1);
    info!("Flamegraph generated successfully ({} bytes)", out.len());
    Ok(out)
}

/// Column that sets box widths for `metric`
fn width_column(gf: &GraphFrame, metric: &str) -> Result<String, FlamegraphError> {
    let inclusive = inclusive_name(metric);
    if gf.table().has_column(&inclusive) {
        Ok(inclusive)
    } else if gf.table().has_column(metric) {
        Ok(metric.to_string())
    } else {
        Err(FlamegraphError::UnknownMetric(metric.to_string()))
    }
}

/// Box weights; nodes without a value weigh as much as their children
struct Weights<'a> {
    gf: &'a GraphFrame,
    index: &'a [i64],
    metric: &'a str,
    memo: HashMap<NodeId, f64>,
}

impl Weights<'_> {
    fn of(&mut self, node: NodeId) -> f64 {
        if let Some(&w) = self.memo.get(&node) {
            return w;
        }
        let gf = self.gf;
        let w = match node_metric(gf, node, self.index, self.metric) {
            Some(v) => v.max(0.0),
            None => gf
                .graph()
                .children(node)
                .iter()
                .map(|&c| self.of(c))
                .sum(),
        };
        self.memo.insert(node, w);
        w
    }
}

fn depth(gf: &GraphFrame, node: NodeId, memo: &mut HashMap<NodeId, usize>) -> usize {
    if let Some(&d) = memo.get(&node) {
        return d;
    }
    let d = 1 + gf
        .graph()
        .children(node)
        .iter()
        .map(|&c| depth(gf, c, memo))
        .max()
        .unwrap_or(0);
    memo.insert(node, d);
    d
}

struct Painter<'a> {
    weights: Weights<'a>,
    out: String,
    boxes: usize,
}

impl Painter<'_> {
    fn draw(&mut self, node: NodeId, level: usize, x: f64, w: f64) {
        if w < MIN_BOX_WIDTH {
            return;
        }
        let gf = self.weights.gf;
        let name = node_label(gf, node, self.weights.index, NAME_COLUMN);
        let value = self.weights.of(node);
        self.draw_box(&name, value, level, x, w);

        // Children wider than their parent are scaled down to fit
        let children = gf.graph().children(node);
        let child_sum: f64 = children.iter().map(|&c| self.weights.of(c)).sum();
        let scale = value.max(child_sum);
        if scale <= 0.0 {
            return;
        }
        let mut ordered: Vec<(NodeId, f64)> =
            children.iter().map(|&c| (c, self.weights.of(c))).collect();
        ordered.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut child_x = x;
        for (child, weight) in ordered {
            let child_w = weight / scale * w;
            self.draw(child, level + 1, child_x, child_w);
            child_x += child_w;
        }
    }

    fn draw_box(&mut self, name: &str, value: f64, level: usize, x: f64, w: f64) {
        let y = TITLE_MARGIN + level * LEVEL_HEIGHT;
        let name = escape_xml(name);
        let _ = write!(
            self.out,
            r#"<rect x="{:.2}" y="{}" width="{:.2}" height="{}" fill="{}" class="func"><title>{} ({} {})</title></rect>"#,
            x,
            y,
            w,
            LEVEL_HEIGHT,
            node_color(&name),
            name,
            value,
            self.weights.metric
        );

        if w > 35.0 {
            let max_chars = (w / CHAR_WIDTH) as usize;
            let display: String = if name.chars().count() > max_chars && max_chars > 3 {
                let kept: String = name.chars().take(max_chars - 3).collect();
                format!("{}...", kept)
            } else {
                name
            };
            let _ = write!(
                self.out,
                r#"<text x="{:.2}" y="{}" dx="4" dy="14" font-size="12" fill="black" pointer-events="none">{}</text>"#,
                x, y, display
            );
        }
        self.boxes += 1;
    }
}

/// Warm palette keyed on the name so a function keeps its colour across graphs
fn node_color(name: &str) -> String {
    let hash = name
        .bytes()
        .fold(5381u32, |h, b| h.wrapping_mul(33) ^ u32::from(b));
    let r = 205 + (hash % 50);
    let g = (hash >> 8) % 230;
    let b = (hash >> 16) % 55;
    format!("rgb({}, {}, {})", r, g, b)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
