use callpath_studio::flamegraph::{generate_flamegraph, FlamegraphConfig};
use callpath_studio::graphframe::GraphFrame;
use callpath_studio::reader::from_literal;
use callpath_studio::render::{render_dot, render_tree, DotOptions, TreeOptions};
use pretty_assertions::assert_eq;
use serde_json::json;

fn profile() -> GraphFrame {
    from_literal(&json!({
        "name": "main",
        "metrics": {"time": 1.0, "time (inc)": 10.0},
        "children": [
            {"name": "solve", "metrics": {"time": 4.0, "time (inc)": 6.0},
             "children": [{"name": "MPI_Wait", "metrics": {"time": 2.0, "time (inc)": 2.0}}]},
            {"name": "io", "metrics": {"time": 3.0, "time (inc)": 3.0}}
        ]
    }))
    .unwrap()
}

#[test]
fn test_tree_inclusive_unicode() {
    let text = render_tree(&profile(), &TreeOptions::new().with_metric("time (inc)"));
    let expected = "\
10.000 main
├─ 6.000 solve
│  └─ 2.000 MPI_Wait
└─ 3.000 io
";
    assert_eq!(text, expected);
}

#[test]
fn test_tree_precision_and_threshold() {
    let options = TreeOptions {
        precision: 1,
        threshold: 0.5,
        ..TreeOptions::new().with_metric("time (inc)")
    };
    assert_eq!(render_tree(&profile(), &options), "10.0 main\n└─ 6.0 solve\n");
}

#[test]
fn test_tree_is_read_only_after_squash() {
    let squashed = profile()
        .filter(|row| row.name() != Some("solve"))
        .squash()
        .unwrap();
    let options = TreeOptions::new()
        .with_metric("time (inc)")
        .with_unicode(false);
    let text = render_tree(&squashed, &options);
    assert_eq!(text, "6.000 main\n|- 2.000 MPI_Wait\n`- 3.000 io\n");
}

#[test]
fn test_tree_color_wraps_values() {
    let text = render_tree(&profile(), &TreeOptions::new().with_color(true));
    assert!(text.starts_with("\x1b[36m1.000\x1b[0m main"));
    assert!(text.contains("\x1b[31;1m4.000\x1b[0m solve"));
}

#[test]
fn test_dot_export() {
    let dot = render_dot(
        &profile(),
        &DotOptions {
            metric: "time".to_string(),
            fill: false,
            ..DotOptions::default()
        },
    );
    let expected = r##"strict digraph {
  node [shape=box, style=filled, fillcolor="#ffffff"];
  "0" [label="main\n1.000"];
  "1" [label="solve\n4.000"];
  "2" [label="MPI_Wait\n2.000"];
  "3" [label="io\n3.000"];
  "0" -> "1";
  "0" -> "3";
  "1" -> "2";
}
"##;
    assert_eq!(dot, expected);
}

#[test]
fn test_flamegraph_with_title() {
    let config = FlamegraphConfig::new().with_title("Solver & IO").with_width(1000);
    let svg = generate_flamegraph(&profile(), "time", Some(&config)).unwrap();

    assert!(svg.contains("Solver &amp; IO"));
    assert!(svg.contains(r#"width="1000""#));
    // solve is 6 of 10
    assert!(svg.contains(r#"width="600.00""#));
}
