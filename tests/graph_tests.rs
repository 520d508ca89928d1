use callpath_studio::graph::{Frame, FrameValue, Graph, NodeId, TraversalOrder};
use callpath_studio::utils::error::GraphError;
use pretty_assertions::assert_eq;
use serde_json::json;

fn names(graph: &Graph, ids: impl IntoIterator<Item = NodeId>) -> Vec<String> {
    ids.into_iter()
        .map(|id| graph.frame(id).name().unwrap_or_default().to_string())
        .collect()
}

fn find(graph: &Graph, name: &str) -> NodeId {
    graph.find_by_attr("name", &FrameValue::from(name))[0]
}

fn frame(name: &str) -> Frame {
    Frame::from_pairs([("name", name), ("type", "None")])
}

/// a -> b -> d, a -> c -> d
fn diamond() -> Graph {
    let mut graph = Graph::new();
    let a = graph.add_root(frame("a"));
    let b = graph.add_child(a, frame("b"));
    let c = graph.add_child(a, frame("c"));
    let d = graph.add_child(b, frame("d"));
    graph.add_edge(c, d);
    graph
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn test_traversal_orders() {
    let graph = Graph::from_lists(&json!(["a", ["b", "d", "e"], ["c", "f", "g"]])).unwrap();

    let pre: Vec<NodeId> = graph.traverse(TraversalOrder::Pre).collect();
    assert_eq!(names(&graph, pre), vec!["a", "b", "d", "e", "c", "f", "g"]);

    let post: Vec<NodeId> = graph.traverse(TraversalOrder::Post).collect();
    assert_eq!(names(&graph, post), vec!["d", "e", "b", "f", "g", "c", "a"]);
}

#[test]
fn test_dag_traversal_yields_shared_node_once() {
    let graph = diamond();
    let pre: Vec<NodeId> = graph.traverse(TraversalOrder::Pre).collect();
    assert_eq!(names(&graph, pre), vec!["a", "b", "d", "c"]);
    assert_eq!(graph.len(), 4);

    let root = graph.roots()[0];
    let every_path: Vec<NodeId> = graph.traverse_from(root, TraversalOrder::Pre, false).collect();
    assert_eq!(names(&graph, every_path), vec!["a", "b", "d", "c", "d"]);
}

#[test]
fn test_multi_root_traversal_shares_visited_set() {
    let mut graph = Graph::from_lists_multi(&[json!(["r1", "x"]), json!("r2")]).unwrap();
    let r2 = graph.roots()[1];
    let x = find(&graph, "x");
    graph.add_edge(r2, x);

    let pre: Vec<NodeId> = graph.traverse(TraversalOrder::Pre).collect();
    assert_eq!(names(&graph, pre), vec!["r1", "x", "r2"]);
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_path_fails_on_shared_node() {
    let graph = diamond();
    let d = find(&graph, "d");

    assert_eq!(graph.path(d), Err(GraphError::MultiplePaths { node: d }));
    assert_eq!(graph.paths(d).len(), 2);

    let b = find(&graph, "b");
    assert_eq!(graph.path(b).unwrap(), vec![&frame("a"), &frame("b")]);
}

// ============================================================================
// Copy and equality
// ============================================================================

#[test]
fn test_copy_is_equal_and_mapping_covers_every_node() {
    for graph in [
        diamond(),
        Graph::from_lists(&json!(["a", ["b", "d", "e"], ["c", "f", "g"]])).unwrap(),
        Graph::from_lists_multi(&[json!(["x", "y"]), json!(["z"])]).unwrap(),
    ] {
        let (copy, mapping) = graph.copy();
        assert_eq!(copy, graph);
        assert_eq!(mapping.len(), graph.len());

        let mut targets: Vec<NodeId> = mapping.values().copied().collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), graph.len());
    }
}

#[test]
fn test_equality_ignores_child_order() {
    let left = Graph::from_lists(&json!(["a", "b", "c"])).unwrap();
    let right = Graph::from_lists(&json!(["a", "c", "b"])).unwrap();
    assert_eq!(left, right);

    let other = Graph::from_lists(&json!(["a", "b", "x"])).unwrap();
    assert_ne!(left, other);
}

// ============================================================================
// Union
// ============================================================================

#[test]
fn test_union_merges_diverging_children() {
    let left = Graph::from_lists(&json!(["A", ["B", "D"]])).unwrap();
    let right = Graph::from_lists(&json!(["A", ["C", "D"]])).unwrap();

    let union = left.union(&right).unwrap();
    let graph = &union.graph;
    assert_eq!(graph.len(), 4);
    assert_eq!(graph.roots().len(), 1);

    let a = graph.roots()[0];
    let mut children = names(graph, graph.children(a).to_vec());
    children.sort();
    assert_eq!(children, vec!["B", "C"]);

    let d = find(graph, "D");
    assert_eq!(graph.parents(d).len(), 2);

    assert_eq!(union.left.len(), 3);
    assert_eq!(union.right.len(), 3);
    assert_eq!(union.left[&find(&left, "D")], union.right[&find(&right, "D")]);
}

#[test]
fn test_union_of_equal_graphs_is_equal_to_both() {
    let left = diamond();
    let (right, _) = left.copy();
    let union = left.union(&right).unwrap();
    assert_eq!(union.graph, left);
    assert_eq!(union.graph, right);
    assert_eq!(union.right.len(), right.len());
}

#[test]
fn test_union_is_commutative() {
    let left = Graph::from_lists_multi(&[json!(["main", ["solve", "mpi"]]), json!("init")]).unwrap();
    let right = Graph::from_lists(&json!(["main", ["io", "write"], ["solve", "blas"]])).unwrap();

    let lr = left.union(&right).unwrap().graph;
    let rl = right.union(&left).unwrap().graph;
    assert_eq!(lr, rl);
    assert_eq!(lr.len(), 7);
    assert_eq!(names(&lr, lr.roots().to_vec()), vec!["init", "main"]);
}

#[test]
fn test_union_reports_cycles() {
    let forward = Graph::from_lists(&json!(["a", ["b", "c"]])).unwrap();
    let backward = Graph::from_lists(&json!(["c", "a"])).unwrap();
    assert!(matches!(
        forward.union(&backward),
        Err(GraphError::CycleIntroduced(_))
    ));
}

#[test]
fn test_union_keeps_recursion_levels_apart() {
    let recursive = Graph::from_lists(&json!(["main", ["foo", "foo"]])).unwrap();
    let other = Graph::from_lists(&json!(["main", "bar"])).unwrap();

    let union = recursive.union(&other).unwrap();
    let graph = &union.graph;
    assert_eq!(graph.len(), 4);

    let foos = graph.find_by_attr("name", &FrameValue::from("foo"));
    assert_eq!(foos.len(), 2);
    assert_eq!(graph.children(foos[0]), &[foos[1]]);
    assert!(graph.children(foos[1]).is_empty());

    let mut children = names(graph, graph.children(graph.roots()[0]).to_vec());
    children.sort();
    assert_eq!(children, vec!["bar", "foo"]);
    assert_eq!(union.left.len(), 3);
}

#[test]
fn test_union_aligns_recursion_depths_across_inputs() {
    let left = Graph::from_lists(&json!(["main", ["foo", ["foo", "x"]]])).unwrap();
    let right = Graph::from_lists(&json!(["main", ["foo", ["foo", "y"]]])).unwrap();

    let union = left.union(&right).unwrap();
    let graph = &union.graph;
    assert_eq!(graph.len(), 5);

    let inner = graph.parents(find(graph, "x"))[0];
    assert_eq!(graph.parents(find(graph, "y")), &[inner]);
    assert_eq!(graph.path_attr(inner, "name").unwrap().len(), 3);
}

#[test]
fn test_invalid_list_literal() {
    assert!(matches!(
        Graph::from_lists(&json!(["a", 3])),
        Err(GraphError::InvalidLiteral(_))
    ));
    assert!(matches!(
        Graph::from_lists(&json!([])),
        Err(GraphError::InvalidLiteral(_))
    ));
}
