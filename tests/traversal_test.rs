mod helpers;

use mnemograph::graph::traversal::{
    bfs, calculate_impact, connected_components, dfs, find_reachable, nodes_at_depth, shortest_path, subgraph,
};
use mnemograph::graph::MemoryGraph;
use mnemograph::memory::MemoryType;

use helpers::graph;

/// decision → learning → artifact, gotcha → artifact, breadcrumb on its own.
fn project() -> MemoryGraph {
    graph(
        &[
            ("use-sqlite", MemoryType::Decision),
            ("wal-mode", MemoryType::Learning),
            ("schema-doc", MemoryType::Artifact),
            ("fts-gotcha", MemoryType::Gotcha),
            ("todo-resume", MemoryType::Breadcrumb),
        ],
        &[
            ("use-sqlite", "wal-mode", "relates-to"),
            ("wal-mode", "schema-doc", "derived-from"),
            ("fts-gotcha", "schema-doc", "references"),
        ],
    )
}

#[test]
fn bfs_respects_depth_limit() {
    let g = project();
    let t = bfs(&g, "use-sqlite", Some(1)).unwrap();
    assert_eq!(t.visited, vec!["use-sqlite", "wal-mode"]);
    assert_eq!(t.depth_of("wal-mode"), Some(1));
    assert!(!t.contains("schema-doc"));

    let all = bfs(&g, "use-sqlite", None).unwrap();
    assert_eq!(all.depth_of("schema-doc"), Some(2));
}

#[test]
fn dfs_and_bfs_reach_the_same_nodes() {
    let g = project();
    let mut a = dfs(&g, "use-sqlite").unwrap().visited;
    let mut b = find_reachable(&g, "use-sqlite").unwrap();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn walks_from_unknown_nodes_fail() {
    let g = project();
    assert!(bfs(&g, "nope", None).unwrap_err().is_not_found());
    assert!(shortest_path(&g, "nope", "use-sqlite").unwrap_err().is_not_found());
}

#[test]
fn shortest_path_follows_edge_direction() {
    let g = project();
    assert_eq!(
        shortest_path(&g, "use-sqlite", "schema-doc").unwrap(),
        Some(vec!["use-sqlite".to_string(), "wal-mode".into(), "schema-doc".into()])
    );
    assert_eq!(shortest_path(&g, "schema-doc", "use-sqlite").unwrap(), None);
    assert_eq!(shortest_path(&g, "use-sqlite", "nope").unwrap(), None);
    assert_eq!(
        shortest_path(&g, "wal-mode", "wal-mode").unwrap(),
        Some(vec!["wal-mode".to_string()])
    );
}

#[test]
fn components_ignore_direction() {
    let g = project();
    let components = connected_components(&g);
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].len(), 4);
    assert_eq!(components[1], vec!["todo-resume"]);
}

#[test]
fn neighbourhood_goes_both_ways() {
    let g = project();
    let around = nodes_at_depth(&g, "schema-doc", 1).unwrap();
    assert!(around.contains("wal-mode"));
    assert!(around.contains("fts-gotcha"));
    assert!(!around.contains("use-sqlite"));

    let sub = subgraph(&g, "schema-doc", 1).unwrap();
    assert_eq!(sub.nodes.len(), 3);
    assert_eq!(sub.edges.len(), 2);
}

#[test]
fn impact_collects_transitive_dependents() {
    let g = project();
    let report = calculate_impact(&g, "schema-doc").unwrap();
    assert_eq!(report.direct, vec!["wal-mode", "fts-gotcha"]);
    assert_eq!(report.transitive, vec!["wal-mode", "fts-gotcha", "use-sqlite"]);
    assert_eq!(report.max_depth, 2);

    let leaf = calculate_impact(&g, "use-sqlite").unwrap();
    assert!(leaf.transitive.is_empty());
    assert_eq!(leaf.max_depth, 0);
}

#[test]
fn cycles_terminate() {
    let g = graph(
        &[("a", MemoryType::Decision), ("b", MemoryType::Learning), ("c", MemoryType::Artifact)],
        &[("a", "b", "relates-to"), ("b", "c", "relates-to"), ("c", "a", "relates-to")],
    );
    assert_eq!(find_reachable(&g, "a").unwrap().len(), 3);
    let impact = calculate_impact(&g, "a").unwrap();
    assert_eq!(impact.transitive, vec!["c", "b"]);
}
