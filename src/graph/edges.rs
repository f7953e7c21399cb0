//! Edge mutation and adjacency queries.
//!
//! Mutations are pure: they take the graph by reference and return a new one.
//! Duplicate `(source, target, label)` triples are never stored twice.

use std::collections::HashSet;
use tracing::debug;

use super::labels::EdgeLabel;
use super::types::{GraphEdge, MemoryGraph};
use crate::error::{GraphError, Result};

/// Add a directed edge.
///
/// Fails if either endpoint is missing or `source == target`. Adding an
/// existing triple returns an identical graph.
pub fn add_edge(
    graph: &MemoryGraph,
    source: &str,
    target: &str,
    label: &EdgeLabel,
) -> Result<MemoryGraph> {
    if !graph.contains_node(source) {
        return Err(GraphError::MissingEndpoint {
            role: "source",
            id: source.to_string(),
        });
    }
    if !graph.contains_node(target) {
        return Err(GraphError::MissingEndpoint {
            role: "target",
            id: target.to_string(),
        });
    }
    if source == target {
        return Err(GraphError::SelfLoop(source.to_string()));
    }

    let mut next = graph.clone();
    if has_edge(graph, source, target, Some(label)) {
        debug!(source, target, label = %label, "edge already present");
    } else {
        next.edges.push(GraphEdge::new(source, target, label.clone()));
    }
    Ok(next)
}

/// Remove edges from `source` to `target`: all of them when `label` is
/// `None`, otherwise only the exact triple. Missing edges are a no-op.
pub fn remove_edge(
    graph: &MemoryGraph,
    source: &str,
    target: &str,
    label: Option<&EdgeLabel>,
) -> MemoryGraph {
    let edges = graph
        .edges
        .iter()
        .filter(|e| {
            let endpoints = e.source == source && e.target == target;
            !(endpoints && label.map_or(true, |l| &e.label == l))
        })
        .cloned()
        .collect();

    MemoryGraph {
        version: graph.version,
        nodes: graph.nodes.clone(),
        edges,
    }
}

/// Apply [`add_edge`] to each triple in order, skipping any that fail validation.
pub fn bulk_add_edges<'a, I>(graph: &MemoryGraph, edges: I) -> MemoryGraph
where
    I: IntoIterator<Item = (&'a str, &'a str, &'a EdgeLabel)>,
{
    let mut current = graph.clone();
    for (source, target, label) in edges {
        match add_edge(&current, source, target, label) {
            Ok(next) => current = next,
            Err(e) => debug!(source, target, error = %e, "bulk add skipped edge"),
        }
    }
    current
}

/// `true` if an edge `source → target` exists, with the given label if one is supplied.
pub fn has_edge(graph: &MemoryGraph, source: &str, target: &str, label: Option<&EdgeLabel>) -> bool {
    graph.edges.iter().any(|e| {
        e.source == source && e.target == target && label.map_or(true, |l| &e.label == l)
    })
}

/// `true` if any edge joins `a` and `b`, in either direction.
pub fn are_connected(graph: &MemoryGraph, a: &str, b: &str) -> bool {
    graph
        .edges
        .iter()
        .any(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
}

/// Edges pointing at `id`.
pub fn inbound_edges<'g>(graph: &'g MemoryGraph, id: &str) -> Vec<&'g GraphEdge> {
    graph.edges.iter().filter(|e| e.target == id).collect()
}

/// Edges leaving `id`.
pub fn outbound_edges<'g>(graph: &'g MemoryGraph, id: &str) -> Vec<&'g GraphEdge> {
    graph.edges.iter().filter(|e| e.source == id).collect()
}

/// Every edge touching `id`, in graph order.
pub fn all_edges_for_node<'g>(graph: &'g MemoryGraph, id: &str) -> Vec<&'g GraphEdge> {
    graph.edges.iter().filter(|e| e.touches(id)).collect()
}

/// Distinct nodes adjacent to `id` in either direction, in first-seen order.
pub fn neighbours<'g>(graph: &'g MemoryGraph, id: &str) -> Vec<&'g str> {
    let mut seen = HashSet::new();
    graph
        .edges
        .iter()
        .filter_map(|e| e.other_end(id))
        .filter(|n| seen.insert(*n))
        .collect()
}

/// Number of edges touching `id`. Parallel edges with different labels count separately.
pub fn node_degree(graph: &MemoryGraph, id: &str) -> usize {
    graph.edges.iter().filter(|e| e.touches(id)).count()
}

/// Ids of nodes with no edges at all, in node order.
pub fn orphaned_nodes(graph: &MemoryGraph) -> Vec<&str> {
    let touched: HashSet<&str> = graph
        .edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();
    graph
        .node_ids()
        .filter(|id| !touched.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::store::add_node;
    use crate::memory::MemoryType;

    fn abc() -> MemoryGraph {
        let g = MemoryGraph::new();
        let g = add_node(&g, "a", MemoryType::Decision).unwrap();
        let g = add_node(&g, "b", MemoryType::Learning).unwrap();
        add_node(&g, "c", MemoryType::Artifact).unwrap()
    }

    #[test]
    fn add_edge_then_has_edge() {
        let g = add_edge(&abc(), "a", "b", &EdgeLabel::RELATES_TO).unwrap();
        assert!(has_edge(&g, "a", "b", Some(&EdgeLabel::RELATES_TO)));
        assert!(has_edge(&g, "a", "b", None));
        assert!(!has_edge(&g, "b", "a", None));
    }

    #[test]
    fn add_edge_is_idempotent() {
        let g = add_edge(&abc(), "a", "b", &EdgeLabel::RELATES_TO).unwrap();
        let g2 = add_edge(&g, "a", "b", &EdgeLabel::RELATES_TO).unwrap();
        assert_eq!(g2, g);
        assert_eq!(g2.edges.len(), 1);
    }

    #[test]
    fn parallel_edges_with_distinct_labels_coexist() {
        let g = add_edge(&abc(), "a", "b", &EdgeLabel::RELATES_TO).unwrap();
        let g = add_edge(&g, "a", "b", &EdgeLabel::DEPENDS_ON).unwrap();
        assert_eq!(g.edges.len(), 2);
        assert_eq!(node_degree(&g, "a"), 2);
        assert_eq!(neighbours(&g, "a"), vec!["b"]);
    }

    #[test]
    fn add_edge_validates_endpoints() {
        let err = add_edge(&abc(), "a", "ghost", &EdgeLabel::RELATES_TO).unwrap_err();
        assert!(matches!(err, GraphError::MissingEndpoint { role: "target", .. }));

        let err = add_edge(&abc(), "ghost", "a", &EdgeLabel::RELATES_TO).unwrap_err();
        assert!(matches!(err, GraphError::MissingEndpoint { role: "source", .. }));

        let err = add_edge(&abc(), "a", "a", &EdgeLabel::RELATES_TO).unwrap_err();
        assert!(matches!(err, GraphError::SelfLoop(_)));
    }

    #[test]
    fn remove_edge_with_and_without_label() {
        let g = add_edge(&abc(), "a", "b", &EdgeLabel::RELATES_TO).unwrap();
        let g = add_edge(&g, "a", "b", &EdgeLabel::DEPENDS_ON).unwrap();
        let g = add_edge(&g, "b", "a", &EdgeLabel::RELATES_TO).unwrap();

        let one = remove_edge(&g, "a", "b", Some(&EdgeLabel::DEPENDS_ON));
        assert_eq!(one.edges.len(), 2);

        let all = remove_edge(&g, "a", "b", None);
        assert_eq!(all.edges.len(), 1);
        assert_eq!(all.edges[0].source, "b");

        let noop = remove_edge(&g, "c", "a", None);
        assert_eq!(noop, g);
    }

    #[test]
    fn bulk_add_skips_invalid() {
        let rel = EdgeLabel::RELATES_TO;
        let g = bulk_add_edges(
            &abc(),
            [("a", "b", &rel), ("a", "ghost", &rel), ("b", "b", &rel), ("b", "c", &rel)],
        );
        assert_eq!(g.edges.len(), 2);
    }

    #[test]
    fn orphans_and_directional_queries() {
        let g = add_edge(&abc(), "a", "b", &EdgeLabel::RELATES_TO).unwrap();
        assert_eq!(orphaned_nodes(&g), vec!["c"]);

        let inbound = inbound_edges(&g, "b");
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].source, "a");
        assert!(outbound_edges(&g, "b").is_empty());
        assert_eq!(all_edges_for_node(&g, "b").len(), 1);
        assert!(are_connected(&g, "b", "a"));
        assert!(!are_connected(&g, "a", "c"));
    }
}
