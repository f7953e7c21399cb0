//! Summary counts over a graph snapshot.

use serde::Serialize;
use std::collections::BTreeMap;

use super::edges::orphaned_nodes;
use super::traversal::connected_components;
use super::types::MemoryGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_label: BTreeMap<String, usize>,
    pub orphans: usize,
    pub components: usize,
}

pub fn graph_stats(graph: &MemoryGraph) -> GraphStats {
    let mut by_type = BTreeMap::new();
    for node in &graph.nodes {
        *by_type.entry(node.node_type.to_string()).or_insert(0) += 1;
    }

    let mut by_label = BTreeMap::new();
    for edge in &graph.edges {
        *by_label.entry(edge.label.to_string()).or_insert(0) += 1;
    }

    GraphStats {
        nodes: graph.nodes.len(),
        edges: graph.edges.len(),
        by_type,
        by_label,
        orphans: orphaned_nodes(graph).len(),
        components: connected_components(graph).len(),
    }
}
