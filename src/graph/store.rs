//! Snapshot persistence and node-level mutation.
//!
//! [`load`] never fails: a missing or unreadable snapshot yields an empty
//! graph, and a parseable snapshot with structural damage is repaired by
//! dropping the offending entries. [`save`] replaces the whole file atomically
//! (temp file + rename). There is no locking; concurrent writers to the same
//! scope resolve as last-write-wins.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use super::labels::EdgeLabel;
use super::types::{validate_node_id, GraphEdge, GraphNode, MemoryGraph, GRAPH_VERSION};
use crate::error::{GraphError, Result};
use crate::memory::MemoryType;

/// How a snapshot load went. The graph is usable in every case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    /// No snapshot on disk yet.
    Missing,
    Loaded,
    /// Parsed, but invalid entries were dropped.
    Repaired {
        dropped_nodes: usize,
        dropped_edges: usize,
    },
    /// Unreadable or unparseable; replaced by an empty graph.
    Corrupt { reason: String },
}

/// A structural problem found by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum GraphIssue {
    InvalidNodeId { id: String },
    DuplicateNode { id: String },
    DanglingEdge { source: String, target: String, label: String, missing: String },
    SelfLoop { id: String, label: String },
    DuplicateEdge { source: String, target: String, label: String },
}

impl std::fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNodeId { id } => write!(f, "invalid node id {id:?}"),
            Self::DuplicateNode { id } => write!(f, "duplicate node {id}"),
            Self::DanglingEdge { source, target, label, missing } => {
                write!(f, "edge {source} -[{label}]-> {target} references missing node {missing}")
            }
            Self::SelfLoop { id, label } => write!(f, "self-loop {id} -[{label}]-> {id}"),
            Self::DuplicateEdge { source, target, label } => {
                write!(f, "duplicate edge {source} -[{label}]-> {target}")
            }
        }
    }
}

/// Load a snapshot, falling back to an empty graph on any failure.
pub fn load(path: impl AsRef<Path>) -> MemoryGraph {
    load_with_status(path).0
}

/// Like [`load`], but also reports what happened.
pub fn load_with_status(path: impl AsRef<Path>) -> (MemoryGraph, LoadStatus) {
    let path = path.as_ref();

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no graph snapshot, starting empty");
            return (MemoryGraph::default(), LoadStatus::Missing);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "graph snapshot unreadable, using empty graph");
            return (MemoryGraph::default(), LoadStatus::Corrupt { reason: e.to_string() });
        }
    };

    let snapshot: RawSnapshot = match serde_json::from_str(&contents) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "graph snapshot corrupt, using empty graph");
            return (MemoryGraph::default(), LoadStatus::Corrupt { reason: e.to_string() });
        }
    };

    if snapshot.version > GRAPH_VERSION {
        warn!(
            found = snapshot.version,
            supported = GRAPH_VERSION,
            "graph snapshot written by a newer version"
        );
    }

    let (graph, dropped_nodes, dropped_edges) = repair(snapshot);
    if dropped_nodes + dropped_edges > 0 {
        warn!(
            path = %path.display(),
            dropped_nodes,
            dropped_edges,
            "graph snapshot repaired"
        );
        (graph, LoadStatus::Repaired { dropped_nodes, dropped_edges })
    } else {
        debug!(
            path = %path.display(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "graph snapshot loaded"
        );
        (graph, LoadStatus::Loaded)
    }
}

/// Persist the whole snapshot, replacing any previous one.
///
/// Refuses graphs that fail [`validate`].
pub fn save(path: impl AsRef<Path>, graph: &MemoryGraph) -> Result<()> {
    let path = path.as_ref();

    let issues = validate(graph);
    if let Some(first) = issues.first() {
        return Err(GraphError::InvalidGraph {
            count: issues.len(),
            first: first.to_string(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(graph)?;
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, json).map_err(|e| GraphError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| GraphError::io(path, e))?;

    info!(
        path = %path.display(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "graph snapshot saved"
    );
    Ok(())
}

/// Report every structural issue in `graph`, in node then edge order.
pub fn validate(graph: &MemoryGraph) -> Vec<GraphIssue> {
    let mut issues = Vec::new();
    let mut seen_nodes = HashSet::new();

    for node in &graph.nodes {
        if validate_node_id(&node.id).is_err() {
            issues.push(GraphIssue::InvalidNodeId { id: node.id.clone() });
        }
        if !seen_nodes.insert(node.id.as_str()) {
            issues.push(GraphIssue::DuplicateNode { id: node.id.clone() });
        }
    }

    let mut seen_edges = HashSet::new();
    for edge in &graph.edges {
        let label = edge.label.to_string();
        if edge.source == edge.target {
            issues.push(GraphIssue::SelfLoop { id: edge.source.clone(), label });
            continue;
        }
        let missing = [&edge.source, &edge.target]
            .into_iter()
            .find(|id| !seen_nodes.contains(id.as_str()));
        if let Some(missing) = missing {
            issues.push(GraphIssue::DanglingEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                label,
                missing: missing.clone(),
            });
            continue;
        }
        if !seen_edges.insert(edge) {
            issues.push(GraphIssue::DuplicateEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                label,
            });
        }
    }

    issues
}

/// On-disk shape, read leniently so one bad entry cannot sink the snapshot.
#[derive(Deserialize)]
struct RawSnapshot {
    version: u32,
    #[serde(default)]
    nodes: Vec<serde_json::Value>,
    #[serde(default)]
    edges: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
}

#[derive(Deserialize)]
struct RawEdge {
    source: String,
    target: String,
    label: String,
}

fn parse_node(value: serde_json::Value) -> Option<GraphNode> {
    let raw: RawNode = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "dropping malformed node entry");
            return None;
        }
    };
    match raw.node_type.parse::<MemoryType>() {
        Ok(node_type) => Some(GraphNode::new(raw.id, node_type)),
        Err(e) => {
            debug!(id = %raw.id, error = %e, "dropping node");
            None
        }
    }
}

fn parse_edge(value: serde_json::Value) -> Option<GraphEdge> {
    let raw: RawEdge = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "dropping malformed edge entry");
            return None;
        }
    };
    match EdgeLabel::new(raw.label) {
        Ok(label) => Some(GraphEdge::new(raw.source, raw.target, label)),
        Err(e) => {
            debug!(source = %raw.source, target = %raw.target, error = %e, "dropping edge");
            None
        }
    }
}

/// Drop invalid nodes and edges, returning the cleaned graph and drop counts.
fn repair(snapshot: RawSnapshot) -> (MemoryGraph, usize, usize) {
    let RawSnapshot { version, nodes, edges } = snapshot;
    let (node_total, edge_total) = (nodes.len(), edges.len());

    let mut seen = HashSet::new();
    let nodes: Vec<GraphNode> = nodes
        .into_iter()
        .filter_map(parse_node)
        .filter(|n| validate_node_id(&n.id).is_ok() && seen.insert(n.id.clone()))
        .collect();

    let mut seen_edges: HashSet<GraphEdge> = HashSet::new();
    let edges: Vec<GraphEdge> = edges
        .into_iter()
        .filter_map(parse_edge)
        .filter(|e| {
            e.source != e.target
                && seen.contains(&e.source)
                && seen.contains(&e.target)
                && seen_edges.insert(e.clone())
        })
        .collect();

    let dropped_nodes = node_total - nodes.len();
    let dropped_edges = edge_total - edges.len();
    (MemoryGraph { version, nodes, edges }, dropped_nodes, dropped_edges)
}

/// Add a node. Adding an existing id returns the graph unchanged.
pub fn add_node(graph: &MemoryGraph, id: &str, node_type: MemoryType) -> Result<MemoryGraph> {
    validate_node_id(id)?;
    let mut next = graph.clone();
    if !next.contains_node(id) {
        next.nodes.push(GraphNode::new(id, node_type));
    }
    Ok(next)
}

/// Add a node, or change the type of an existing one.
pub fn upsert_node(graph: &MemoryGraph, id: &str, node_type: MemoryType) -> Result<MemoryGraph> {
    validate_node_id(id)?;
    let mut next = graph.clone();
    match next.nodes.iter_mut().find(|n| n.id == id) {
        Some(node) => node.node_type = node_type,
        None => next.nodes.push(GraphNode::new(id, node_type)),
    }
    Ok(next)
}

/// Remove a node and every edge touching it. Unknown ids are a no-op.
pub fn remove_node(graph: &MemoryGraph, id: &str) -> MemoryGraph {
    MemoryGraph {
        version: graph.version,
        nodes: graph.nodes.iter().filter(|n| n.id != id).cloned().collect(),
        edges: graph.edges.iter().filter(|e| !e.touches(id)).cloned().collect(),
    }
}

pub fn has_node(graph: &MemoryGraph, id: &str) -> bool {
    graph.contains_node(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::labels::EdgeLabel;
    use tempfile::TempDir;

    fn sample() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        g.nodes.push(GraphNode::new("a", MemoryType::Decision));
        g.nodes.push(GraphNode::new("b", MemoryType::Learning));
        g.nodes.push(GraphNode::new("c", MemoryType::Artifact));
        g.edges.push(GraphEdge::new("a", "b", EdgeLabel::RELATES_TO));
        g.edges.push(GraphEdge::new("c", "a", EdgeLabel::IMPLEMENTS));
        g
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("graph.json");
        let g = sample();

        save(&path, &g).unwrap();
        let (loaded, status) = load_with_status(&path);
        assert_eq!(loaded, g);
        assert_eq!(status, LoadStatus::Loaded);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let (g, status) = load_with_status(tmp.path().join("graph.json"));
        assert!(g.is_empty());
        assert_eq!(status, LoadStatus::Missing);
    }

    #[test]
    fn corrupt_snapshot_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("graph.json");
        std::fs::write(&path, "{ not json").unwrap();

        let (g, status) = load_with_status(&path);
        assert!(g.is_empty());
        assert!(matches!(status, LoadStatus::Corrupt { .. }));
    }

    #[test]
    fn damaged_snapshot_is_repaired() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("graph.json");
        std::fs::write(
            &path,
            r#"{
                "version": 1,
                "nodes": [
                    {"id": "a", "type": "decision"},
                    {"id": "a", "type": "hub"},
                    {"id": "b", "type": "gotcha"}
                ],
                "edges": [
                    {"source": "a", "target": "b", "label": "relates-to"},
                    {"source": "a", "target": "b", "label": "relates-to"},
                    {"source": "a", "target": "a", "label": "relates-to"},
                    {"source": "a", "target": "ghost", "label": "relates-to"}
                ]
            }"#,
        )
        .unwrap();

        let (g, status) = load_with_status(&path);
        assert_eq!(
            status,
            LoadStatus::Repaired { dropped_nodes: 1, dropped_edges: 3 }
        );
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.node("a").unwrap().node_type, MemoryType::Decision);
        assert_eq!(g.edges.len(), 1);
    }

    #[test]
    fn save_rejects_invalid_graph() {
        let tmp = TempDir::new().unwrap();
        let mut g = sample();
        g.edges.push(GraphEdge::new("a", "ghost", EdgeLabel::RELATES_TO));

        let err = save(tmp.path().join("graph.json"), &g).unwrap_err();
        assert!(err.is_validation());
        assert!(!tmp.path().join("graph.json").exists());
    }

    #[test]
    fn validate_reports_each_issue() {
        let mut g = sample();
        g.nodes.push(GraphNode::new("b", MemoryType::Hub));
        g.edges.push(GraphEdge::new("b", "b", EdgeLabel::RELATES_TO));
        g.edges.push(GraphEdge::new("a", "b", EdgeLabel::RELATES_TO));

        let issues = validate(&g);
        assert_eq!(issues.len(), 3);
        assert!(matches!(issues[0], GraphIssue::DuplicateNode { .. }));
        assert!(matches!(issues[1], GraphIssue::SelfLoop { .. }));
        assert!(matches!(issues[2], GraphIssue::DuplicateEdge { .. }));
    }

    #[test]
    fn add_node_is_pure_and_idempotent() {
        let g = MemoryGraph::new();
        let g1 = add_node(&g, "x", MemoryType::Hub).unwrap();
        assert!(g.nodes.is_empty());
        assert!(has_node(&g1, "x"));

        let g2 = add_node(&g1, "x", MemoryType::Decision).unwrap();
        assert_eq!(g2, g1);
        assert!(add_node(&g, "bad id", MemoryType::Hub).is_err());
    }

    #[test]
    fn upsert_node_retypes() {
        let g = add_node(&MemoryGraph::new(), "x", MemoryType::Learning).unwrap();
        let g = upsert_node(&g, "x", MemoryType::Hub).unwrap();
        assert_eq!(g.nodes.len(), 1);
        assert_eq!(g.node("x").unwrap().node_type, MemoryType::Hub);
    }

    #[test]
    fn remove_node_cascades_edges() {
        let g = remove_node(&sample(), "a");
        assert!(!has_node(&g, "a"));
        assert!(g.edges.iter().all(|e| !e.touches("a")));
        assert_eq!(g.nodes.len(), 2);

        let unchanged = remove_node(&g, "ghost");
        assert_eq!(unchanged, g);
    }
}
