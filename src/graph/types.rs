//! Graph value types.
//!
//! A [`MemoryGraph`] is a plain value: every mutation in [`super::store`] and
//! [`super::edges`] returns a new graph, and indices (adjacency, orphan sets)
//! are recomputed from `nodes`/`edges` on demand.

use serde::{Deserialize, Serialize};

use super::labels::EdgeLabel;
use crate::error::{GraphError, Result};
use crate::memory::MemoryType;

/// Snapshot format version written by this crate.
pub const GRAPH_VERSION: u32 = 1;

/// A memory's presence in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: MemoryType,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: MemoryType) -> Self {
        Self {
            id: id.into(),
            node_type,
        }
    }
}

/// A directed, labelled relationship. Identity is the full triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: EdgeLabel,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, label: EdgeLabel) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label,
        }
    }

    pub fn matches(&self, source: &str, target: &str, label: &EdgeLabel) -> bool {
        self.source == source && self.target == target && &self.label == label
    }

    /// `true` if either endpoint is `id`.
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// The endpoint that is not `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// One scope's relationship graph, persisted as a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryGraph {
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self {
            version: GRAPH_VERSION,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Returns `NodeNotFound` unless `id` is a node of this graph.
    pub fn require_node(&self, id: &str) -> Result<&GraphNode> {
        self.node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }
}

/// Node ids are slugs: non-empty, no whitespace, no path separators.
pub fn validate_node_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && !id.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\' || c.is_control());
    if valid {
        Ok(())
    } else {
        Err(GraphError::InvalidNodeId(id.to_string()))
    }
}
