//! The memory relationship graph.
//!
//! - [`types`]: nodes, edges and the [`MemoryGraph`] snapshot value
//! - [`labels`]: edge label vocabulary and lookup tables
//! - [`store`]: snapshot load/save and node mutation
//! - [`edges`]: edge mutation and adjacency queries
//! - [`traversal`]: BFS/DFS, paths, components, subgraphs, impact
//! - [`diagram`]: Mermaid flowchart rendering
//! - [`stats`]: summary counts

pub mod diagram;
pub mod edges;
pub mod labels;
pub mod stats;
pub mod store;
pub mod traversal;
pub mod types;

pub use labels::EdgeLabel;
pub use types::{GraphEdge, GraphNode, MemoryGraph};
