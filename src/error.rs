//! Typed errors for graph and cache operations.
//!
//! Structural violations (missing endpoints, self-loops, bad labels) and
//! not-found lookups are returned to the immediate caller. Provider
//! unavailability is never an error here; see [`crate::linking::SkipReason`].

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An edge endpoint does not exist as a node.
    #[error("{role} node not found: {id}")]
    MissingEndpoint { role: &'static str, id: String },

    /// Edges from a node to itself are rejected.
    #[error("self-loop rejected on node: {0}")]
    SelfLoop(String),

    #[error("invalid edge label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: &'static str },

    #[error("invalid node id {0:?}: must be a non-empty slug without whitespace or '/'")]
    InvalidNodeId(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// The graph failed validation and was not persisted.
    #[error("graph has {count} structural issue(s), first: {first}")]
    InvalidGraph { count: usize, first: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("embedding cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    /// The memory store could not be read.
    #[error("memory source error: {0:#}")]
    Source(anyhow::Error),
}

impl GraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` for errors caused by the request itself rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingEndpoint { .. }
                | Self::SelfLoop(_)
                | Self::InvalidLabel { .. }
                | Self::InvalidNodeId(_)
                | Self::InvalidGraph { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_))
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
