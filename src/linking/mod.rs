//! Semantic linking: embeddings in, similarity edges out.
//!
//! - [`similarity`]: cosine similarity and threshold ranking
//! - [`auto_link`]: link one memory to its closest neighbours on write
//! - [`suggest`]: batch pass proposing (or creating) links between all memories
//! - [`refresh`]: re-embed missing or stale cache entries
//!
//! A failing provider never fails these workflows. It shows up as a
//! [`SkipReason`] in the returned report and the graph comes back unchanged.

pub mod auto_link;
pub mod refresh;
pub mod similarity;
pub mod suggest;

pub use auto_link::{auto_link, AutoLinkOptions, AutoLinkReport};
pub use refresh::{refresh_embeddings, RefreshReport};
pub use similarity::{cosine_similarity, rank, RankedMatch};
pub use suggest::{suggest_links, LinkProposal, SuggestOptions, SuggestReport};

use serde::Serialize;
use tracing::{debug, warn};

use crate::embedding::cache::{content_hash, EmbeddingCache, EmbeddingCacheEntry};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::graph::MemoryGraph;
use crate::memory::{MemorySource, MemoryType};

/// Why a linking workflow did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    ProviderUnavailable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProviderUnavailable(reason) => write!(f, "embedding provider unavailable: {reason}"),
        }
    }
}

/// Result of [`ensure_embedding`].
#[derive(Debug, Clone)]
pub enum EmbedOutcome {
    /// The cached vector matches the current content.
    Cached(EmbeddingCacheEntry),
    /// Computed now and written to the cache.
    Fresh(EmbeddingCacheEntry),
    Unavailable(String),
}

impl EmbedOutcome {
    pub fn entry(&self) -> Option<&EmbeddingCacheEntry> {
        match self {
            Self::Cached(entry) | Self::Fresh(entry) => Some(entry),
            Self::Unavailable(_) => None,
        }
    }
}

/// Return a vector for `content`, reusing the cache when the fingerprint matches.
///
/// Cache errors propagate; provider errors become [`EmbedOutcome::Unavailable`].
pub fn ensure_embedding(
    cache: &EmbeddingCache,
    provider: &dyn EmbeddingProvider,
    memory_id: &str,
    content: &str,
) -> Result<EmbedOutcome> {
    let model = provider.model();
    let hash = content_hash(content);

    if let Some(entry) = cache.get(memory_id, model)? {
        if entry.content_hash == hash {
            debug!(memory_id, "embedding cache hit");
            return Ok(EmbedOutcome::Cached(entry));
        }
        debug!(memory_id, "cached embedding is stale");
    }

    match provider.embed(content) {
        Ok(vector) if vector.is_empty() => {
            warn!(memory_id, model, "provider returned an empty vector");
            Ok(EmbedOutcome::Unavailable("provider returned an empty vector".into()))
        }
        Ok(vector) => {
            let entry = cache.put(memory_id, model, &vector, &hash)?;
            Ok(EmbedOutcome::Fresh(entry))
        }
        Err(e) => {
            warn!(memory_id, model, error = %e, "embedding provider unavailable");
            Ok(EmbedOutcome::Unavailable(format!("{e:#}")))
        }
    }
}

/// Type for a node about to be created: existing graph node first, then the memory store.
///
/// `None` when the id is unknown to both, e.g. a cache entry left behind by a
/// deleted memory.
pub(crate) fn resolve_node_type(
    graph: &MemoryGraph,
    source: &dyn MemorySource,
    id: &str,
) -> Option<MemoryType> {
    if let Some(node) = graph.node(id) {
        return Some(node.node_type);
    }
    match source.get(id) {
        Ok(record) => record.map(|r| r.memory_type),
        Err(e) => {
            warn!(id, error = %e, "memory lookup failed");
            None
        }
    }
}
