//! Link a newly written memory to its closest existing neighbours.

use serde::Serialize;
use tracing::{debug, info};

use super::similarity::{rank, RankedMatch};
use super::{ensure_embedding, resolve_node_type, EmbedOutcome, SkipReason};
use crate::embedding::cache::EmbeddingCache;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::graph::edges::{add_edge, has_edge};
use crate::graph::labels::EdgeLabel;
use crate::graph::store::{add_node, upsert_node};
use crate::graph::MemoryGraph;
use crate::memory::{MemoryRecord, MemorySource};

#[derive(Debug, Clone, Copy)]
pub struct AutoLinkOptions {
    /// Minimum cosine similarity for an edge.
    pub threshold: f64,
    /// Most edges created per call.
    pub max_links: usize,
}

impl Default for AutoLinkOptions {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            max_links: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoLinkReport {
    pub memory_id: String,
    /// Edges that did not exist before this call.
    pub created: usize,
    /// Linkable neighbours above threshold, best first.
    pub candidates: Vec<RankedMatch>,
    /// The memory's vector came from the cache.
    pub cache_hit: bool,
    pub skipped: Option<SkipReason>,
}

impl AutoLinkReport {
    fn skipped(memory_id: &str, reason: SkipReason) -> Self {
        Self {
            memory_id: memory_id.to_string(),
            created: 0,
            candidates: Vec::new(),
            cache_hit: false,
            skipped: Some(reason),
        }
    }
}

/// Embed `memory` (cache-aware), rank it against every other cached vector,
/// and add an `auto-linked-by-similarity` edge from it to each match.
///
/// The memory's node is created or retyped. Cached vectors whose memory is
/// unknown to both graph and `source` are ignored and never take one of the
/// `max_links` slots. When the provider is
/// unavailable the input graph is returned unchanged with `skipped` set.
pub fn auto_link(
    graph: &MemoryGraph,
    cache: &EmbeddingCache,
    provider: &dyn EmbeddingProvider,
    source: &dyn MemorySource,
    memory: &MemoryRecord,
    options: &AutoLinkOptions,
) -> Result<(MemoryGraph, AutoLinkReport)> {
    let outcome = ensure_embedding(cache, provider, &memory.id, &memory.content)?;
    let (query, cache_hit) = match outcome {
        EmbedOutcome::Cached(entry) => (entry.vector, true),
        EmbedOutcome::Fresh(entry) => (entry.vector, false),
        EmbedOutcome::Unavailable(reason) => {
            let report = AutoLinkReport::skipped(&memory.id, SkipReason::ProviderUnavailable(reason));
            return Ok((graph.clone(), report));
        }
    };

    let entries = cache.all(provider.model())?;
    let others = entries
        .iter()
        .filter(|e| e.memory_id != memory.id)
        .map(|e| (e.memory_id.as_str(), e.vector.as_slice()));
    let mut linkable = Vec::new();
    for found in rank(&query, others, options.threshold, usize::MAX) {
        if linkable.len() == options.max_links {
            break;
        }
        match resolve_node_type(graph, source, &found.id) {
            Some(node_type) => linkable.push((found, node_type)),
            None => debug!(memory_id = %memory.id, target = %found.id, "match has no memory, skipped"),
        }
    }

    let label = EdgeLabel::AUTO_LINKED;
    let mut next = upsert_node(graph, &memory.id, memory.memory_type)?;
    let mut created = 0;
    for (candidate, node_type) in &linkable {
        next = add_node(&next, &candidate.id, *node_type)?;
        if has_edge(&next, &memory.id, &candidate.id, Some(&label)) {
            continue;
        }
        next = add_edge(&next, &memory.id, &candidate.id, &label)?;
        created += 1;
    }
    let candidates: Vec<RankedMatch> = linkable.into_iter().map(|(c, _)| c).collect();

    info!(
        memory_id = %memory.id,
        candidates = candidates.len(),
        created,
        cache_hit,
        "auto-link complete"
    );

    Ok((
        next,
        AutoLinkReport {
            memory_id: memory.id.clone(),
            created,
            candidates,
            cache_hit,
            skipped: None,
        },
    ))
}
