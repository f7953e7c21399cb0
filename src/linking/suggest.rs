//! Batch link suggestion across every memory of a scope.
//!
//! Missing or stale embeddings are refreshed first. Every memory is then
//! ranked against all others; pairs above threshold that are not already
//! connected (in either direction, under any label) become proposals. With
//! `auto_create` the proposals are written as edges. Re-running is safe: an
//! edge created once is excluded from the next run's proposals.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use super::similarity::rank;
use super::{ensure_embedding, EmbedOutcome, SkipReason};
use crate::embedding::cache::EmbeddingCache;
use crate::embedding::EmbeddingProvider;
use crate::error::{GraphError, Result};
use crate::graph::edges::{add_edge, are_connected};
use crate::graph::labels::EdgeLabel;
use crate::graph::store::add_node;
use crate::graph::MemoryGraph;
use crate::memory::{MemorySource, MemoryType};

#[derive(Debug, Clone, Copy)]
pub struct SuggestOptions {
    pub threshold: f64,
    /// Most proposals contributed by each memory.
    pub limit: usize,
    /// Create the proposed edges instead of only returning them.
    pub auto_create: bool,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            threshold: 0.80,
            limit: 5,
            auto_create: false,
        }
    }
}

/// A proposed `source → target` link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkProposal {
    pub source: String,
    pub target: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestReport {
    /// Best score first.
    pub proposals: Vec<LinkProposal>,
    /// Edges written (only with `auto_create`).
    pub created: usize,
    /// Embeddings computed during this run.
    pub stale_refreshed: usize,
    /// Set when the provider failed; remaining proposals use cached vectors as-is.
    pub skipped: Option<SkipReason>,
}

pub fn suggest_links(
    graph: &MemoryGraph,
    cache: &EmbeddingCache,
    provider: &dyn EmbeddingProvider,
    source: &dyn MemorySource,
    options: &SuggestOptions,
) -> Result<(MemoryGraph, SuggestReport)> {
    let memories = source.list().map_err(GraphError::Source)?;
    let mut report = SuggestReport::default();

    for memory in &memories {
        if report.skipped.is_some() {
            break;
        }
        match ensure_embedding(cache, provider, &memory.id, &memory.content)? {
            EmbedOutcome::Cached(_) => {}
            EmbedOutcome::Fresh(_) => report.stale_refreshed += 1,
            EmbedOutcome::Unavailable(reason) => {
                report.skipped = Some(SkipReason::ProviderUnavailable(reason));
            }
        }
    }

    let types: HashMap<&str, MemoryType> = memories
        .iter()
        .map(|m| (m.id.as_str(), m.memory_type))
        .collect();
    let entries: Vec<_> = cache
        .all(provider.model())?
        .into_iter()
        .filter(|e| types.contains_key(e.memory_id.as_str()))
        .collect();

    let mut seen_pairs: BTreeSet<(String, String)> = BTreeSet::new();
    for entry in &entries {
        let others = entries
            .iter()
            .filter(|o| o.memory_id != entry.memory_id)
            .filter(|o| !are_connected(graph, &entry.memory_id, &o.memory_id))
            .map(|o| (o.memory_id.as_str(), o.vector.as_slice()));

        for m in rank(&entry.vector, others, options.threshold, options.limit) {
            let pair = if entry.memory_id < m.id {
                (entry.memory_id.clone(), m.id.clone())
            } else {
                (m.id.clone(), entry.memory_id.clone())
            };
            if seen_pairs.insert(pair) {
                report.proposals.push(LinkProposal {
                    source: entry.memory_id.clone(),
                    target: m.id,
                    score: m.score,
                });
            }
        }
    }
    report
        .proposals
        .sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut next = graph.clone();
    if options.auto_create {
        let label = EdgeLabel::AUTO_LINKED;
        for proposal in &report.proposals {
            for id in [&proposal.source, &proposal.target] {
                if let Some(&node_type) = types.get(id.as_str()) {
                    next = add_node(&next, id, node_type)?;
                }
            }
            next = add_edge(&next, &proposal.source, &proposal.target, &label)?;
            report.created += 1;
            debug!(source = %proposal.source, target = %proposal.target, "suggested link created");
        }
    }

    info!(
        memories = memories.len(),
        proposals = report.proposals.len(),
        created = report.created,
        refreshed = report.stale_refreshed,
        "link suggestion complete"
    );
    Ok((next, report))
}
