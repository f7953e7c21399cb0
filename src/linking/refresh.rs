//! Bring the embedding cache up to date with the memory store.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use super::SkipReason;
use crate::embedding::cache::{content_hash, EmbeddingCache};
use crate::embedding::EmbeddingProvider;
use crate::error::{GraphError, Result};
use crate::memory::{MemoryRecord, MemorySource};

const BATCH_SIZE: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub total: usize,
    pub refreshed: usize,
    pub up_to_date: usize,
    /// Entries removed because their memory no longer exists.
    pub pruned: usize,
    pub skipped: Option<SkipReason>,
}

/// Re-embed every memory whose cache entry is missing or stale (all of them
/// with `force`), in batches. `on_progress` receives the size of each batch
/// processed. Stops at the first provider failure, keeping what was written.
pub fn refresh_embeddings(
    cache: &EmbeddingCache,
    provider: &dyn EmbeddingProvider,
    source: &dyn MemorySource,
    force: bool,
    prune: bool,
    mut on_progress: impl FnMut(usize),
) -> Result<RefreshReport> {
    let model = provider.model();
    let memories = source.list().map_err(GraphError::Source)?;

    let pending: Vec<&MemoryRecord> = if force {
        memories.iter().collect()
    } else {
        let stale: HashSet<String> = cache.stale_entries(model, &memories)?.into_iter().collect();
        memories.iter().filter(|m| stale.contains(&m.id)).collect()
    };

    let mut report = RefreshReport {
        total: memories.len(),
        up_to_date: memories.len() - pending.len(),
        ..RefreshReport::default()
    };

    for chunk in pending.chunks(BATCH_SIZE) {
        let texts: Vec<&str> = chunk.iter().map(|m| m.content.as_str()).collect();
        let vectors = match provider.embed_batch(&texts) {
            Ok(vectors) if vectors.len() == chunk.len() => vectors,
            Ok(vectors) => {
                let reason = format!("provider returned {} vectors for {} texts", vectors.len(), chunk.len());
                warn!(%reason, "embedding refresh stopped");
                report.skipped = Some(SkipReason::ProviderUnavailable(reason));
                break;
            }
            Err(e) => {
                warn!(error = %e, "embedding refresh stopped");
                report.skipped = Some(SkipReason::ProviderUnavailable(format!("{e:#}")));
                break;
            }
        };

        for (memory, vector) in chunk.iter().zip(&vectors) {
            if vector.is_empty() {
                warn!(memory_id = %memory.id, "provider returned an empty vector");
                continue;
            }
            cache.put(&memory.id, model, vector, &content_hash(&memory.content))?;
            report.refreshed += 1;
        }
        on_progress(chunk.len());
    }

    if prune {
        let existing: HashSet<&str> = memories.iter().map(|m| m.id.as_str()).collect();
        report.pruned = cache.prune(&existing)?;
    }

    info!(
        total = report.total,
        refreshed = report.refreshed,
        up_to_date = report.up_to_date,
        pruned = report.pruned,
        "embedding refresh complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::DisabledProvider;
    use crate::memory::MemoryType;

    struct Lengths;

    impl EmbeddingProvider for Lengths {
        fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn model(&self) -> &str {
            "lengths"
        }
    }

    #[test]
    fn refreshes_only_what_changed() {
        let cache = EmbeddingCache::in_memory("lengths").unwrap();
        let mut memories = vec![
            MemoryRecord::new("a", MemoryType::Learning, "one"),
            MemoryRecord::new("b", MemoryType::Learning, "two"),
        ];

        let mut batches = Vec::new();
        let report = refresh_embeddings(&cache, &Lengths, &memories, false, false, |n| batches.push(n)).unwrap();
        assert_eq!(report.refreshed, 2);
        assert_eq!(report.up_to_date, 0);
        assert_eq!(batches, vec![2]);

        memories[1].content = "two, edited".into();
        let report = refresh_embeddings(&cache, &Lengths, &memories, false, false, |_| {}).unwrap();
        assert_eq!(report.refreshed, 1);
        assert_eq!(report.up_to_date, 1);
        assert_eq!(cache.get("b", "lengths").unwrap().unwrap().vector, vec![11.0, 1.0]);

        let report = refresh_embeddings(&cache, &Lengths, &memories, true, false, |_| {}).unwrap();
        assert_eq!(report.refreshed, 2);
    }

    #[test]
    fn prune_drops_deleted_memories() {
        let cache = EmbeddingCache::in_memory("lengths").unwrap();
        cache.put("gone", "lengths", &[1.0, 1.0], "h").unwrap();
        let memories = vec![MemoryRecord::new("a", MemoryType::Hub, "index")];

        let report = refresh_embeddings(&cache, &Lengths, &memories, false, true, |_| {}).unwrap();
        assert_eq!(report.pruned, 1);
        assert!(cache.get("gone", "lengths").unwrap().is_none());
        assert!(cache.get("a", "lengths").unwrap().is_some());
    }

    #[test]
    fn unavailable_provider_stops_cleanly() {
        let cache = EmbeddingCache::in_memory("off").unwrap();
        let memories = vec![MemoryRecord::new("a", MemoryType::Hub, "index")];
        let report =
            refresh_embeddings(&cache, &DisabledProvider::new("off"), &memories, false, false, |_| {}).unwrap();
        assert_eq!(report.refreshed, 0);
        assert!(report.skipped.is_some());
        assert_eq!(cache.count().unwrap(), 0);
    }
}
