//! Per-memory embedding cache with content fingerprints.
//!
//! Each entry stores the vector, the model that produced it, and a SHA-256
//! fingerprint of the content it was computed from. An entry is stale when the
//! fingerprint of the memory's current content differs; staleness is a hint to
//! recompute, never an error. Rows that cannot be decoded are treated as absent.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;

use crate::db::{self, migrations, OpenStatus};
use crate::error::Result;
use crate::memory::MemoryRecord;

/// One cached vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingCacheEntry {
    pub memory_id: String,
    pub model: String,
    pub vector: Vec<f32>,
    pub content_hash: String,
    pub timestamp: DateTime<Utc>,
}

/// Hex SHA-256 of `content`.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `true` when `entry` was computed from different content than `memory` holds now.
pub fn is_stale(memory: &MemoryRecord, entry: &EmbeddingCacheEntry) -> bool {
    content_hash(&memory.content) != entry.content_hash
}

pub struct EmbeddingCache {
    conn: Connection,
}

impl EmbeddingCache {
    /// Open the cache file for a scope and drop entries from other models.
    pub fn open(path: impl AsRef<Path>, model: &str) -> Result<(Self, OpenStatus)> {
        let (conn, status) = db::open_cache_database(path)?;
        let cache = Self { conn };
        cache.sync_model(model)?;
        Ok((cache, status))
    }

    /// An empty, in-memory cache.
    pub fn in_memory(model: &str) -> Result<Self> {
        let cache = Self {
            conn: db::open_memory_database()?,
        };
        cache.sync_model(model)?;
        Ok(cache)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Record `model` as current, invalidating entries of any other model.
    fn sync_model(&self, model: &str) -> Result<()> {
        let stored = migrations::get_embedding_model(&self.conn)?;
        if stored.as_deref() != Some(model) {
            let removed = self.invalidate_other_models(model)?;
            if let Some(stored) = stored {
                tracing::warn!(
                    stored = %stored,
                    configured = %model,
                    removed,
                    "embedding model changed, cached vectors invalidated"
                );
            }
            migrations::set_embedding_model(&self.conn, model)?;
        }
        Ok(())
    }

    pub fn get(&self, memory_id: &str, model: &str) -> Result<Option<EmbeddingCacheEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT memory_id, model, vector, dimensions, content_hash, created_at \
                 FROM embeddings WHERE memory_id = ?1 AND model = ?2",
                params![memory_id, model],
                RawRow::from_row,
            )
            .optional()?;
        Ok(row.and_then(RawRow::decode))
    }

    /// Create or overwrite the entry for `(memory_id, model)` with a fresh timestamp.
    pub fn put(
        &self,
        memory_id: &str,
        model: &str,
        vector: &[f32],
        content_hash: &str,
    ) -> Result<EmbeddingCacheEntry> {
        let timestamp = Utc::now();
        self.conn.execute(
            "INSERT OR REPLACE INTO embeddings \
             (memory_id, model, vector, dimensions, content_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                memory_id,
                model,
                db::vector_to_bytes(vector),
                vector.len() as i64,
                content_hash,
                timestamp.to_rfc3339(),
            ],
        )?;
        tracing::debug!(memory_id, model, dims = vector.len(), "embedding cached");

        Ok(EmbeddingCacheEntry {
            memory_id: memory_id.to_string(),
            model: model.to_string(),
            vector: vector.to_vec(),
            content_hash: content_hash.to_string(),
            timestamp,
        })
    }

    /// Remove every entry for a memory. Returns `true` if anything was removed.
    pub fn remove(&self, memory_id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM embeddings WHERE memory_id = ?1", params![memory_id])?;
        Ok(n > 0)
    }

    /// All decodable entries for `model`, ordered by memory id.
    pub fn all(&self, model: &str) -> Result<Vec<EmbeddingCacheEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT memory_id, model, vector, dimensions, content_hash, created_at \
             FROM embeddings WHERE model = ?1 ORDER BY memory_id",
        )?;
        let rows = stmt
            .query_map(params![model], RawRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows.into_iter().filter_map(RawRow::decode).collect())
    }

    /// Delete entries produced by any model other than `model`.
    pub fn invalidate_other_models(&self, model: &str) -> Result<usize> {
        let n = self
            .conn
            .execute("DELETE FROM embeddings WHERE model != ?1", params![model])?;
        Ok(n)
    }

    /// Delete entries whose memory is not in `existing`.
    pub fn prune(&self, existing: &HashSet<&str>) -> Result<usize> {
        let ids: Vec<String> = {
            let mut stmt = self.conn.prepare("SELECT DISTINCT memory_id FROM embeddings")?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let mut removed = 0;
        for id in ids.iter().filter(|id| !existing.contains(id.as_str())) {
            if self.remove(id)? {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, "pruned embeddings of deleted memories");
        }
        Ok(removed)
    }

    /// Ids of `memories` whose entry for `model` is missing or stale, in input order.
    pub fn stale_entries(&self, model: &str, memories: &[MemoryRecord]) -> Result<Vec<String>> {
        let mut stale = Vec::new();
        for memory in memories {
            match self.get(&memory.id, model)? {
                Some(entry) if !is_stale(memory, &entry) => {}
                _ => stale.push(memory.id.clone()),
            }
        }
        Ok(stale)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// A row as stored, before validation.
struct RawRow {
    memory_id: String,
    model: String,
    vector: Vec<u8>,
    dimensions: i64,
    content_hash: String,
    created_at: String,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            memory_id: row.get(0)?,
            model: row.get(1)?,
            vector: row.get(2)?,
            dimensions: row.get(3)?,
            content_hash: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn decode(self) -> Option<EmbeddingCacheEntry> {
        let vector = db::bytes_to_vector(&self.vector);
        let timestamp = DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc));

        match (vector, timestamp) {
            (Some(vector), Some(timestamp))
                if !vector.is_empty() && vector.len() as i64 == self.dimensions =>
            {
                Some(EmbeddingCacheEntry {
                    memory_id: self.memory_id,
                    model: self.model,
                    vector,
                    content_hash: self.content_hash,
                    timestamp,
                })
            }
            _ => {
                tracing::warn!(memory_id = %self.memory_id, "undecodable cache entry ignored");
                None
            }
        }
    }
}
