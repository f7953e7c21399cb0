#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use mnemograph::db;
use mnemograph::embedding::cache::EmbeddingCache;
use mnemograph::embedding::EmbeddingProvider;
use mnemograph::graph::edges::add_edge;
use mnemograph::graph::store::add_node;
use mnemograph::graph::{EdgeLabel, MemoryGraph};
use mnemograph::memory::{MemoryRecord, MemoryType};
use rusqlite::Connection;

pub const MODEL: &str = "test-model";

/// Open a fresh in-memory cache database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

pub fn test_cache() -> EmbeddingCache {
    EmbeddingCache::in_memory(MODEL).unwrap()
}

/// Build a graph from `(id, type)` nodes and `(source, target, label)` edges.
pub fn graph(nodes: &[(&str, MemoryType)], edges: &[(&str, &str, &str)]) -> MemoryGraph {
    let mut g = MemoryGraph::new();
    for (id, t) in nodes {
        g = add_node(&g, id, *t).unwrap();
    }
    for (s, t, label) in edges {
        g = add_edge(&g, s, t, &EdgeLabel::new(*label).unwrap()).unwrap();
    }
    g
}

pub fn memory(id: &str, memory_type: MemoryType, content: &str) -> MemoryRecord {
    MemoryRecord::new(id, memory_type, content)
}

/// Provider returning a fixed vector per text. Unknown texts fail.
pub struct TableProvider {
    vectors: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

impl TableProvider {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Vec<f32>)>) -> Self {
        Self {
            vectors: entries
                .into_iter()
                .map(|(text, v)| (text.to_string(), v))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for TableProvider {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no vector for {text:?}"))
    }

    fn model(&self) -> &str {
        MODEL
    }
}

/// Provider whose every call fails, as if the endpoint were down.
pub struct DownProvider;

impl EmbeddingProvider for DownProvider {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("connection refused")
    }

    fn model(&self) -> &str {
        MODEL
    }
}

/// Unit vector at `angle_deg` degrees in the plane. Cosine between two of
/// these is the cosine of the angle between them.
pub fn at_angle(angle_deg: f32) -> Vec<f32> {
    let r = angle_deg.to_radians();
    vec![r.cos(), r.sin()]
}
