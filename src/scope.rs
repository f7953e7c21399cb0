//! One storage scope: the graph snapshot, the embedding cache and the memory
//! directory that live side by side under a single directory.
//!
//! ```text
//! <scope>/graph.json
//! <scope>/embeddings.db
//! <scope>/memories/<type>/<id>.md
//! ```
//!
//! Every mutating operation is load, modify, save. Nothing is held between
//! calls, so two processes working on one scope resolve as last-write-wins.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::{self, CacheHealth, OpenStatus};
use crate::embedding::cache::{is_stale, EmbeddingCache};
use crate::embedding::EmbeddingProvider;
use crate::error::{GraphError, Result};
use crate::graph::edges::{add_edge, remove_edge};
use crate::graph::labels::EdgeLabel;
use crate::graph::stats::{graph_stats, GraphStats};
use crate::graph::store::{self, add_node, remove_node, GraphIssue, LoadStatus};
use crate::graph::MemoryGraph;
use crate::linking::{self, AutoLinkOptions, AutoLinkReport, RankedMatch, RefreshReport, SuggestOptions, SuggestReport};
use crate::memory::{MemoryDir, MemoryRecord, MemorySource};

pub const GRAPH_FILE: &str = "graph.json";
pub const CACHE_FILE: &str = "embeddings.db";
pub const MEMORIES_DIR: &str = "memories";

pub struct Scope {
    dir: PathBuf,
    source: Box<dyn MemorySource + Send + Sync>,
}

/// What [`Scope::link`] wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkOutcome {
    /// New edges, 0 when the link already existed.
    pub created: usize,
    /// Label of the reverse edge, when one was requested and the label has a reciprocal.
    pub reverse_label: Option<EdgeLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForgetReport {
    pub node_removed: bool,
    pub edges_removed: usize,
    pub cache_removed: bool,
}

#[derive(Debug, Serialize)]
pub struct ScopeHealth {
    pub dir: PathBuf,
    pub graph: LoadStatus,
    pub issues: Vec<GraphIssue>,
    pub stats: GraphStats,
    pub cache_status: OpenStatus,
    pub cache: CacheHealth,
    /// Graph nodes with no backing memory.
    pub unknown_nodes: Vec<String>,
    /// Memories whose cached vector is missing or stale.
    pub stale_embeddings: usize,
}

impl Scope {
    /// A scope whose memories are the Markdown files under `<dir>/memories`.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let source = MemoryDir::new(dir.join(MEMORIES_DIR));
        Self {
            dir,
            source: Box::new(source),
        }
    }

    /// A scope reading memories from another store.
    pub fn with_source(dir: impl Into<PathBuf>, source: Box<dyn MemorySource + Send + Sync>) -> Self {
        Self {
            dir: dir.into(),
            source,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn graph_path(&self) -> PathBuf {
        self.dir.join(GRAPH_FILE)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE)
    }

    pub fn source(&self) -> &dyn MemorySource {
        self.source.as_ref()
    }

    pub fn load_graph(&self) -> MemoryGraph {
        store::load(self.graph_path())
    }

    pub fn load_graph_with_status(&self) -> (MemoryGraph, LoadStatus) {
        store::load_with_status(self.graph_path())
    }

    pub fn save_graph(&self, graph: &MemoryGraph) -> Result<()> {
        store::save(self.graph_path(), graph)
    }

    pub fn open_cache(&self, model: &str) -> Result<(EmbeddingCache, OpenStatus)> {
        EmbeddingCache::open(self.cache_path(), model)
    }

    fn memory(&self, id: &str) -> Result<Option<MemoryRecord>> {
        self.source.get(id).map_err(GraphError::Source)
    }

    /// Ensure `id` is a node, typing it from the memory store if it is new.
    fn with_node(&self, graph: &MemoryGraph, id: &str, role: &'static str) -> Result<MemoryGraph> {
        if graph.contains_node(id) {
            return Ok(graph.clone());
        }
        match self.memory(id)? {
            Some(memory) => add_node(graph, id, memory.memory_type),
            None => Err(GraphError::MissingEndpoint {
                role,
                id: id.to_string(),
            }),
        }
    }

    /// Add `source → target`. With `reciprocal`, also add the reverse edge
    /// under the label's reciprocal, if it has one.
    pub fn link(&self, source: &str, target: &str, label: &EdgeLabel, reciprocal: bool) -> Result<LinkOutcome> {
        let graph = self.load_graph();
        let mut next = self.with_node(&graph, source, "source")?;
        next = self.with_node(&next, target, "target")?;

        let before = next.edges.len();
        next = add_edge(&next, source, target, label)?;

        let reverse_label = if reciprocal { label.reciprocal() } else { None };
        if let Some(reverse) = &reverse_label {
            next = add_edge(&next, target, source, reverse)?;
        }

        let created = next.edges.len() - before;
        if next != graph {
            self.save_graph(&next)?;
        }
        info!(source, target, label = %label, created, "link");
        Ok(LinkOutcome { created, reverse_label })
    }

    /// Remove edges `source → target` (only `label` if given). Returns how many went.
    pub fn unlink(&self, source: &str, target: &str, label: Option<&EdgeLabel>) -> Result<usize> {
        let graph = self.load_graph();
        let next = remove_edge(&graph, source, target, label);
        let removed = graph.edges.len() - next.edges.len();
        if removed > 0 {
            self.save_graph(&next)?;
        }
        info!(source, target, removed, "unlink");
        Ok(removed)
    }

    /// Remove a node and its edges from the graph. The cache is left alone.
    pub fn detach(&self, id: &str) -> Result<usize> {
        let graph = self.load_graph();
        graph.require_node(id)?;
        let next = remove_node(&graph, id);
        let edges_removed = graph.edges.len() - next.edges.len();
        self.save_graph(&next)?;
        info!(id, edges_removed, "node detached");
        Ok(edges_removed)
    }

    /// Drop every trace of a deleted memory: its node, its edges and its cache entries.
    pub fn forget(&self, cache: &EmbeddingCache, id: &str) -> Result<ForgetReport> {
        let graph = self.load_graph();
        let node_removed = graph.contains_node(id);
        let next = remove_node(&graph, id);
        let edges_removed = graph.edges.len() - next.edges.len();
        if node_removed {
            self.save_graph(&next)?;
        }
        let cache_removed = cache.remove(id)?;
        info!(id, node_removed, edges_removed, cache_removed, "memory forgotten");
        Ok(ForgetReport {
            node_removed,
            edges_removed,
            cache_removed,
        })
    }

    /// The cached vector for a memory, if present and not stale.
    pub fn get_embedding(&self, cache: &EmbeddingCache, model: &str, id: &str) -> Result<Option<Vec<f32>>> {
        let Some(entry) = cache.get(id, model)? else {
            return Ok(None);
        };
        match self.memory(id)? {
            Some(memory) if is_stale(&memory, &entry) => Ok(None),
            _ => Ok(Some(entry.vector)),
        }
    }

    /// Rank every cached vector of `model` against `vector`.
    pub fn rank_similar(
        &self,
        cache: &EmbeddingCache,
        model: &str,
        vector: &[f32],
        threshold: f64,
        limit: usize,
    ) -> Result<Vec<RankedMatch>> {
        let entries = cache.all(model)?;
        let candidates = entries
            .iter()
            .map(|e| (e.memory_id.as_str(), e.vector.as_slice()));
        Ok(linking::rank(vector, candidates, threshold, limit))
    }

    /// Auto-link a memory that was just written with `content`.
    ///
    /// The memory's type comes from the store, or from its existing node.
    pub fn auto_link(
        &self,
        cache: &EmbeddingCache,
        provider: &dyn EmbeddingProvider,
        id: &str,
        content: &str,
        options: &AutoLinkOptions,
    ) -> Result<AutoLinkReport> {
        let graph = self.load_graph();
        let memory_type = match self.memory(id)? {
            Some(memory) => memory.memory_type,
            None => graph.require_node(id)?.node_type,
        };
        let memory = MemoryRecord::new(id, memory_type, content);

        let (next, report) = linking::auto_link(&graph, cache, provider, self.source(), &memory, options)?;
        if next != graph {
            self.save_graph(&next)?;
        }
        Ok(report)
    }

    pub fn suggest_links(
        &self,
        cache: &EmbeddingCache,
        provider: &dyn EmbeddingProvider,
        options: &SuggestOptions,
    ) -> Result<SuggestReport> {
        let graph = self.load_graph();
        let (next, report) = linking::suggest_links(&graph, cache, provider, self.source(), options)?;
        if next != graph {
            self.save_graph(&next)?;
        }
        Ok(report)
    }

    pub fn refresh_embeddings(
        &self,
        cache: &EmbeddingCache,
        provider: &dyn EmbeddingProvider,
        force: bool,
        prune: bool,
        on_progress: impl FnMut(usize),
    ) -> Result<RefreshReport> {
        linking::refresh_embeddings(cache, provider, self.source(), force, prune, on_progress)
    }

    /// Diagnostics over graph, cache and memory store.
    pub fn health(&self, model: &str) -> Result<ScopeHealth> {
        let (graph, load_status) = self.load_graph_with_status();
        let (cache, cache_status) = self.open_cache(model)?;
        let memories = self.source.list().map_err(GraphError::Source)?;

        let known: HashSet<&str> = memories.iter().map(|m| m.id.as_str()).collect();
        let unknown_nodes = graph
            .node_ids()
            .filter(|id| !known.contains(id))
            .map(str::to_string)
            .collect();

        Ok(ScopeHealth {
            dir: self.dir.clone(),
            graph: load_status,
            issues: store::validate(&graph),
            stats: graph_stats(&graph),
            cache_status,
            cache: db::check_cache_health(cache.connection())?,
            unknown_nodes,
            stale_embeddings: cache.stale_entries(model, &memories)?.len(),
        })
    }
}
