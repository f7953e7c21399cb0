//! Knowledge graph and semantic linking for agent memory stores.
//!
//! Mnemograph keeps a directed, labelled graph of relationships between the
//! memories of a note store and grows it from text embeddings. Memories come in
//! six types, each rendered with its own shape in diagrams:
//!
//! | Type | Purpose | Diagram shape |
//! |------|---------|---------------|
//! | **Decision** | Choices and their rationale | Hexagon |
//! | **Learning** | Things discovered while working | Stadium |
//! | **Artifact** | Produced documents and outputs | Rectangle |
//! | **Gotcha** | Pitfalls | Flag |
//! | **Breadcrumb** | Mid-task trail markers | Rounded |
//! | **Hub** | Navigation anchors | Circle |
//!
//! # Architecture
//!
//! - **Graph**: an immutable snapshot value, persisted as one JSON file per scope
//!   with atomic writes and self-repair on load
//! - **Embeddings**: any OpenAI-compatible `/v1/embeddings` endpoint, cached in
//!   SQLite keyed by memory and model, invalidated by content hash
//! - **Linking**: cosine similarity with thresholds; auto-link on write and a
//!   batch suggestion pass
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP, plus a CLI
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite cache database initialization, schema, migrations, and health checks
//! - [`embedding`]: Embedding providers and the per-scope vector cache
//! - [`error`]: Typed graph and cache errors
//! - [`graph`]: Graph model, persistence, traversal, and Mermaid diagrams
//! - [`linking`]: Similarity ranking, auto-link, suggestions, and cache refresh
//! - [`memory`]: Memory types and read access to the note store
//! - [`scope`]: One scope directory tying graph, cache, and memories together

pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod linking;
pub mod memory;
pub mod scope;
