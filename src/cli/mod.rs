pub mod diagram;
pub mod doctor;
pub mod embed;
pub mod graph;
pub mod linking;
pub mod stats;

use anyhow::{Context, Result};
use serde::Serialize;

use mnemograph::config::MnemographConfig;
use mnemograph::embedding::cache::EmbeddingCache;
use mnemograph::embedding::{self, EmbeddingProvider};
use mnemograph::db::OpenStatus;
use mnemograph::scope::Scope;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Create the configured provider and open the scope's cache for its model.
pub fn open_embedding(
    config: &MnemographConfig,
    scope: &Scope,
) -> Result<(Box<dyn EmbeddingProvider>, EmbeddingCache)> {
    let provider = embedding::create_provider(&config.embedding)
        .context("failed to create embedding provider")?;
    let (cache, status) = scope
        .open_cache(provider.model())
        .context("failed to open embedding cache")?;
    if let OpenStatus::Recovered { moved_to, .. } = &status {
        eprintln!(
            "Embedding cache was unreadable and has been reset (old file: {}).",
            moved_to.display()
        );
    }
    Ok((provider, cache))
}
