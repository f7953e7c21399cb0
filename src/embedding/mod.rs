//! Text-to-vector embedding.
//!
//! The engine consumes embeddings through the [`EmbeddingProvider`] trait and
//! never depends on a particular model. Providers are built from configuration
//! with [`create_provider`]; vectors are cached per memory in [`cache`].

pub mod cache;
pub mod http;

use anyhow::Result;

use crate::config::EmbeddingConfig;

/// Anything that can turn text into a vector.
///
/// Any `Err` is treated by callers as "provider unavailable": linking degrades
/// to a no-op instead of failing. Methods are blocking; async callers should
/// use `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Identifier of the vector space. Vectors from different models are never compared.
    fn model(&self) -> &str;

    /// Embed several texts. Implementations may override for batched requests.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// A provider that is always unavailable. Used when embeddings are switched off.
pub struct DisabledProvider {
    model: String,
}

impl DisabledProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

impl EmbeddingProvider for DisabledProvider {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        anyhow::bail!("embedding provider disabled")
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Create an embedding provider from config.
///
/// Supported providers: `"http"` (OpenAI-compatible `/v1/embeddings`) and `"disabled"`.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "http" => {
            let provider = http::HttpEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        "disabled" | "none" => Ok(Box::new(DisabledProvider::new(&config.model))),
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: http, disabled"),
    }
}
