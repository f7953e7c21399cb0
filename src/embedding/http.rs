//! OpenAI-compatible HTTP embedding provider.
//!
//! Works against any server exposing `POST {base_url}/v1/embeddings`
//! (OpenAI, Ollama, llama.cpp, vLLM). Requests are bounded by the configured
//! timeout; a timeout is reported like any other failure.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

pub struct HttpEmbeddingProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        anyhow::ensure!(!config.base_url.is_empty(), "embedding.base_url must be set for the http provider");
        anyhow::ensure!(config.timeout_secs > 0, "embedding.timeout_secs must be positive");

        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());

        tracing::info!(base_url = %config.base_url, model = %config.model, "http embedding provider configured");

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn request_body<'a>(&'a self, texts: &[&'a str]) -> EmbeddingRequest<'a> {
        EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
        }
    }
}

impl EmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .context("embedding response was empty")
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        // Built per call so the blocking client never lives on an async worker thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("failed to build HTTP client")?;

        let url = self.endpoint();
        let mut request = client.post(&url).json(&self.request_body(texts));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .with_context(|| format!("embedding request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("embedding API error {status}: {body}");
        }

        let parsed: EmbeddingResponse = response
            .json()
            .context("failed to parse embedding response")?;
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);

        anyhow::ensure!(
            data.len() == texts.len(),
            "embedding response had {} vectors for {} inputs",
            data.len(),
            texts.len()
        );
        anyhow::ensure!(
            data.iter().all(|d| !d.embedding.is_empty()),
            "embedding response contained an empty vector"
        );

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "http".into(),
            model: "nomic-embed-text".into(),
            base_url: "http://localhost:11434/".into(),
            api_key_env: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let p = HttpEmbeddingProvider::new(&config()).unwrap();
        assert_eq!(p.endpoint(), "http://localhost:11434/v1/embeddings");
    }

    #[test]
    fn request_body_shape() {
        let p = HttpEmbeddingProvider::new(&config()).unwrap();
        let body = serde_json::to_value(p.request_body(&["hello", "world"])).unwrap();
        assert_eq!(body["model"], "nomic-embed-text");
        assert_eq!(body["input"][1], "world");
    }

    #[test]
    fn rejects_zero_timeout() {
        let cfg = EmbeddingConfig {
            timeout_secs: 0,
            ..config()
        };
        assert!(HttpEmbeddingProvider::new(&cfg).is_err());
    }

    #[test]
    fn unreachable_server_is_an_error() {
        let cfg = EmbeddingConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 1,
            ..config()
        };
        let p = HttpEmbeddingProvider::new(&cfg).unwrap();
        assert!(p.embed("hello").is_err());
    }

    #[test]
    fn response_parsing_orders_by_index() {
        let json = r#"{"data":[{"embedding":[0.5],"index":1},{"embedding":[0.25],"index":0}]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![0.25]);
    }
}
