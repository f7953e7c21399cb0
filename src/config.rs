use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::graph::diagram::{DiagramOptions, FlowDirection};
use crate::linking::auto_link::AutoLinkOptions;
use crate::linking::suggest::SuggestOptions;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MnemographConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub linking: LinkingConfig,
    pub diagram: DiagramConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub root: String,
    pub default_scope: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key, if any.
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LinkingConfig {
    pub auto_link: bool,
    pub auto_link_threshold: f64,
    pub suggest_threshold: f64,
    pub suggest_limit: usize,
    pub max_auto_links: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DiagramConfig {
    pub direction: String,
    pub abbreviate_labels: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 8787,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root_dir().to_string_lossy().into_owned(),
            default_scope: "personal".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "http".into(),
            model: "nomic-embed-text".into(),
            base_url: "http://localhost:11434".into(),
            api_key_env: None,
            timeout_secs: 30,
        }
    }
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            auto_link: true,
            auto_link_threshold: 0.85,
            suggest_threshold: 0.80,
            suggest_limit: 5,
            max_auto_links: 10,
        }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            direction: "TD".into(),
            abbreviate_labels: true,
        }
    }
}

/// Returns `~/.mnemograph/`
pub fn default_root_dir() -> PathBuf {
    home_dir().join(".mnemograph")
}

/// Returns the default config file path: `~/.mnemograph/config.toml`
pub fn default_config_path() -> PathBuf {
    default_root_dir().join("config.toml")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

impl MnemographConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MnemographConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MNEMOGRAPH_ROOT, MNEMOGRAPH_SCOPE,
    /// MNEMOGRAPH_LOG_LEVEL, MNEMOGRAPH_EMBEDDING_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MNEMOGRAPH_ROOT") {
            self.storage.root = val;
        }
        if let Ok(val) = std::env::var("MNEMOGRAPH_SCOPE") {
            self.storage.default_scope = val;
        }
        if let Ok(val) = std::env::var("MNEMOGRAPH_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("MNEMOGRAPH_EMBEDDING_URL") {
            self.embedding.base_url = val;
        }
    }

    /// Resolve the storage root, expanding `~` if needed.
    pub fn resolved_root(&self) -> PathBuf {
        expand_tilde(&self.storage.root)
    }

    /// Directory of a scope.
    ///
    /// A bare name maps to `<root>/scopes/<name>`; anything that looks like a
    /// path (contains `/`, or starts with `.` or `~`) is used as the directory.
    pub fn scope_dir(&self, scope: Option<&str>) -> PathBuf {
        let scope = scope.unwrap_or(&self.storage.default_scope);
        if scope.contains('/') || scope.starts_with('.') || scope.starts_with('~') {
            expand_tilde(scope)
        } else {
            self.resolved_root().join("scopes").join(scope)
        }
    }

    pub fn auto_link_options(&self) -> AutoLinkOptions {
        AutoLinkOptions {
            threshold: self.linking.auto_link_threshold,
            max_links: self.linking.max_auto_links,
        }
    }

    pub fn suggest_options(&self) -> SuggestOptions {
        SuggestOptions {
            threshold: self.linking.suggest_threshold,
            limit: self.linking.suggest_limit,
            auto_create: false,
        }
    }

    /// Diagram defaults from `[diagram]`. An unknown direction falls back to TD.
    pub fn diagram_options(&self) -> DiagramOptions {
        let direction = self.diagram.direction.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid diagram direction in config, using TD");
            FlowDirection::TopDown
        });
        DiagramOptions {
            direction,
            abbreviate_labels: self.diagram.abbreviate_labels,
            ..DiagramOptions::default()
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else {
        PathBuf::from(path)
    }
}
