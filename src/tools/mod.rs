pub mod auto_link;
pub mod graph_diagram;
pub mod graph_edges;
pub mod graph_impact;
pub mod link;
pub mod suggest_links;

use auto_link::AutoLinkParams;
use graph_diagram::GraphDiagramParams;
use graph_edges::GraphEdgesParams;
use graph_impact::GraphImpactParams;
use link::{LinkParams, UnlinkParams};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use suggest_links::SuggestLinksParams;

use mnemograph::config::MnemographConfig;
use mnemograph::embedding::cache::EmbeddingCache;
use mnemograph::embedding::EmbeddingProvider;
use mnemograph::graph::diagram::{generate_diagram, DiagramOptions};
use mnemograph::graph::edges::{inbound_edges, neighbours, node_degree, outbound_edges};
use mnemograph::graph::traversal::calculate_impact;
use mnemograph::graph::EdgeLabel;
use mnemograph::memory::MemoryType;
use mnemograph::scope::Scope;

/// The Mnemograph MCP tool handler. Holds shared state (embedding caches per
/// scope, embedding provider, config) and exposes the graph tools via the
/// `#[tool_router]` macro.
///
/// The cache map lock also serialises graph read-modify-write cycles within
/// this process.
#[derive(Clone)]
pub struct MnemographTools {
    tool_router: ToolRouter<Self>,
    caches: Arc<Mutex<HashMap<PathBuf, EmbeddingCache>>>,
    embedding: Arc<dyn EmbeddingProvider>,
    config: Arc<MnemographConfig>,
}

#[derive(Serialize)]
struct EdgesResponse {
    id: String,
    inbound: Vec<mnemograph::graph::GraphEdge>,
    outbound: Vec<mnemograph::graph::GraphEdge>,
    neighbours: Vec<String>,
    degree: usize,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

fn parse_label(label: Option<&str>) -> Result<EdgeLabel, String> {
    match label {
        Some(l) => l.parse().map_err(|e: mnemograph::error::GraphError| e.to_string()),
        None => Ok(EdgeLabel::default()),
    }
}

/// Build diagram options from tool parameters on top of the configured defaults.
pub fn diagram_options(
    config: &MnemographConfig,
    params: &GraphDiagramParams,
) -> Result<DiagramOptions, String> {
    let mut options = config.diagram_options();
    if let Some(direction) = &params.direction {
        options.direction = direction.parse()?;
    }
    options.full = params.full.unwrap_or(false);
    options.focus = params.focus.clone();
    options.depth = params.depth.unwrap_or(options.depth);
    if let Some(types) = &params.types {
        let parsed = types
            .iter()
            .map(|t| t.parse::<MemoryType>())
            .collect::<Result<Vec<_>, _>>()?;
        options.types = Some(parsed);
    }
    Ok(options)
}

impl MnemographTools {
    /// Run `f` against a scope on the blocking pool, with that scope's cache open.
    async fn with_scope<T, F>(&self, scope: Option<String>, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&Scope, &EmbeddingCache, &dyn EmbeddingProvider, &MnemographConfig) -> anyhow::Result<T>
            + Send
            + 'static,
    {
        let caches = Arc::clone(&self.caches);
        let embedding = Arc::clone(&self.embedding);
        let config = Arc::clone(&self.config);

        tokio::task::spawn_blocking(move || {
            let dir = config.scope_dir(scope.as_deref());
            let scope = Scope::open(&dir);
            let mut caches = caches
                .lock()
                .map_err(|e| anyhow::anyhow!("cache lock poisoned: {e}"))?;
            let cache = match caches.entry(dir) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let (cache, status) = scope.open_cache(embedding.model())?;
                    tracing::info!(scope = %scope.dir().display(), status = ?status, "embedding cache ready");
                    entry.insert(cache)
                }
            };
            f(&scope, cache, embedding.as_ref(), &config)
        })
        .await
        .map_err(|e| format!("task failed: {e}"))?
        .map_err(|e| format!("{e:#}"))
    }
}

#[tool_router]
impl MnemographTools {
    pub fn new(embedding: Arc<dyn EmbeddingProvider>, config: Arc<MnemographConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            caches: Arc::new(Mutex::new(HashMap::new())),
            embedding,
            config,
        }
    }

    #[tool(description = "Create a directed, labelled edge between two memories. Idempotent. Set reciprocal=true to also add the inverse edge (implements/implemented-by).")]
    async fn link(&self, Parameters(params): Parameters<LinkParams>) -> Result<String, String> {
        let label = parse_label(params.label.as_deref())?;
        let reciprocal = params.reciprocal.unwrap_or(false);
        tracing::info!(source = %params.source, target = %params.target, label = %label, "link called");

        let outcome = self
            .with_scope(params.scope, move |scope, _, _, _| {
                Ok(scope.link(&params.source, &params.target, &label, reciprocal)?)
            })
            .await?;
        to_json(&outcome)
    }

    #[tool(description = "Remove edges from source to target. Only the given label when one is supplied.")]
    async fn unlink(&self, Parameters(params): Parameters<UnlinkParams>) -> Result<String, String> {
        let label = params.label.as_deref().map(|l| parse_label(Some(l))).transpose()?;
        tracing::info!(source = %params.source, target = %params.target, "unlink called");

        let removed = self
            .with_scope(params.scope, move |scope, _, _, _| {
                Ok(scope.unlink(&params.source, &params.target, label.as_ref())?)
            })
            .await?;
        to_json(&serde_json::json!({ "removed": removed }))
    }

    #[tool(description = "List a memory's inbound and outbound edges, its neighbours and degree.")]
    async fn graph_edges(&self, Parameters(params): Parameters<GraphEdgesParams>) -> Result<String, String> {
        let response = self
            .with_scope(params.scope, move |scope, _, _, _| {
                let graph = scope.load_graph();
                graph.require_node(&params.id)?;
                Ok(EdgesResponse {
                    inbound: inbound_edges(&graph, &params.id).into_iter().cloned().collect(),
                    outbound: outbound_edges(&graph, &params.id).into_iter().cloned().collect(),
                    neighbours: neighbours(&graph, &params.id).into_iter().map(str::to_string).collect(),
                    degree: node_degree(&graph, &params.id),
                    id: params.id,
                })
            })
            .await?;
        to_json(&response)
    }

    #[tool(description = "Render the memory graph as a Mermaid flowchart. Hub-focused by default; use focus/depth for a neighbourhood, full=true for everything, types to filter.")]
    async fn graph_diagram(&self, Parameters(params): Parameters<GraphDiagramParams>) -> Result<String, String> {
        let options = diagram_options(&self.config, &params)?;
        self.with_scope(params.scope, move |scope, _, _, _| {
            Ok(generate_diagram(&scope.load_graph(), &options)?)
        })
        .await
    }

    #[tool(description = "What depends on a memory: direct and transitive dependents via inbound edges.")]
    async fn graph_impact(&self, Parameters(params): Parameters<GraphImpactParams>) -> Result<String, String> {
        let report = self
            .with_scope(params.scope, move |scope, _, _, _| {
                Ok(calculate_impact(&scope.load_graph(), &params.id)?)
            })
            .await?;
        to_json(&report)
    }

    #[tool(description = "Propose links between semantically similar memories that are not yet connected. Set auto_create=true to create them.")]
    async fn suggest_links(&self, Parameters(params): Parameters<SuggestLinksParams>) -> Result<String, String> {
        let mut options = self.config.suggest_options();
        options.threshold = params.threshold.unwrap_or(options.threshold);
        options.limit = params.limit.unwrap_or(options.limit);
        options.auto_create = params.auto_create.unwrap_or(false);
        if !(0.0..=1.0).contains(&options.threshold) {
            return Err("threshold must be between 0.0 and 1.0".into());
        }

        let report = self
            .with_scope(params.scope, move |scope, cache, provider, _| {
                Ok(scope.suggest_links(cache, provider, &options)?)
            })
            .await?;
        to_json(&report)
    }

    #[tool(description = "Link a memory to its most similar memories (edges labelled auto-linked-by-similarity). Reports how many edges were created.")]
    async fn auto_link(&self, Parameters(params): Parameters<AutoLinkParams>) -> Result<String, String> {
        if !self.config.linking.auto_link {
            tracing::debug!(id = %params.id, "auto-link disabled by config");
            return to_json(&serde_json::json!({
                "memory_id": params.id,
                "created": 0,
                "skipped": { "reason": "disabled", "detail": "[linking] auto_link = false" },
            }));
        }
        let mut options = self.config.auto_link_options();
        options.threshold = params.threshold.unwrap_or(options.threshold);
        if !(0.0..=1.0).contains(&options.threshold) {
            return Err("threshold must be between 0.0 and 1.0".into());
        }

        let report = self
            .with_scope(params.scope, move |scope, cache, provider, _| {
                let content = match params.content {
                    Some(content) => content,
                    None => scope
                        .source()
                        .get(&params.id)?
                        .map(|m| m.content)
                        .ok_or_else(|| anyhow::anyhow!("memory not found: {}", params.id))?,
                };
                Ok(scope.auto_link(cache, provider, &params.id, &content, &options)?)
            })
            .await?;
        to_json(&report)
    }
}

#[tool_handler]
impl ServerHandler for MnemographTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Mnemograph maintains the relationship graph between memories. Use link/unlink \
                 to edit edges, graph_diagram to visualise, graph_impact before changing a \
                 memory, and auto_link/suggest_links for similarity-based linking."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemograph::graph::diagram::FlowDirection;

    #[test]
    fn diagram_params_override_config() {
        let config = MnemographConfig::default();
        let params = GraphDiagramParams {
            focus: Some("a".into()),
            depth: Some(2),
            types: Some(vec!["hub".into(), "decision".into()]),
            direction: Some("lr".into()),
            ..GraphDiagramParams::default()
        };
        let options = diagram_options(&config, &params).unwrap();
        assert_eq!(options.direction, FlowDirection::LeftRight);
        assert_eq!(options.focus.as_deref(), Some("a"));
        assert_eq!(options.depth, 2);
        assert_eq!(options.types, Some(vec![MemoryType::Hub, MemoryType::Decision]));
    }

    #[test]
    fn bad_diagram_params_are_rejected() {
        let config = MnemographConfig::default();
        let params = GraphDiagramParams {
            types: Some(vec!["episodic".into()]),
            ..GraphDiagramParams::default()
        };
        assert!(diagram_options(&config, &params).is_err());
    }

    #[test]
    fn label_parsing() {
        assert_eq!(parse_label(None).unwrap(), EdgeLabel::RELATES_TO);
        assert_eq!(parse_label(Some("depends-on")).unwrap(), EdgeLabel::DEPENDS_ON);
        assert!(parse_label(Some("has space")).is_err());
    }
}
