//! MCP server initialization for stdio and streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that wire up the
//! embedding provider and the MCP tool handler into a running server.

use crate::tools::MnemographTools;
use anyhow::{Context, Result};
use mnemograph::config::MnemographConfig;
use mnemograph::embedding;
use rmcp::ServiceExt;
use std::sync::Arc;

/// Shared setup: create the embedding provider.
///
/// The HTTP provider uses a blocking client, so it is built off the async runtime.
async fn setup_shared_state(
    config: MnemographConfig,
) -> Result<(Arc<dyn embedding::EmbeddingProvider>, Arc<MnemographConfig>)> {
    let embedding_config = config.embedding.clone();
    let provider = tokio::task::spawn_blocking(move || embedding::create_provider(&embedding_config))
        .await?
        .context("failed to create embedding provider")?;
    let embedding: Arc<dyn embedding::EmbeddingProvider> = Arc::from(provider);
    tracing::info!(model = %embedding.model(), "embedding provider ready");

    tracing::info!(
        scope = %config.scope_dir(None).display(),
        "default scope"
    );
    Ok((embedding, Arc::new(config)))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: MnemographConfig) -> Result<()> {
    tracing::info!("starting Mnemograph MCP server on stdio");

    let (embedding, config) = setup_shared_state(config).await?;

    let tools = MnemographTools::new(embedding, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP transport.
pub async fn serve_http(config: MnemographConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting Mnemograph MCP server on HTTP");

    let (embedding, config) = setup_shared_state(config).await?;
    let tools = MnemographTools::new(embedding, config);

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(tools.clone()),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
