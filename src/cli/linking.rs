//! CLI `autolink` and `suggest` commands.

use anyhow::{Context, Result};

use super::{open_embedding, print_json};
use mnemograph::config::MnemographConfig;
use mnemograph::scope::Scope;

/// Auto-link one stored memory against the rest of the scope.
pub fn autolink(config: &MnemographConfig, scope: &Scope, id: &str, threshold: Option<f64>, json: bool) -> Result<()> {
    let memory = scope
        .source()
        .get(id)?
        .with_context(|| format!("memory not found: {id}"))?;

    let (provider, cache) = open_embedding(config, scope)?;
    let mut options = config.auto_link_options();
    options.threshold = threshold.unwrap_or(options.threshold);

    let report = scope.auto_link(&cache, provider.as_ref(), id, &memory.content, &options)?;
    if json {
        return print_json(&report);
    }
    if let Some(reason) = &report.skipped {
        println!("Auto-link skipped: {reason}");
        return Ok(());
    }
    println!("Created {} edge(s) from {id}", report.created);
    for m in &report.candidates {
        println!("  {:.3}  {}", m.score, m.id);
    }
    Ok(())
}

pub fn suggest(
    config: &MnemographConfig,
    scope: &Scope,
    threshold: Option<f64>,
    limit: Option<usize>,
    create: bool,
    json: bool,
) -> Result<()> {
    let (provider, cache) = open_embedding(config, scope)?;
    let mut options = config.suggest_options();
    options.threshold = threshold.unwrap_or(options.threshold);
    options.limit = limit.unwrap_or(options.limit);
    options.auto_create = create;

    let report = scope.suggest_links(&cache, provider.as_ref(), &options)?;
    if json {
        return print_json(&report);
    }

    if let Some(reason) = &report.skipped {
        println!("Warning: {reason}");
    }
    if report.stale_refreshed > 0 {
        println!("Refreshed {} stale embedding(s).", report.stale_refreshed);
    }
    if report.proposals.is_empty() {
        println!("No link suggestions above {:.2}.", options.threshold);
        return Ok(());
    }
    println!("Link suggestions ({}):", report.proposals.len());
    for p in &report.proposals {
        println!("  {:.3}  {} -> {}", p.score, p.source, p.target);
    }
    if create {
        println!("Created {} edge(s).", report.created);
    }
    Ok(())
}
