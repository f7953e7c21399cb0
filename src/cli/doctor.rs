//! CLI `doctor` command: run scope diagnostics and print a health report.

use anyhow::{Context, Result};
use std::path::Path;

use super::print_json;
use mnemograph::config::MnemographConfig;
use mnemograph::db::OpenStatus;
use mnemograph::graph::store::LoadStatus;
use mnemograph::scope::Scope;

/// Run graph, cache and memory-store diagnostics for one scope.
pub fn doctor(config: &MnemographConfig, scope: &Scope, json: bool) -> Result<()> {
    if !scope.dir().exists() {
        println!("Scope: not found at {}", scope.dir().display());
        println!("Run `mnemograph link` or `mnemograph embed` to initialize.");
        return Ok(());
    }

    let health = scope
        .health(&config.embedding.model)
        .context("failed to run health check")?;
    if json {
        return print_json(&health);
    }

    println!("Mnemograph Health Report");
    println!("========================");
    println!();
    println!("Scope:             {}", health.dir.display());
    println!("Graph file:        {}", format_size(&scope.graph_path()));
    println!("Cache file:        {}", format_size(&scope.cache_path()));
    println!();
    println!("Graph:");
    match &health.graph {
        LoadStatus::Missing => println!("  Snapshot:        not created yet"),
        LoadStatus::Loaded => println!("  Snapshot:        OK"),
        LoadStatus::Repaired { dropped_nodes, dropped_edges } => println!(
            "  Snapshot:        REPAIRED on load ({dropped_nodes} node(s), {dropped_edges} edge(s) dropped)"
        ),
        LoadStatus::Corrupt { reason } => println!("  Snapshot:        CORRUPT ({reason}), treated as empty"),
    }
    println!("  Nodes:           {}", health.stats.nodes);
    println!("  Edges:           {}", health.stats.edges);
    println!("  Orphans:         {}", health.stats.orphans);
    println!("  Components:      {}", health.stats.components);
    if health.issues.is_empty() {
        println!("  Structure:       OK");
    } else {
        println!("  Structure:       {} issue(s)", health.issues.len());
        for issue in &health.issues {
            println!("    - {issue}");
        }
    }
    if !health.unknown_nodes.is_empty() {
        println!("  Nodes without a memory file: {}", health.unknown_nodes.join(", "));
    }
    println!();
    println!("Embedding cache:");
    if let OpenStatus::Recovered { reason, moved_to } = &health.cache_status {
        println!("  RECOVERED: {reason}");
        println!("  Old file moved to {}", moved_to.display());
    }
    println!("  Schema version:  {}", health.cache.schema_version);
    println!("  Model:           {}", health.cache.embedding_model.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", config.embedding.model);
    println!("  Entries:         {}", health.cache.entry_count);
    println!("  Stale/missing:   {}", health.stale_embeddings);
    if health.cache.integrity_ok {
        println!("  Integrity check: PASSED");
    } else {
        println!("  Integrity check: FAILED ({})", health.cache.integrity_details);
    }

    if health.stale_embeddings > 0 {
        println!();
        println!("Run `mnemograph embed` to refresh stale embeddings.");
    }
    Ok(())
}

fn format_size(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => format_bytes(meta.len()),
        Err(_) => "(absent)".into(),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
