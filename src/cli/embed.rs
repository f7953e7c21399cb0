//! CLI `embed` command: bring the embedding cache up to date.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use super::{open_embedding, print_json};
use mnemograph::config::MnemographConfig;
use mnemograph::scope::Scope;

/// Re-embed missing or stale memories (all with `force`), optionally pruning
/// entries of deleted memories.
pub fn embed(config: &MnemographConfig, scope: &Scope, force: bool, prune: bool, json: bool) -> Result<()> {
    let (provider, cache) = open_embedding(config, scope)?;

    let total = scope
        .source()
        .list()
        .context("failed to list memories")?
        .len();
    if total == 0 && !prune {
        println!("No memories to embed in {}.", scope.dir().display());
        return Ok(());
    }

    if !json {
        println!("Embedding {total} memories with model '{}'...", provider.model());
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );
    if json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let report = scope
        .refresh_embeddings(&cache, provider.as_ref(), force, prune, |n| pb.inc(n as u64))
        .context("embedding refresh failed")?;
    pb.finish_and_clear();

    if json {
        return print_json(&report);
    }
    println!(
        "Embedded {} of {} memories ({} already up to date).",
        report.refreshed, report.total, report.up_to_date
    );
    if prune {
        println!("Pruned {} cache entries of deleted memories.", report.pruned);
    }
    if let Some(reason) = &report.skipped {
        println!("Stopped early: {reason}");
    }
    Ok(())
}
