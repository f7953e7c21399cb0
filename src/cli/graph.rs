//! CLI graph commands: edit edges and query structure.

use anyhow::{Context, Result};
use serde_json::json;

use super::{open_embedding, print_json};
use mnemograph::config::MnemographConfig;
use mnemograph::graph::edges::{inbound_edges, orphaned_nodes, outbound_edges};
use mnemograph::graph::traversal::{calculate_impact, connected_components, shortest_path};
use mnemograph::graph::EdgeLabel;
use mnemograph::scope::Scope;

pub fn link(scope: &Scope, source: &str, target: &str, label: &str, reciprocal: bool, json: bool) -> Result<()> {
    let label: EdgeLabel = label.parse()?;
    let outcome = scope
        .link(source, target, &label, reciprocal)
        .with_context(|| format!("failed to link {source} -> {target}"))?;

    if json {
        return print_json(&outcome);
    }
    if outcome.created == 0 {
        println!("Already linked: {source} -[{label}]-> {target}");
    } else {
        println!("Linked: {source} -[{label}]-> {target}");
    }
    match (&outcome.reverse_label, reciprocal) {
        (Some(reverse), _) => println!("Linked: {target} -[{reverse}]-> {source}"),
        (None, true) => println!("No reciprocal known for '{label}', reverse edge not created."),
        (None, false) => {}
    }
    Ok(())
}

pub fn unlink(scope: &Scope, source: &str, target: &str, label: Option<&str>, json: bool) -> Result<()> {
    let label: Option<EdgeLabel> = label.map(str::parse::<EdgeLabel>).transpose()?;
    let removed = scope.unlink(source, target, label.as_ref())?;
    if json {
        return print_json(&json!({ "removed": removed }));
    }
    println!("Removed {removed} edge(s) {source} -> {target}");
    Ok(())
}

/// Remove a node from the graph. With `forget`, also drop its cached embedding.
pub fn detach(config: &MnemographConfig, scope: &Scope, id: &str, forget: bool, json: bool) -> Result<()> {
    if forget {
        let (_, cache) = open_embedding(config, scope)?;
        let report = scope.forget(&cache, id)?;
        if json {
            return print_json(&report);
        }
        println!(
            "Forgot {id}: node {}, {} edge(s), cache entry {}",
            if report.node_removed { "removed" } else { "absent" },
            report.edges_removed,
            if report.cache_removed { "removed" } else { "absent" },
        );
        return Ok(());
    }

    let edges_removed = scope.detach(id)?;
    if json {
        return print_json(&json!({ "id": id, "edges_removed": edges_removed }));
    }
    println!("Detached {id} ({edges_removed} edge(s) removed)");
    Ok(())
}

pub fn edges(scope: &Scope, id: &str, json: bool) -> Result<()> {
    let graph = scope.load_graph();
    graph.require_node(id)?;
    let inbound = inbound_edges(&graph, id);
    let outbound = outbound_edges(&graph, id);

    if json {
        return print_json(&json!({ "id": id, "inbound": inbound, "outbound": outbound }));
    }
    println!("Outbound ({}):", outbound.len());
    for e in &outbound {
        println!("  {id} -[{}]-> {}", e.label, e.target);
    }
    println!("Inbound ({}):", inbound.len());
    for e in &inbound {
        println!("  {} -[{}]-> {id}", e.source, e.label);
    }
    Ok(())
}

pub fn orphans(scope: &Scope, json: bool) -> Result<()> {
    let graph = scope.load_graph();
    let orphans = orphaned_nodes(&graph);
    if json {
        return print_json(&orphans);
    }
    if orphans.is_empty() {
        println!("No orphaned nodes.");
    }
    for id in orphans {
        println!("{id}");
    }
    Ok(())
}

pub fn path(scope: &Scope, from: &str, to: &str, json: bool) -> Result<()> {
    let graph = scope.load_graph();
    let path = shortest_path(&graph, from, to)?;
    if json {
        return print_json(&path);
    }
    match path {
        Some(path) => println!("{} ({} hop(s))", path.join(" -> "), path.len() - 1),
        None => println!("No path from {from} to {to}"),
    }
    Ok(())
}

pub fn components(scope: &Scope, json: bool) -> Result<()> {
    let components = connected_components(&scope.load_graph());
    if json {
        return print_json(&components);
    }
    println!("{} component(s)", components.len());
    for (i, members) in components.iter().enumerate() {
        println!("  {:>3}. [{}] {}", i + 1, members.len(), members.join(", "));
    }
    Ok(())
}

pub fn impact(scope: &Scope, id: &str, json: bool) -> Result<()> {
    let report = calculate_impact(&scope.load_graph(), id)?;
    if json {
        return print_json(&report);
    }
    println!("Impact of changing {id}");
    println!("{}", "=".repeat(40));
    println!("  Direct dependents:     {}", report.direct.len());
    for d in &report.direct {
        println!("    {d}");
    }
    println!("  Transitive dependents: {}", report.transitive.len());
    println!("  Depth reached:         {}", report.max_depth);
    Ok(())
}
