use anyhow::Result;

use super::print_json;
use mnemograph::graph::stats::graph_stats;
use mnemograph::memory::MemoryType;
use mnemograph::scope::Scope;

/// Display graph statistics in the terminal.
pub fn stats(scope: &Scope, json: bool) -> Result<()> {
    let stats = graph_stats(&scope.load_graph());
    if json {
        return print_json(&stats);
    }

    println!("Graph Statistics");
    println!("{}", "=".repeat(40));
    println!("  Nodes:               {}", stats.nodes);
    println!("  Edges:               {}", stats.edges);
    println!("  Orphans:             {}", stats.orphans);
    println!("  Components:          {}", stats.components);
    println!();

    println!("By Type:");
    for t in MemoryType::ALL {
        let count = stats.by_type.get(t.as_str()).copied().unwrap_or(0);
        println!("  {:<12} {}", t.as_str(), count);
    }
    println!();

    println!("By Label:");
    for (label, count) in &stats.by_label {
        println!("  {:<28} {}", label, count);
    }

    Ok(())
}
