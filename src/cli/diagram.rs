//! CLI `diagram` command: print or write a Mermaid flowchart.

use anyhow::{Context, Result};
use std::path::Path;

use mnemograph::config::MnemographConfig;
use mnemograph::graph::diagram::generate_diagram;
use mnemograph::memory::MemoryType;
use mnemograph::scope::Scope;

pub struct DiagramArgs<'a> {
    pub focus: Option<&'a str>,
    pub depth: usize,
    pub full: bool,
    pub types: &'a [String],
    pub direction: Option<&'a str>,
    pub output: Option<&'a Path>,
}

pub fn diagram(config: &MnemographConfig, scope: &Scope, args: DiagramArgs<'_>) -> Result<()> {
    let mut options = config.diagram_options();
    if let Some(direction) = args.direction {
        options.direction = direction.parse().map_err(anyhow::Error::msg)?;
    }
    options.full = args.full;
    options.focus = args.focus.map(str::to_string);
    options.depth = args.depth;
    if !args.types.is_empty() {
        let types = args
            .types
            .iter()
            .map(|t| t.parse::<MemoryType>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(anyhow::Error::msg)?;
        options.types = Some(types);
    }

    let rendered = generate_diagram(&scope.load_graph(), &options)?;
    match args.output {
        Some(path) => {
            let block = format!("```mermaid\n{rendered}```\n");
            std::fs::write(path, block)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Diagram written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
