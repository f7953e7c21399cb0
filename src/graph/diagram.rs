//! Mermaid flowchart rendering.
//!
//! [`generate_diagram`] first selects which part of the graph to draw
//! ([`select`]) and then renders it ([`render`]). Selection modes, in order
//! of precedence:
//!
//! | Mode | Nodes drawn |
//! |------|-------------|
//! | `focus` set | everything within `depth` hops of the focus node, either direction |
//! | default, hubs present | every hub plus its direct neighbours |
//! | `full`, or no hubs | the whole graph |
//!
//! A `types` filter is applied last. Edges are drawn only when both endpoints
//! survive. Output depends only on the graph and the options.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use super::edges::neighbours;
use super::labels::EdgeLabel;
use super::traversal::{restrict, subgraph};
use super::types::{GraphNode, MemoryGraph};
use crate::error::Result;
use crate::memory::MemoryType;

/// Flowchart orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowDirection {
    #[default]
    TopDown,
    LeftRight,
    BottomUp,
    RightLeft,
}

impl FlowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopDown => "TD",
            Self::LeftRight => "LR",
            Self::BottomUp => "BT",
            Self::RightLeft => "RL",
        }
    }
}

impl std::str::FromStr for FlowDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Ok(Self::TopDown),
            "LR" => Ok(Self::LeftRight),
            "BT" => Ok(Self::BottomUp),
            "RL" => Ok(Self::RightLeft),
            _ => Err(format!("unknown flowchart direction: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiagramOptions {
    pub direction: FlowDirection,
    /// Draw the whole graph even when hubs exist.
    pub full: bool,
    /// Draw only the neighbourhood of this node.
    pub focus: Option<String>,
    /// Hop limit for `focus`.
    pub depth: usize,
    /// Keep only nodes of these types.
    pub types: Option<Vec<MemoryType>>,
    pub abbreviate_labels: bool,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            direction: FlowDirection::TopDown,
            full: false,
            focus: None,
            depth: 1,
            types: None,
            abbreviate_labels: true,
        }
    }
}

/// Select and render in one step.
pub fn generate_diagram(graph: &MemoryGraph, options: &DiagramOptions) -> Result<String> {
    let selected = select(graph, options)?;
    Ok(render(&selected, options))
}

/// The part of `graph` a diagram with these options would show.
pub fn select(graph: &MemoryGraph, options: &DiagramOptions) -> Result<MemoryGraph> {
    let selected = if let Some(focus) = &options.focus {
        subgraph(graph, focus, options.depth)?
    } else if !options.full && graph.nodes.iter().any(|n| n.node_type == MemoryType::Hub) {
        hub_neighbourhood(graph)
    } else {
        graph.clone()
    };

    Ok(match &options.types {
        Some(types) => {
            let kept: HashSet<&str> = selected
                .nodes
                .iter()
                .filter(|n| types.contains(&n.node_type))
                .map(|n| n.id.as_str())
                .collect();
            restrict(&selected, |id| kept.contains(id))
        }
        None => selected,
    })
}

fn hub_neighbourhood(graph: &MemoryGraph) -> MemoryGraph {
    let mut keep: HashSet<&str> = HashSet::new();
    for hub in graph.nodes.iter().filter(|n| n.node_type == MemoryType::Hub) {
        keep.insert(&hub.id);
        keep.extend(neighbours(graph, &hub.id));
    }
    restrict(graph, |id| keep.contains(id))
}

/// Render `graph` as-is (no selection) into a Mermaid flowchart.
pub fn render(graph: &MemoryGraph, options: &DiagramOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "flowchart {}", options.direction.as_str());

    if graph.nodes.is_empty() {
        out.push_str("    %% empty graph\n");
        return out;
    }

    let ids = diagram_ids(graph);

    for node in &graph.nodes {
        let _ = writeln!(out, "    {}", node_declaration(&ids[node.id.as_str()], node));
    }

    for edge in &graph.edges {
        let (Some(source), Some(target)) = (ids.get(edge.source.as_str()), ids.get(edge.target.as_str()))
        else {
            continue;
        };
        let arrow = if edge.label == EdgeLabel::AUTO_LINKED { "-.->" } else { "-->" };
        let label = if options.abbreviate_labels {
            edge.label.abbreviation()
        } else {
            edge.label.to_string()
        };
        let _ = writeln!(out, "    {source} {arrow}|{label}| {target}");
    }

    for memory_type in MemoryType::ALL {
        if graph.nodes.iter().any(|n| n.node_type == memory_type) {
            let _ = writeln!(out, "    classDef {} {}", memory_type, class_style(memory_type));
        }
    }

    out
}

fn node_declaration(diagram_id: &str, node: &GraphNode) -> String {
    let label = escape_label(&node.id);
    let (open, close) = shape(node.node_type);
    format!("{diagram_id}{open}\"{label}\"{close}:::{}", node.node_type)
}

/// Opening and closing brackets of the node shape for each type.
pub fn shape(memory_type: MemoryType) -> (&'static str, &'static str) {
    match memory_type {
        MemoryType::Hub => ("((", "))"),
        MemoryType::Decision => ("{{", "}}"),
        MemoryType::Artifact => ("[", "]"),
        MemoryType::Learning => ("([", "])"),
        MemoryType::Gotcha => (">", "]"),
        MemoryType::Breadcrumb => ("(", ")"),
    }
}

fn class_style(memory_type: MemoryType) -> &'static str {
    match memory_type {
        MemoryType::Hub => "fill:#f9d71c,stroke:#b8860b,stroke-width:2px",
        MemoryType::Decision => "fill:#ffd6d6,stroke:#c0392b",
        MemoryType::Learning => "fill:#d6eaff,stroke:#2471a3",
        MemoryType::Artifact => "fill:#e0e0e0,stroke:#616161",
        MemoryType::Gotcha => "fill:#ffe0b3,stroke:#d35400",
        MemoryType::Breadcrumb => "fill:#e8f8e0,stroke:#27ae60",
    }
}

/// Map node ids to Mermaid-safe identifiers, keeping them unique.
fn diagram_ids(graph: &MemoryGraph) -> HashMap<&str, String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut ids = HashMap::new();
    for node in &graph.nodes {
        let base = sanitize_id(&node.id);
        let mut candidate = base.clone();
        let mut n = 2;
        while !taken.insert(candidate.clone()) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        ids.insert(node.id.as_str(), candidate);
    }
    ids
}

/// Replace everything outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    // `end` is a Mermaid keyword
    if cleaned.eq_ignore_ascii_case("end") || cleaned.is_empty() {
        format!("n_{cleaned}")
    } else {
        cleaned
    }
}

/// Substitute characters that would break a quoted Mermaid label.
pub fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '[' | '{' => out.push('('),
            ']' | '}' => out.push(')'),
            '"' => out.push('\''),
            '<' => out.push_str("#lt;"),
            '>' => out.push_str("#gt;"),
            other => out.push(other),
        }
    }
    out
}
