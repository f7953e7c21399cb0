mod helpers;

use mnemograph::graph::diagram::{generate_diagram, DiagramOptions, FlowDirection};
use mnemograph::memory::MemoryType;

use helpers::graph;

fn declarations(diagram: &str) -> Vec<&str> {
    diagram
        .lines()
        .map(str::trim)
        .filter(|l| l.contains(":::"))
        .collect()
}

fn edge_lines(diagram: &str) -> Vec<&str> {
    diagram
        .lines()
        .map(str::trim)
        .filter(|l| l.contains("-->") || l.contains("-.->"))
        .collect()
}

#[test]
fn three_node_graph_renders_every_shape() {
    let g = graph(
        &[("a", MemoryType::Decision), ("b", MemoryType::Learning), ("c", MemoryType::Artifact)],
        &[("a", "b", "relates-to")],
    );
    let out = generate_diagram(&g, &DiagramOptions::default()).unwrap();

    assert!(out.starts_with("flowchart TD\n"));
    let decls = declarations(&out);
    assert_eq!(decls.len(), 3);
    assert!(decls.contains(&"a{{\"a\"}}:::decision"));
    assert!(decls.contains(&"b([\"b\"]):::learning"));
    assert!(decls.contains(&"c[\"c\"]:::artifact"));

    assert_eq!(edge_lines(&out), vec!["a -->|rel| b"]);
}

#[test]
fn empty_graph_is_a_valid_flowchart() {
    let out = generate_diagram(&mnemograph::graph::MemoryGraph::new(), &DiagramOptions::default()).unwrap();
    assert!(out.starts_with("flowchart TD"));
    assert!(declarations(&out).is_empty());
}

#[test]
fn hubs_limit_the_default_view() {
    let g = graph(
        &[
            ("index", MemoryType::Hub),
            ("near", MemoryType::Decision),
            ("far", MemoryType::Learning),
            ("lonely", MemoryType::Gotcha),
        ],
        &[("index", "near", "relates-to"), ("near", "far", "depends-on")],
    );

    let default = generate_diagram(&g, &DiagramOptions::default()).unwrap();
    assert_eq!(declarations(&default).len(), 2);
    assert!(!default.contains("far"));

    let full = generate_diagram(
        &g,
        &DiagramOptions {
            full: true,
            ..DiagramOptions::default()
        },
    )
    .unwrap();
    assert_eq!(declarations(&full).len(), 4);
    assert_eq!(edge_lines(&full).len(), 2);
}

#[test]
fn focus_draws_the_neighbourhood() {
    let g = graph(
        &[
            ("a", MemoryType::Decision),
            ("b", MemoryType::Learning),
            ("c", MemoryType::Artifact),
            ("d", MemoryType::Gotcha),
        ],
        &[("a", "b", "relates-to"), ("b", "c", "relates-to"), ("c", "d", "relates-to")],
    );
    let options = DiagramOptions {
        focus: Some("b".into()),
        depth: 1,
        direction: FlowDirection::LeftRight,
        ..DiagramOptions::default()
    };
    let out = generate_diagram(&g, &options).unwrap();
    assert!(out.starts_with("flowchart LR"));
    assert_eq!(declarations(&out).len(), 3);
    assert!(!out.contains("\"d\""));

    let missing = DiagramOptions {
        focus: Some("zzz".into()),
        ..DiagramOptions::default()
    };
    assert!(generate_diagram(&g, &missing).unwrap_err().is_not_found());
}

#[test]
fn type_filter_drops_edges_to_hidden_nodes() {
    let g = graph(
        &[("a", MemoryType::Decision), ("b", MemoryType::Learning), ("c", MemoryType::Decision)],
        &[("a", "b", "relates-to"), ("a", "c", "supersedes")],
    );
    let options = DiagramOptions {
        types: Some(vec![MemoryType::Decision]),
        abbreviate_labels: false,
        ..DiagramOptions::default()
    };
    let out = generate_diagram(&g, &options).unwrap();
    assert_eq!(declarations(&out).len(), 2);
    assert_eq!(edge_lines(&out), vec!["a -->|supersedes| c"]);
}

#[test]
fn similarity_edges_are_dotted() {
    let g = graph(
        &[("a", MemoryType::Decision), ("b", MemoryType::Learning)],
        &[("a", "b", "auto-linked-by-similarity")],
    );
    let out = generate_diagram(&g, &DiagramOptions::default()).unwrap();
    assert_eq!(edge_lines(&out), vec!["a -.->|sim| b"]);
}

#[test]
fn awkward_ids_are_sanitized_and_output_is_stable() {
    let g = graph(
        &[("end", MemoryType::Hub), ("api.v2", MemoryType::Artifact), ("api-v2", MemoryType::Artifact)],
        &[("end", "api.v2", "relates-to"), ("end", "api-v2", "relates-to")],
    );
    let options = DiagramOptions {
        full: true,
        ..DiagramOptions::default()
    };
    let first = generate_diagram(&g, &options).unwrap();
    let second = generate_diagram(&g, &options).unwrap();
    assert_eq!(first, second);

    assert!(first.contains("n_end((\"end\")):::hub"));
    assert!(first.contains("api_v2[\"api.v2\"]:::artifact"));
    assert!(first.contains("api_v2_2[\"api-v2\"]:::artifact"));
}
