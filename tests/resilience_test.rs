mod helpers;

use mnemograph::db::{self, OpenStatus};
use mnemograph::embedding::cache::{content_hash, EmbeddingCache};
use mnemograph::graph::store::{self, LoadStatus};
use mnemograph::graph::edges::has_edge;
use mnemograph::graph::EdgeLabel;
use mnemograph::memory::MemoryType;
use mnemograph::scope::Scope;
use tempfile::TempDir;

#[test]
fn corrupt_snapshot_loads_as_empty_graph() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("graph.json");
    std::fs::write(&path, "{\"version\": 1, \"nodes\": [").unwrap();

    let (graph, status) = store::load_with_status(&path);
    assert!(graph.is_empty());
    assert!(matches!(status, LoadStatus::Corrupt { .. }));
}

#[test]
fn damaged_snapshot_is_repaired_on_load() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("graph.json");
    std::fs::write(
        &path,
        r#"{
          "version": 1,
          "nodes": [
            {"id": "a", "type": "decision"},
            {"id": "b", "type": "learning"},
            {"id": "a", "type": "hub"},
            {"id": "bad id", "type": "gotcha"}
          ],
          "edges": [
            {"source": "a", "target": "b", "label": "relates-to"},
            {"source": "a", "target": "b", "label": "relates-to"},
            {"source": "a", "target": "ghost", "label": "relates-to"},
            {"source": "b", "target": "b", "label": "relates-to"}
          ]
        }"#,
    )
    .unwrap();

    let (graph, status) = store::load_with_status(&path);
    assert_eq!(
        status,
        LoadStatus::Repaired {
            dropped_nodes: 2,
            dropped_edges: 3
        }
    );
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.node("a").unwrap().node_type, MemoryType::Decision);
    assert_eq!(graph.edges.len(), 1);
    assert!(store::validate(&graph).is_empty());
}

#[test]
fn unknown_fields_and_missing_arrays_are_tolerated() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("graph.json");
    std::fs::write(&path, r#"{"version": 1, "generator": "something else"}"#).unwrap();

    let (graph, status) = store::load_with_status(&path);
    assert_eq!(status, LoadStatus::Loaded);
    assert!(graph.is_empty());
}

#[test]
fn garbage_cache_file_is_moved_aside() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("embeddings.db");
    std::fs::write(&path, b"this is not a sqlite database, just bytes").unwrap();

    let (cache, status) = EmbeddingCache::open(&path, helpers::MODEL).unwrap();
    match status {
        OpenStatus::Recovered { moved_to, .. } => {
            assert!(moved_to.exists());
            assert_eq!(moved_to, tmp.path().join("embeddings.corrupt"));
        }
        other => panic!("expected recovery, got {other:?}"),
    }

    assert_eq!(cache.count().unwrap(), 0);
    cache.put("a", helpers::MODEL, &[1.0], &content_hash("a")).unwrap();
    assert_eq!(cache.count().unwrap(), 1);
}

#[test]
fn fresh_cache_passes_health_check() {
    let conn = helpers::test_db();
    let health = db::check_cache_health(&conn).unwrap();
    assert!(health.integrity_ok);
    assert_eq!(health.schema_version, db::migrations::CURRENT_SCHEMA_VERSION);
    assert_eq!(health.entry_count, 0);
}

#[test]
fn scope_keeps_working_over_broken_files() {
    let tmp = TempDir::new().unwrap();
    let scope = Scope::open(tmp.path());
    std::fs::write(scope.graph_path(), "not json at all").unwrap();
    std::fs::write(scope.cache_path(), "not sqlite either").unwrap();

    let memories = mnemograph::memory::MemoryDir::new(tmp.path().join("memories"));
    memories
        .write(&helpers::memory("a", MemoryType::Decision, "A"))
        .unwrap();
    memories
        .write(&helpers::memory("b", MemoryType::Learning, "B"))
        .unwrap();

    let outcome = scope.link("a", "b", &EdgeLabel::RELATES_TO, false).unwrap();
    assert_eq!(outcome.created, 1);
    let (graph, status) = scope.load_graph_with_status();
    assert_eq!(status, LoadStatus::Loaded);
    assert_eq!(graph.edges.len(), 1);

    let health = scope.health(helpers::MODEL).unwrap();
    assert!(matches!(health.cache_status, OpenStatus::Recovered { .. }));
    assert_eq!(health.stale_embeddings, 2);
}

const ONE_BAD_LABEL: &str = r#"{
  "version": 1,
  "nodes": [
    {"id": "a", "type": "decision"},
    {"id": "b", "type": "learning"},
    {"id": "c", "type": "artifact"}
  ],
  "edges": [
    {"source": "a", "target": "b", "label": "relates-to"},
    {"source": "b", "target": "c", "label": "part of"}
  ]
}"#;

#[test]
fn edge_with_bad_label_is_dropped_alone() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("graph.json");
    std::fs::write(&path, ONE_BAD_LABEL).unwrap();

    let (graph, status) = store::load_with_status(&path);
    assert_eq!(
        status,
        LoadStatus::Repaired {
            dropped_nodes: 0,
            dropped_edges: 1
        }
    );
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].target, "b");
}

#[test]
fn node_with_unknown_type_is_dropped_with_its_edges() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("graph.json");
    std::fs::write(
        &path,
        r#"{
          "version": 1,
          "nodes": [
            {"id": "a", "type": "decision"},
            {"id": "b", "type": "episodic"},
            {"id": "c", "type": "hub"},
            {"type": "hub"}
          ],
          "edges": [
            {"source": "a", "target": "b", "label": "relates-to"},
            {"source": "c", "target": "a", "label": "relates-to"},
            {"source": "c", "target": "a"}
          ]
        }"#,
    )
    .unwrap();

    let (graph, status) = store::load_with_status(&path);
    assert_eq!(
        status,
        LoadStatus::Repaired {
            dropped_nodes: 2,
            dropped_edges: 2
        }
    );
    assert!(!graph.contains_node("b"));
    assert_eq!(graph.node("c").unwrap().node_type, MemoryType::Hub);
    assert_eq!(graph.edges.len(), 1);
}

#[test]
fn writing_after_a_repair_keeps_the_surviving_graph() {
    let tmp = TempDir::new().unwrap();
    let scope = Scope::open(tmp.path());
    std::fs::write(scope.graph_path(), ONE_BAD_LABEL).unwrap();

    scope.link("c", "a", &EdgeLabel::RELATES_TO, false).unwrap();

    let (graph, status) = scope.load_graph_with_status();
    assert_eq!(status, LoadStatus::Loaded);
    assert_eq!(graph.nodes.len(), 3);
    assert!(has_edge(&graph, "a", "b", Some(&EdgeLabel::RELATES_TO)));
    assert!(has_edge(&graph, "c", "a", Some(&EdgeLabel::RELATES_TO)));
}
