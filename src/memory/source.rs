//! Read access to memories for staleness checks and node typing.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::types::{MemoryRecord, MemoryType};
use crate::graph::types::validate_node_id;

/// Read-only view over the memories of one scope.
pub trait MemorySource {
    /// Look up a single memory by id.
    fn get(&self, id: &str) -> Result<Option<MemoryRecord>>;

    /// Every memory in the scope, in a stable order.
    fn list(&self) -> Result<Vec<MemoryRecord>>;
}

impl MemorySource for Vec<MemoryRecord> {
    fn get(&self, id: &str) -> Result<Option<MemoryRecord>> {
        Ok(self.iter().find(|m| m.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<MemoryRecord>> {
        Ok(self.clone())
    }
}

/// Memories stored as `<root>/<type>/<id>.md` files.
///
/// Directories that do not name a [`MemoryType`] are ignored.
#[derive(Debug, Clone)]
pub struct MemoryDir {
    root: PathBuf,
}

impl MemoryDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, memory_type: MemoryType, id: &str) -> PathBuf {
        self.root.join(memory_type.as_str()).join(format!("{id}.md"))
    }

    /// Write (or overwrite) a memory file, creating its type directory.
    pub fn write(&self, record: &MemoryRecord) -> Result<PathBuf> {
        let path = self.path_for(record.memory_type, &record.id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        std::fs::write(&path, &record.content)
            .with_context(|| format!("failed to write memory {}", path.display()))?;
        Ok(path)
    }
}

impl MemorySource for MemoryDir {
    fn get(&self, id: &str) -> Result<Option<MemoryRecord>> {
        if validate_node_id(id).is_err() {
            return Ok(None);
        }
        for memory_type in MemoryType::ALL {
            let path = self.path_for(memory_type, id);
            if path.is_file() {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read memory {}", path.display()))?;
                return Ok(Some(MemoryRecord::new(id, memory_type, content)));
            }
        }
        Ok(None)
    }

    fn list(&self) -> Result<Vec<MemoryRecord>> {
        let mut records = Vec::new();
        for memory_type in MemoryType::ALL {
            let dir = self.root.join(memory_type.as_str());
            if !dir.is_dir() {
                continue;
            }
            let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
                .with_context(|| format!("failed to list {}", dir.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
                .collect();
            paths.sort();

            for path in paths {
                let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read memory {}", path.display()))?;
                records.push(MemoryRecord::new(id, memory_type, content));
            }
        }
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_get_and_list() {
        let tmp = TempDir::new().unwrap();
        let dir = MemoryDir::new(tmp.path().join("memories"));

        dir.write(&MemoryRecord::new("use-sqlite", MemoryType::Decision, "We chose SQLite"))
            .unwrap();
        dir.write(&MemoryRecord::new("fts-gotcha", MemoryType::Gotcha, "FTS5 needs rowid sync"))
            .unwrap();

        let got = dir.get("use-sqlite").unwrap().unwrap();
        assert_eq!(got.memory_type, MemoryType::Decision);
        assert_eq!(got.content, "We chose SQLite");

        let ids: Vec<String> = dir.list().unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["fts-gotcha", "use-sqlite"]);
    }

    #[test]
    fn missing_root_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let dir = MemoryDir::new(tmp.path().join("nope"));
        assert!(dir.list().unwrap().is_empty());
        assert!(dir.get("anything").unwrap().is_none());
    }

    #[test]
    fn ids_cannot_escape_the_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("scope").join("memories");
        std::fs::create_dir_all(root.join("decision")).unwrap();
        std::fs::write(tmp.path().join("scope").join("secret.md"), "outside").unwrap();

        let dir = MemoryDir::new(&root);
        assert!(dir.get("../../secret").unwrap().is_none());
        assert!(dir.get("..\\..\\secret").unwrap().is_none());
        assert!(dir.get("").unwrap().is_none());
    }

    #[test]
    fn unknown_type_directories_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("memories");
        std::fs::create_dir_all(root.join("episodic")).unwrap();
        std::fs::write(root.join("episodic").join("x.md"), "ignored").unwrap();

        let dir = MemoryDir::new(&root);
        assert!(dir.list().unwrap().is_empty());
    }
}
