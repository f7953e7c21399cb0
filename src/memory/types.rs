//! Core memory type definitions.
//!
//! Defines [`MemoryType`] (the six kinds of stored knowledge) and
//! [`MemoryRecord`] (one memory as handed over by the note store).

use serde::{Deserialize, Serialize};

/// The kinds of memory the store holds. Doubles as the graph node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    /// A choice that was made, with its rationale.
    Decision,
    /// Something learned while working.
    Learning,
    /// A produced document, file, or output.
    Artifact,
    /// A pitfall worth warning about.
    Gotcha,
    /// A trail marker left mid-task.
    Breadcrumb,
    /// Aggregation and navigation anchor. Drives hub-focused diagrams.
    Hub,
}

impl MemoryType {
    pub const ALL: [MemoryType; 6] = [
        Self::Decision,
        Self::Learning,
        Self::Artifact,
        Self::Gotcha,
        Self::Breadcrumb,
        Self::Hub,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Learning => "learning",
            Self::Artifact => "artifact",
            Self::Gotcha => "gotcha",
            Self::Breadcrumb => "breadcrumb",
            Self::Hub => "hub",
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decision" => Ok(Self::Decision),
            "learning" => Ok(Self::Learning),
            "artifact" => Ok(Self::Artifact),
            "gotcha" => Ok(Self::Gotcha),
            "breadcrumb" => Ok(Self::Breadcrumb),
            "hub" => Ok(Self::Hub),
            _ => Err(format!("unknown memory type: {s}")),
        }
    }
}

/// A single memory as seen by the engine: identity, kind, and current content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Slug, unique within a scope.
    pub id: String,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub content: String,
}

impl MemoryRecord {
    pub fn new(id: impl Into<String>, memory_type: MemoryType, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            memory_type,
            content: content.into(),
        }
    }
}
