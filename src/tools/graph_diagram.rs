//! MCP `graph_diagram` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `graph_diagram` MCP tool.
///
/// Without `focus` the diagram is hub-focused when hubs exist; `full` draws
/// everything.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct GraphDiagramParams {
    #[schemars(description = "Draw only the neighbourhood of this memory ID")]
    pub focus: Option<String>,

    #[schemars(description = "Hop limit around 'focus' (either direction). Defaults to 1.")]
    pub depth: Option<usize>,

    #[schemars(description = "Draw the whole graph even when hub memories exist. Defaults to false.")]
    pub full: Option<bool>,

    #[schemars(
        description = "Only draw these memory types: decision, learning, artifact, gotcha, breadcrumb, hub"
    )]
    pub types: Option<Vec<String>>,

    #[schemars(description = "Flowchart direction: TD, LR, BT or RL. Defaults to the configured direction.")]
    pub direction: Option<String>,

    #[schemars(description = "Scope name or directory. Defaults to the configured scope.")]
    pub scope: Option<String>,
}
