//! MCP `graph_impact` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `graph_impact` MCP tool: what depends on a memory.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GraphImpactParams {
    #[schemars(description = "Memory ID to analyse")]
    pub id: String,

    #[schemars(description = "Scope name or directory. Defaults to the configured scope.")]
    pub scope: Option<String>,
}
