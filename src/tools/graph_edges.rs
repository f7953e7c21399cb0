//! MCP `graph_edges` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GraphEdgesParams {
    #[schemars(description = "Memory ID whose edges to list")]
    pub id: String,

    #[schemars(description = "Scope name or directory. Defaults to the configured scope.")]
    pub scope: Option<String>,
}
