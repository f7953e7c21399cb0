//! MCP `auto_link` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `auto_link` MCP tool.
///
/// Usually called right after a memory is written.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AutoLinkParams {
    #[schemars(description = "ID of the memory to link")]
    pub id: String,

    /// Current content. Read from the memory store when omitted.
    #[schemars(description = "Current memory content. Read from the memory store when omitted.")]
    pub content: Option<String>,

    #[schemars(description = "Minimum cosine similarity (0.0-1.0). Defaults to the configured auto-link threshold.")]
    pub threshold: Option<f64>,

    #[schemars(description = "Scope name or directory. Defaults to the configured scope.")]
    pub scope: Option<String>,
}
