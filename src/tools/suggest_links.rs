//! MCP `suggest_links` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SuggestLinksParams {
    #[schemars(description = "Minimum cosine similarity (0.0-1.0). Defaults to the configured suggest threshold.")]
    pub threshold: Option<f64>,

    #[schemars(description = "Most proposals per memory. Defaults to the configured suggest limit.")]
    pub limit: Option<usize>,

    #[schemars(description = "Create the proposed edges instead of only returning them. Defaults to false.")]
    pub auto_create: Option<bool>,

    #[schemars(description = "Scope name or directory. Defaults to the configured scope.")]
    pub scope: Option<String>,
}
