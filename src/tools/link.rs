//! MCP `link` and `unlink` tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `link` MCP tool.
///
/// Creates one directed edge. Idempotent on the (source, target, label) triple.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LinkParams {
    #[schemars(description = "ID of the source memory")]
    pub source: String,

    #[schemars(description = "ID of the target memory")]
    pub target: String,

    /// Edge label. Defaults to `"relates-to"`.
    #[schemars(
        description = "Relationship label, e.g. 'relates-to', 'implements', 'depends-on', 'supersedes'. Defaults to 'relates-to'."
    )]
    pub label: Option<String>,

    #[schemars(
        description = "If true, also create the reverse edge with the reciprocal label (implements -> implemented-by). Defaults to false."
    )]
    pub reciprocal: Option<bool>,

    #[schemars(description = "Scope name or directory. Defaults to the configured scope.")]
    pub scope: Option<String>,
}

/// Parameters for the `unlink` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UnlinkParams {
    #[schemars(description = "ID of the source memory")]
    pub source: String,

    #[schemars(description = "ID of the target memory")]
    pub target: String,

    /// Only remove edges with this label. All `source -> target` edges when omitted.
    #[schemars(description = "Only remove the edge with this label. Removes every source -> target edge when omitted.")]
    pub label: Option<String>,

    #[schemars(description = "Scope name or directory. Defaults to the configured scope.")]
    pub scope: Option<String>,
}
