use serde::{Deserialize, Serialize};

/// Region every edge function deployment is pinned to.
pub const EDGE_REGION: &str = "us-east-1";

fn default_region() -> String {
    EDGE_REGION.to_string()
}

/// Non-secret stack settings, loaded from `cachefront.toml`.
///
/// `project` is required: it prefixes every synthesized physical identifier
/// and names the state file. Secrets never live here as plain fields read at
/// arbitrary times -- the optional `[credentials]` table is consumed once at
/// startup by the secret resolution chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackSettings {
    /// Project name, e.g. "bazel-remote-cache".
    pub project: String,

    /// Region for the origin bucket. The edge function itself is always
    /// deployed in [`EDGE_REGION`] regardless of this value.
    #[serde(default = "default_region")]
    pub region: String,
}
