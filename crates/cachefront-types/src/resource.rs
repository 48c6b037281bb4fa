use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GraphError;

use std::collections::BTreeMap;
use std::fmt;

/// The logical name of a declared resource (e.g., "cache-bucket").
///
/// Identity within the resource graph: must be unique, and dependency edges
/// refer to it. Distinct from the physical identifier the platform assigns.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogicalName(pub String);

impl LogicalName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LogicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalName(\"{}\")", self.0)
    }
}

impl fmt::Display for LogicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of managed resource a declaration describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Object-store bucket (the cache origin).
    Bucket,
    /// Edge access identity authorizing the distribution against the bucket.
    OriginAccessIdentity,
    /// Bucket access policy scoped to the origin access identity.
    BucketPolicy,
    /// Execution role assumable by the edge-function runtime.
    Role,
    /// Managed execution policy attachment on the role.
    RolePolicyAttachment,
    /// Edge authenticator function.
    Function,
    /// Caching distribution front end.
    Distribution,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Bucket => "bucket",
            ResourceKind::OriginAccessIdentity => "origin-access-identity",
            ResourceKind::BucketPolicy => "bucket-policy",
            ResourceKind::Role => "role",
            ResourceKind::RolePolicyAttachment => "role-policy-attachment",
            ResourceKind::Function => "function",
            ResourceKind::Distribution => "distribution",
        };
        write!(f, "{s}")
    }
}

/// The fully resolved configuration of a resource, ready for the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredResource {
    pub name: LogicalName,
    pub kind: ResourceKind,
    /// Concrete configuration JSON -- all deferred inputs already resolved.
    pub config: Value,
}

/// The resolved outputs of a materialized resource.
///
/// Downstream declarations read these through deferred handles; they never
/// observe a partially resolved state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub name: LogicalName,
    pub kind: ResourceKind,
    /// Platform-assigned attributes (`arn`, `domainName`, ...), keyed by name.
    pub outputs: BTreeMap<String, String>,
}

impl ResourceState {
    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(String::as_str)
    }

    /// Read an output, failing with an error naming the resource and the
    /// missing attribute. Policy statements and downstream configs must only
    /// ever reference outputs that resolved.
    pub fn require_output(&self, key: &str) -> Result<String, GraphError> {
        self.outputs
            .get(key)
            .cloned()
            .ok_or_else(|| GraphError::MissingOutput {
                resource: self.name.to_string(),
                output: key.to_string(),
            })
    }
}
