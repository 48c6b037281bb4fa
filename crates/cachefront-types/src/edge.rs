//! Edge request/response wire shapes.
//!
//! These mirror the distribution platform's request-interception event:
//! `Records[0].cf.request`, headers carried as lists of `{key, value}`
//! entries keyed by the lower-cased header name (the transport allows
//! multiple values per name), and origin-level custom headers under
//! `origin.s3.customHeaders`.
//!
//! Every optional field defaults on deserialization: absence is a valid
//! input class for the edge decision function, never a parse fault.

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// One header value entry. `key` preserves the original casing; the map key
/// it lives under is the transport's lower-cased header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Header mapping: lower-cased name -> list of entries.
pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

/// The full interception event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub cf: CfRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfRecord {
    pub request: EdgeRequest,
}

/// The unit the edge authenticator processes: one client request as seen at
/// the distribution layer, before forwarding to the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRequest {
    pub method: String,
    pub uri: String,
    #[serde(default)]
    pub querystring: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Origin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Origin {
    #[serde(rename = "domainName", default)]
    pub domain_name: String,
    #[serde(default)]
    pub path: String,
    /// Origin-level custom headers -- the sole credential transport from
    /// provisioning time into the running edge function.
    #[serde(rename = "customHeaders", default)]
    pub custom_headers: Headers,
}

/// A terminal rejection generated at the edge; the request is never
/// forwarded to the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeResponse {
    pub status: String,
    #[serde(rename = "statusDescription")]
    pub status_description: String,
    #[serde(default)]
    pub headers: Headers,
}

/// The outcome of one edge authenticator invocation.
///
/// Serializes untagged: a forwarded request and a terminal response are
/// distinguished by shape on the wire, exactly as the platform expects the
/// interceptor's return value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EdgeDecision {
    /// Continue to the origin with the original request, unmodified.
    Forward(EdgeRequest),
    /// Reject with a terminal response.
    Reject(EdgeResponse),
}
