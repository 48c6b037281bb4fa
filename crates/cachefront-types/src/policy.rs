//! IAM-shaped policy documents.
//!
//! Field names serialize to the exact JSON the platform expects
//! (`Version`/`Statement`/`Effect`/`Principal`/`Action`/`Resource`).
//! Principals and resource ARNs are plain strings: policy documents are only
//! ever built from already-resolved identities, never from forward
//! references.

use serde::{Deserialize, Serialize};

/// The policy language version every document in this system uses.
pub const POLICY_VERSION: &str = "2012-10-17";

/// A structured permission statement set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Principal", skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    #[serde(rename = "Action")]
    pub action: Vec<String>,
    #[serde(rename = "Resource", skip_serializing_if = "Option::is_none")]
    pub resource: Option<Vec<String>>,
}

impl Statement {
    /// An Allow statement with the given actions; principal and resources
    /// are attached with the builder methods.
    pub fn allow(actions: &[&str]) -> Self {
        Self {
            effect: Effect::Allow,
            principal: None,
            action: actions.iter().map(|a| a.to_string()).collect(),
            resource: None,
        }
    }

    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn resources(mut self, resources: Vec<String>) -> Self {
        self.resource = Some(resources);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// A policy principal: either a platform identity ARN or a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    #[serde(rename = "AWS")]
    Aws(String),
    #[serde(rename = "Service")]
    Service(String),
}
