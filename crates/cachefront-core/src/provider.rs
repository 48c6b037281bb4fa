//! The cloud-provider port.
//!
//! The engine materializes resources through this trait; the concrete
//! backend lives in `cachefront-infra`. Implementations must reconcile:
//! `ensure` is idempotent per logical name, updating in place or reporting
//! no change rather than ever duplicating a resource.

use cachefront_types::error::ProvisionError;
use cachefront_types::resource::{DesiredResource, LogicalName, ResourceState};
use serde::{Deserialize, Serialize};

use std::fmt;

/// What reconciling one resource against existing state did (or would do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyAction {
    /// No remote state existed; the resource was created.
    Create,
    /// Remote state existed with a different configuration; updated in place.
    Update,
    /// Remote state already matched the desired configuration.
    Unchanged,
}

impl fmt::Display for ApplyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplyAction::Create => "create",
            ApplyAction::Update => "update",
            ApplyAction::Unchanged => "unchanged",
        };
        write!(f, "{s}")
    }
}

/// The outcome of materializing (or previewing) one resource.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub state: ResourceState,
    pub action: ApplyAction,
}

/// Backend that materializes resource declarations.
pub trait CloudProvider: Send + Sync {
    /// Reconcile one resource: create it, update it in place, or leave it
    /// untouched when the desired configuration already matches.
    fn ensure(
        &self,
        desired: &DesiredResource,
    ) -> impl std::future::Future<Output = Result<Materialized, ProvisionError>> + Send;

    /// Same reconciliation decision as `ensure`, with no mutation.
    fn preview(
        &self,
        desired: &DesiredResource,
    ) -> impl std::future::Future<Output = Result<Materialized, ProvisionError>> + Send;

    /// Remove a resource. Returns whether it existed.
    fn delete(
        &self,
        name: &LogicalName,
    ) -> impl std::future::Future<Output = Result<bool, ProvisionError>> + Send;

    /// Logical names of every resource currently recorded in backing state,
    /// declared or not. The engine uses this to find records whose
    /// declaration has since disappeared (e.g. an authenticator provisioned
    /// before its credentials were removed).
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<LogicalName>, ProvisionError>> + Send;
}
