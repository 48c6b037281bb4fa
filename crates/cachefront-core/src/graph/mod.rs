//! The declarative resource dependency graph.
//!
//! A [`ResourceGraph`] collects [`ResourceDeclaration`]s: one node per
//! managed external resource, each with explicit dependency edges and a
//! deferred configuration future that produces the concrete config JSON once
//! upstream outputs resolve. Declaring a resource hands back a
//! [`ResourceHandle`] -- a [`Deferred`] over the resource's resolved state --
//! which downstream declarations capture to wire their own configs.
//!
//! Invariants enforced here:
//! - logical names are unique (rejected at declare time)
//! - the graph is a DAG with no unknown references (rejected at validation /
//!   wave computation, before any remote mutation)

pub mod dag;

use std::collections::HashMap;

use cachefront_types::error::{ConfigError, GraphError};
use cachefront_types::resource::{LogicalName, ResourceKind, ResourceState};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::deferred::{Deferred, Resolver};

/// A deferred configuration: resolves to the resource's concrete config JSON
/// once every upstream value it reads has resolved.
pub type ConfigFuture = BoxFuture<'static, Result<Value, GraphError>>;

/// Handle to a declared resource's eventual resolved state.
pub type ResourceHandle = Deferred<ResourceState>;

/// Wrap a fully static configuration (no deferred inputs) as a
/// [`ConfigFuture`].
pub fn static_config(config: Value) -> ConfigFuture {
    async move { Ok(config) }.boxed()
}

/// One declared resource: logical identity, kind, dependency edges, and the
/// deferred configuration the engine evaluates at materialization time.
pub struct ResourceDeclaration {
    pub name: LogicalName,
    pub kind: ResourceKind,
    pub depends_on: Vec<LogicalName>,
    config: Option<ConfigFuture>,
    resolver: Option<Resolver<ResourceState>>,
    handle: ResourceHandle,
}

impl ResourceDeclaration {
    /// Handle to this resource's eventual state.
    pub fn handle(&self) -> ResourceHandle {
        self.handle.clone()
    }
}

/// The full set of declarations for one provisioning run.
#[derive(Default)]
pub struct ResourceGraph {
    declarations: Vec<ResourceDeclaration>,
    index: HashMap<LogicalName, usize>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource.
    ///
    /// `depends_on` lists the logical names of every resource whose outputs
    /// the config future reads; the engine guarantees those are resolved
    /// before the future is evaluated. A config future awaiting a handle not
    /// listed here would deadlock, so the two must stay in sync.
    ///
    /// Fails immediately on a duplicate logical name. Unknown dependency
    /// names are caught by [`ResourceGraph::validate`] (dependencies may be
    /// declared in any order).
    pub fn declare(
        &mut self,
        name: &str,
        kind: ResourceKind,
        depends_on: &[&str],
        config: ConfigFuture,
    ) -> Result<ResourceHandle, ConfigError> {
        let name = LogicalName::new(name);
        if self.index.contains_key(&name) {
            return Err(ConfigError::DuplicateResource(name.to_string()));
        }

        let (handle, resolver) = Deferred::pending(name.to_string());
        let declaration = ResourceDeclaration {
            name: name.clone(),
            kind,
            depends_on: depends_on.iter().map(|d| LogicalName::new(*d)).collect(),
            config: Some(config),
            resolver: Some(resolver),
            handle: handle.clone(),
        };

        self.index.insert(name, self.declarations.len());
        self.declarations.push(declaration);
        Ok(handle)
    }

    /// Validate the graph: every dependency exists and the edges form a DAG.
    pub fn validate(&self) -> Result<(), ConfigError> {
        dag::execution_waves(self).map(|_| ())
    }

    pub fn declarations(&self) -> &[ResourceDeclaration] {
        &self.declarations
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&LogicalName::new(name))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Number of declared resources of the given kind.
    pub fn count_kind(&self, kind: ResourceKind) -> usize {
        self.declarations.iter().filter(|d| d.kind == kind).count()
    }

    /// Detach the parts the engine consumes for one declaration: its config
    /// future and the resolver for its handle. Each declaration is
    /// materialized exactly once per run.
    pub(crate) fn take_materialization(
        &mut self,
        idx: usize,
    ) -> Option<(LogicalName, ResourceKind, ConfigFuture, Resolver<ResourceState>)> {
        let decl = self.declarations.get_mut(idx)?;
        let config = decl.config.take()?;
        let resolver = decl.resolver.take()?;
        Some((decl.name.clone(), decl.kind, config, resolver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_name_rejected_at_declare_time() {
        let mut graph = ResourceGraph::new();
        graph
            .declare("cache-bucket", ResourceKind::Bucket, &[], static_config(json!({})))
            .unwrap();
        let err = graph
            .declare("cache-bucket", ResourceKind::Bucket, &[], static_config(json!({})))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateResource(_)));
    }

    #[test]
    fn test_validate_accepts_forward_declared_dependency() {
        // Dependencies may be declared after their dependents.
        let mut graph = ResourceGraph::new();
        graph
            .declare("b", ResourceKind::Distribution, &["a"], static_config(json!({})))
            .unwrap();
        graph
            .declare("a", ResourceKind::Bucket, &[], static_config(json!({})))
            .unwrap();
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_dependency() {
        let mut graph = ResourceGraph::new();
        graph
            .declare("cdn", ResourceKind::Distribution, &["nope"], static_config(json!({})))
            .unwrap();
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_count_kind() {
        let mut graph = ResourceGraph::new();
        graph
            .declare("a", ResourceKind::Bucket, &[], static_config(json!({})))
            .unwrap();
        graph
            .declare("b", ResourceKind::Function, &[], static_config(json!({})))
            .unwrap();
        assert_eq!(graph.count_kind(ResourceKind::Function), 1);
        assert_eq!(graph.count_kind(ResourceKind::Distribution), 0);
    }

    #[tokio::test]
    async fn test_handle_resolves_through_take_materialization() {
        let mut graph = ResourceGraph::new();
        let handle = graph
            .declare("a", ResourceKind::Bucket, &[], static_config(json!({})))
            .unwrap();

        let (name, kind, _config, resolver) = graph.take_materialization(0).unwrap();
        resolver.resolve(ResourceState {
            name,
            kind,
            outputs: [("arn".to_string(), "arn:aws:s3:::a".to_string())].into(),
        });

        let state = handle.wait().await.unwrap();
        assert_eq!(state.output("arn"), Some("arn:aws:s3:::a"));
        // Second take yields nothing: materialize-once per run.
        assert!(graph.take_materialization(0).is_none());
    }
}
