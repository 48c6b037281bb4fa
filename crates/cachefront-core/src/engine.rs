//! Wave-scheduled materialization of the resource graph.
//!
//! Resources with no unresolved dependencies materialize concurrently;
//! a resource never materializes before everything it reads has resolved.
//! Between waves the engine checks the cancellation token: an aborted run
//! leaves partially materialized resources as-is for the next reconciling
//! run (no automatic rollback).

use cachefront_types::error::ProvisionError;
use cachefront_types::resource::{DesiredResource, LogicalName};
use futures_util::future::try_join_all;
use tokio_util::sync::CancellationToken;

use crate::graph::{ResourceGraph, dag};
use crate::provider::{ApplyAction, CloudProvider};

#[derive(Clone, Copy)]
enum Mode {
    Apply,
    Preview,
}

/// Per-resource reconciliation outcomes for one run, in completion order
/// within waves.
#[derive(Debug, Default)]
pub struct ApplySummary {
    pub actions: Vec<(LogicalName, ApplyAction)>,
    /// Recorded resources with no declaration in this run, removed during
    /// apply (e.g. the authenticator after its credentials were unset).
    pub removed: Vec<LogicalName>,
}

impl ApplySummary {
    pub fn count(&self, action: ApplyAction) -> usize {
        self.actions.iter().filter(|(_, a)| *a == action).count()
    }

    /// True when the run produced zero resource mutations.
    pub fn all_unchanged(&self) -> bool {
        self.removed.is_empty()
            && self.actions.iter().all(|(_, a)| *a == ApplyAction::Unchanged)
    }
}

/// Materialize every declared resource, reconciling against existing state.
pub async fn apply<P: CloudProvider>(
    graph: &mut ResourceGraph,
    provider: &P,
    cancel: &CancellationToken,
) -> Result<ApplySummary, ProvisionError> {
    run(graph, provider, cancel, Mode::Apply).await
}

/// Compute the reconciliation decisions without mutating anything.
pub async fn preview<P: CloudProvider>(
    graph: &mut ResourceGraph,
    provider: &P,
    cancel: &CancellationToken,
) -> Result<ApplySummary, ProvisionError> {
    run(graph, provider, cancel, Mode::Preview).await
}

async fn run<P: CloudProvider>(
    graph: &mut ResourceGraph,
    provider: &P,
    cancel: &CancellationToken,
    mode: Mode,
) -> Result<ApplySummary, ProvisionError> {
    // Fatal configuration errors abort before any remote mutation.
    let waves = dag::execution_waves(graph)?;

    let mut summary = ApplySummary::default();
    for (wave_no, wave) in waves.into_iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::warn!(wave = wave_no, "provisioning run aborted");
            return Err(ProvisionError::Cancelled);
        }

        let mut jobs = Vec::with_capacity(wave.len());
        for idx in wave {
            if let Some(parts) = graph.take_materialization(idx) {
                jobs.push(parts);
            }
        }

        let results = try_join_all(jobs.into_iter().map(|(name, kind, config, resolver)| {
            async move {
                let config = config.await?;
                let desired = DesiredResource {
                    name: name.clone(),
                    kind,
                    config,
                };
                let materialized = match mode {
                    Mode::Apply => provider.ensure(&desired).await?,
                    Mode::Preview => provider.preview(&desired).await?,
                };
                tracing::debug!(resource = %name, action = %materialized.action, "reconciled");
                let action = materialized.action;
                resolver.resolve(materialized.state);
                Ok::<_, ProvisionError>((name, action))
            }
        }))
        .await?;

        summary.actions.extend(results);
    }

    // Reconciliation is two-sided: state records whose declaration vanished
    // (a conditional resource whose condition flipped off) are removed, or
    // they would survive every future run.
    if matches!(mode, Mode::Apply) {
        for name in provider.list().await? {
            if !graph.contains(name.as_str()) && provider.delete(&name).await? {
                tracing::info!(resource = %name, "removed, no longer declared");
                summary.removed.push(name);
            }
        }
    }

    Ok(summary)
}

/// Remove every declared resource, walking the waves in reverse so nothing
/// is deleted before its dependents. Returns the names that existed.
pub async fn destroy<P: CloudProvider>(
    graph: &ResourceGraph,
    provider: &P,
    cancel: &CancellationToken,
) -> Result<Vec<LogicalName>, ProvisionError> {
    let waves = dag::execution_waves(graph)?;

    let mut deleted = Vec::new();
    for wave in waves.into_iter().rev() {
        if cancel.is_cancelled() {
            return Err(ProvisionError::Cancelled);
        }

        let names: Vec<LogicalName> = wave
            .into_iter()
            .map(|idx| graph.declarations()[idx].name.clone())
            .collect();

        let results = try_join_all(names.into_iter().map(|name| async move {
            let existed = provider.delete(&name).await?;
            Ok::<_, ProvisionError>((name, existed))
        }))
        .await?;

        for (name, existed) in results {
            if existed {
                tracing::info!(resource = %name, "deleted");
                deleted.push(name);
            }
        }
    }

    // The declared graph may not cover everything in state (conditional
    // resources provisioned under a condition that no longer holds), so
    // destroy sweeps the remaining records too.
    for name in provider.list().await? {
        if provider.delete(&name).await? {
            tracing::info!(resource = %name, "deleted");
            deleted.push(name);
        }
    }

    Ok(deleted)
}
