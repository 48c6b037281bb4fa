//! Local JSON state backend behind the `CloudProvider` port.
//!
//! The backend reconciles declared resources against a state file instead of
//! a remote control plane: `ensure` creates, updates in place, or reports
//! unchanged by comparing the fully resolved config against the recorded
//! one. Physical identifiers are synthesized deterministically from the
//! project and logical name, so previews, reruns, and reopened state files
//! all agree on every output value.

use std::collections::BTreeMap;
use std::path::PathBuf;

use cachefront_core::provider::{ApplyAction, CloudProvider, Materialized};
use cachefront_types::config::{EDGE_REGION, StackSettings};
use cachefront_types::error::ProvisionError;
use cachefront_types::resource::{DesiredResource, LogicalName, ResourceKind, ResourceState};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

/// One recorded resource: the config it was last applied with, plus its
/// synthesized outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateRecord {
    kind: ResourceKind,
    config: Value,
    outputs: BTreeMap<String, String>,
}

/// On-disk shape of the state file.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    project: String,
    resources: BTreeMap<String, StateRecord>,
}

/// File-backed provider: a DashMap cache over a pretty-printed JSON file.
#[derive(Debug)]
pub struct LocalStateBackend {
    path: PathBuf,
    project: String,
    region: String,
    records: DashMap<String, StateRecord>,
    /// Serializes file writes; concurrent `ensure` calls within a wave may
    /// otherwise interleave partial snapshots.
    persist_lock: Mutex<()>,
}

/// Default state file location: `~/.cachefront/<project>.state.json`.
pub fn default_state_path(project: &str) -> Result<PathBuf, ProvisionError> {
    let home = dirs::home_dir()
        .ok_or_else(|| ProvisionError::StateIo("home directory unavailable".to_string()))?;
    Ok(home.join(".cachefront").join(format!("{project}.state.json")))
}

impl LocalStateBackend {
    /// Open (or create) the state file at `path` and load it into memory.
    pub async fn open(path: PathBuf, settings: &StackSettings) -> Result<Self, ProvisionError> {
        let records = DashMap::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let file: StateFile = serde_json::from_str(&content).map_err(|err| {
                    ProvisionError::StateIo(format!("{}: {err}", path.display()))
                })?;
                for (name, record) in file.resources {
                    records.insert(name, record);
                }
                tracing::debug!(
                    path = %path.display(),
                    resources = records.len(),
                    "loaded existing state"
                );
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no state file yet, starting empty");
            }
            Err(err) => {
                return Err(ProvisionError::StateIo(format!(
                    "{}: {err}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            path,
            project: settings.project.clone(),
            region: settings.region.clone(),
            records,
            persist_lock: Mutex::new(()),
        })
    }

    /// Look up the recorded state of one resource, if present.
    pub fn resource_state(&self, name: &str) -> Option<ResourceState> {
        self.records.get(name).map(|r| ResourceState {
            name: LogicalName::new(name),
            kind: r.kind,
            outputs: r.outputs.clone(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Deterministic short suffix for physical identifiers.
    fn suffix(&self, name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.project.as_bytes());
        hasher.update(b"/");
        hasher.update(name.as_bytes());
        hasher
            .finalize()
            .iter()
            .take(6)
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// Synthesize the full output set a resource of this kind exposes.
    fn synthesize_outputs(&self, name: &str, kind: ResourceKind) -> BTreeMap<String, String> {
        let suffix = self.suffix(name);
        let physical = format!("{name}-{suffix}");
        let mut outputs = BTreeMap::new();
        let mut put = |k: &str, v: String| {
            outputs.insert(k.to_string(), v);
        };

        match kind {
            ResourceKind::Bucket => {
                put("id", physical.clone());
                put("name", physical.clone());
                put("arn", format!("arn:aws:s3:::{physical}"));
                put("bucketDomainName", format!("{physical}.s3.amazonaws.com"));
                put(
                    "bucketRegionalDomainName",
                    format!("{physical}.s3.{}.amazonaws.com", self.region),
                );
            }
            ResourceKind::OriginAccessIdentity => {
                let id = format!("E{}", suffix.to_uppercase());
                put("id", id.clone());
                put(
                    "iamArn",
                    format!(
                        "arn:aws:iam::cloudfront:user/CloudFront Origin Access Identity {id}"
                    ),
                );
                put(
                    "cloudfrontAccessIdentityPath",
                    format!("origin-access-identity/cloudfront/{id}"),
                );
            }
            ResourceKind::BucketPolicy | ResourceKind::RolePolicyAttachment => {
                put("id", physical.clone());
            }
            ResourceKind::Role => {
                put("id", physical.clone());
                put("name", physical.clone());
                put("arn", format!("arn:aws:iam::000000000000:role/{physical}"));
            }
            ResourceKind::Function => {
                let arn = format!(
                    "arn:aws:lambda:{EDGE_REGION}:000000000000:function:{physical}"
                );
                put("id", physical.clone());
                put("name", physical.clone());
                put("qualifiedArn", format!("{arn}:1"));
                put("arn", arn);
            }
            ResourceKind::Distribution => {
                let id = format!("E{}", suffix.to_uppercase());
                put("id", id.clone());
                put(
                    "arn",
                    format!("arn:aws:cloudfront::000000000000:distribution/{id}"),
                );
                put("domainName", format!("{suffix}.cloudfront.net"));
            }
        }

        outputs
    }

    fn decide(&self, desired: &DesiredResource) -> ApplyAction {
        match self.records.get(desired.name.as_str()) {
            None => ApplyAction::Create,
            Some(existing) if existing.config == desired.config => ApplyAction::Unchanged,
            Some(_) => ApplyAction::Update,
        }
    }

    /// Write the current record set to disk.
    async fn persist(&self) -> Result<(), ProvisionError> {
        let _guard = self.persist_lock.lock().await;

        let file = StateFile {
            project: self.project.clone(),
            resources: self
                .records
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|err| ProvisionError::StateIo(err.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| ProvisionError::StateIo(format!("{}: {err}", parent.display())))?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|err| ProvisionError::StateIo(format!("{}: {err}", self.path.display())))
    }

    fn materialize(&self, desired: &DesiredResource, action: ApplyAction) -> Materialized {
        Materialized {
            state: ResourceState {
                name: desired.name.clone(),
                kind: desired.kind,
                outputs: self.synthesize_outputs(desired.name.as_str(), desired.kind),
            },
            action,
        }
    }
}

impl CloudProvider for LocalStateBackend {
    async fn ensure(&self, desired: &DesiredResource) -> Result<Materialized, ProvisionError> {
        let action = self.decide(desired);
        let materialized = self.materialize(desired, action);

        if action != ApplyAction::Unchanged {
            self.records.insert(
                desired.name.to_string(),
                StateRecord {
                    kind: desired.kind,
                    config: desired.config.clone(),
                    outputs: materialized.state.outputs.clone(),
                },
            );
            self.persist().await?;
        }

        tracing::debug!(resource = %desired.name, kind = %desired.kind, %action, "ensured");
        Ok(materialized)
    }

    async fn preview(&self, desired: &DesiredResource) -> Result<Materialized, ProvisionError> {
        Ok(self.materialize(desired, self.decide(desired)))
    }

    async fn delete(&self, name: &LogicalName) -> Result<bool, ProvisionError> {
        let removed = self.records.remove(name.as_str()).is_some();
        if removed {
            self.persist().await?;
            tracing::debug!(resource = %name, "deleted from state");
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<LogicalName>, ProvisionError> {
        Ok(self
            .records
            .iter()
            .map(|entry| LogicalName::new(entry.key().as_str()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachefront_core::{engine, topology};
    use cachefront_types::secret::Credentials;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    fn settings() -> StackSettings {
        StackSettings {
            project: "bazel-remote-cache".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    async fn backend(dir: &TempDir) -> LocalStateBackend {
        LocalStateBackend::open(dir.path().join("test.state.json"), &settings())
            .await
            .unwrap()
    }

    fn desired(name: &str, kind: ResourceKind, config: Value) -> DesiredResource {
        DesiredResource {
            name: LogicalName::new(name),
            kind,
            config,
        }
    }

    #[tokio::test]
    async fn test_first_ensure_creates() {
        let tmp = TempDir::new().unwrap();
        let backend = backend(&tmp).await;

        let result = backend
            .ensure(&desired("cache-bucket", ResourceKind::Bucket, json!({"a": 1})))
            .await
            .unwrap();
        assert_eq!(result.action, ApplyAction::Create);
        assert!(result.state.outputs["arn"].starts_with("arn:aws:s3:::cache-bucket-"));
    }

    #[tokio::test]
    async fn test_second_ensure_with_same_config_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let backend = backend(&tmp).await;
        let resource = desired("cache-bucket", ResourceKind::Bucket, json!({"a": 1}));

        let first = backend.ensure(&resource).await.unwrap();
        let second = backend.ensure(&resource).await.unwrap();
        assert_eq!(second.action, ApplyAction::Unchanged);
        assert_eq!(second.state.outputs, first.state.outputs);
    }

    #[tokio::test]
    async fn test_changed_config_updates_in_place() {
        let tmp = TempDir::new().unwrap();
        let backend = backend(&tmp).await;

        backend
            .ensure(&desired("cache-bucket", ResourceKind::Bucket, json!({"a": 1})))
            .await
            .unwrap();
        let result = backend
            .ensure(&desired("cache-bucket", ResourceKind::Bucket, json!({"a": 2})))
            .await
            .unwrap();
        assert_eq!(result.action, ApplyAction::Update);
    }

    #[tokio::test]
    async fn test_preview_does_not_touch_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.state.json");
        let backend = LocalStateBackend::open(path.clone(), &settings())
            .await
            .unwrap();

        let result = backend
            .preview(&desired("cache-bucket", ResourceKind::Bucket, json!({})))
            .await
            .unwrap();
        assert_eq!(result.action, ApplyAction::Create);
        assert!(!path.exists());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_outputs_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.state.json");
        let resource = desired("cache-bucket", ResourceKind::Bucket, json!({"a": 1}));

        let first = {
            let backend = LocalStateBackend::open(path.clone(), &settings())
                .await
                .unwrap();
            backend.ensure(&resource).await.unwrap()
        };

        let backend = LocalStateBackend::open(path, &settings()).await.unwrap();
        let reopened = backend.resource_state("cache-bucket").unwrap();
        assert_eq!(reopened.outputs, first.state.outputs);
        // And a rerun against the reopened state reports no drift.
        assert_eq!(
            backend.ensure(&resource).await.unwrap().action,
            ApplyAction::Unchanged
        );
    }

    #[tokio::test]
    async fn test_delete_removes_and_reports() {
        let tmp = TempDir::new().unwrap();
        let backend = backend(&tmp).await;
        let name = LogicalName::new("cache-bucket");

        backend
            .ensure(&desired("cache-bucket", ResourceKind::Bucket, json!({})))
            .await
            .unwrap();
        assert!(backend.delete(&name).await.unwrap());
        assert!(!backend.delete(&name).await.unwrap());
        assert!(backend.resource_state("cache-bucket").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_state_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.state.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = LocalStateBackend::open(path, &settings()).await.unwrap_err();
        assert!(matches!(err, ProvisionError::StateIo(_)));
    }

    #[tokio::test]
    async fn test_full_stack_apply_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let backend = backend(&tmp).await;
        let credentials =
            Credentials::from_parts(Some("alice".to_string()), Some("s3cret".to_string()));
        let cancel = CancellationToken::new();

        let mut plan = topology::build_stack(&settings(), credentials.clone()).unwrap();
        let summary = engine::apply(&mut plan.graph, &backend, &cancel).await.unwrap();
        assert_eq!(summary.count(ApplyAction::Create), 7);

        let url = plan.url.wait().await.unwrap();
        assert!(url.starts_with("https://alice:s3cret@"));
        assert!(url.ends_with(".cloudfront.net"));

        // Second run: same config resolves to the same outputs, so every
        // resource reports unchanged.
        let mut plan = topology::build_stack(&settings(), credentials).unwrap();
        let summary = engine::apply(&mut plan.graph, &backend, &cancel).await.unwrap();
        assert!(summary.all_unchanged());
    }

    #[tokio::test]
    async fn test_unsetting_credentials_removes_the_function() {
        let tmp = TempDir::new().unwrap();
        let backend = backend(&tmp).await;
        let cancel = CancellationToken::new();
        let credentials =
            Credentials::from_parts(Some("alice".to_string()), Some("s3cret".to_string()));

        let mut plan = topology::build_stack(&settings(), credentials).unwrap();
        engine::apply(&mut plan.graph, &backend, &cancel).await.unwrap();
        assert!(backend.resource_state(topology::FUNCTION).is_some());

        // Credentials gone: the function leaves the graph, and reconciling
        // must take its state record with it.
        let mut plan = topology::build_stack(&settings(), None).unwrap();
        let summary = engine::apply(&mut plan.graph, &backend, &cancel).await.unwrap();
        let removed: Vec<&str> = summary.removed.iter().map(|n| n.as_str()).collect();
        assert_eq!(removed, vec![topology::FUNCTION]);
        assert!(backend.resource_state(topology::FUNCTION).is_none());
    }

    #[tokio::test]
    async fn test_destroy_after_credentials_unset_empties_state() {
        let tmp = TempDir::new().unwrap();
        let backend = backend(&tmp).await;
        let cancel = CancellationToken::new();
        let credentials =
            Credentials::from_parts(Some("alice".to_string()), Some("s3cret".to_string()));

        let mut plan = topology::build_stack(&settings(), credentials).unwrap();
        engine::apply(&mut plan.graph, &backend, &cancel).await.unwrap();

        // Destroy driven by the credential-less graph, which never declares
        // the function resource.
        let plan = topology::build_stack(&settings(), None).unwrap();
        let deleted = engine::destroy(&plan.graph, &backend, &cancel).await.unwrap();
        assert_eq!(deleted.len(), 7);
        assert!(backend.resource_state(topology::FUNCTION).is_none());
        assert!(backend.is_empty());
    }
}
