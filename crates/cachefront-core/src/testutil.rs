//! In-memory `CloudProvider` for engine and topology tests.

use cachefront_types::error::ProvisionError;
use cachefront_types::resource::{DesiredResource, LogicalName, ResourceKind, ResourceState};
use serde_json::Value;

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::provider::{ApplyAction, CloudProvider, Materialized};

/// Remembers configs per logical name so reconciliation decisions behave
/// like a real backend, and records the order of `ensure` calls.
#[derive(Default)]
pub(crate) struct FakeProvider {
    records: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn call_order(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn stored_config(&self, name: &str) -> Option<Value> {
        self.records.lock().unwrap().get(name).cloned()
    }

    fn decide(&self, desired: &DesiredResource) -> ApplyAction {
        match self.records.lock().unwrap().get(desired.name.as_str()) {
            None => ApplyAction::Create,
            Some(existing) if *existing == desired.config => ApplyAction::Unchanged,
            Some(_) => ApplyAction::Update,
        }
    }
}

/// Fake outputs covering every attribute the fixed topology reads.
fn fake_state(name: &LogicalName, kind: ResourceKind) -> ResourceState {
    let mut outputs = BTreeMap::new();
    let mut put = |k: &str, v: String| {
        outputs.insert(k.to_string(), v);
    };
    put("id", format!("{name}-phys"));
    put("name", format!("{name}-phys"));
    put("arn", format!("arn:fake:{kind}:{name}"));
    put("bucketDomainName", format!("{name}.s3.amazonaws.com"));
    put(
        "bucketRegionalDomainName",
        format!("{name}.s3.us-east-1.amazonaws.com"),
    );
    put("iamArn", format!("arn:fake:iam::cloudfront:user/{name}"));
    put(
        "cloudfrontAccessIdentityPath",
        format!("origin-access-identity/cloudfront/{name}"),
    );
    put("qualifiedArn", format!("arn:fake:{kind}:{name}:1"));
    put("domainName", format!("{name}.cloudfront.example"));
    ResourceState {
        name: name.clone(),
        kind,
        outputs,
    }
}

impl CloudProvider for FakeProvider {
    async fn ensure(&self, desired: &DesiredResource) -> Result<Materialized, ProvisionError> {
        self.calls.lock().unwrap().push(desired.name.to_string());
        let action = self.decide(desired);
        self.records
            .lock()
            .unwrap()
            .insert(desired.name.to_string(), desired.config.clone());
        Ok(Materialized {
            state: fake_state(&desired.name, desired.kind),
            action,
        })
    }

    async fn preview(&self, desired: &DesiredResource) -> Result<Materialized, ProvisionError> {
        Ok(Materialized {
            state: fake_state(&desired.name, desired.kind),
            action: self.decide(desired),
        })
    }

    async fn delete(&self, name: &LogicalName) -> Result<bool, ProvisionError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete:{name}"));
        Ok(self.records.lock().unwrap().remove(name.as_str()).is_some())
    }

    async fn list(&self) -> Result<Vec<LogicalName>, ProvisionError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .keys()
            .map(|name| LogicalName::new(name.as_str()))
            .collect())
    }
}
