//! Mock Gate client for testing
//!
//! This client keeps resources in memory, useful for unit tests
//! without requiring a Spinnaker installation. Saves are applied to the
//! store, so a refetch after a save observes the new state.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use floodgate_core::ResourceKind;

use super::{GateClient, GateResponse};
use crate::error::Result;

/// In-memory Gate for testing
#[derive(Clone, Default)]
pub struct MockGateClient {
    /// Stored resources
    store: Arc<RwLock<MockStore>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

#[derive(Default)]
struct MockStore {
    /// name -> application
    applications: HashMap<String, Value>,
    /// (application, name) -> pipeline
    pipelines: HashMap<(String, String), Value>,
    /// id -> pipeline template
    pipeline_templates: HashMap<String, Value>,
    /// Statuses to answer fetches with, keyed by kind and identity
    fetch_failures: HashMap<(ResourceKind, String), u16>,
    /// Statuses to answer saves with, keyed by kind and identity
    save_failures: HashMap<(ResourceKind, String), u16>,
    /// Every accepted save, in order
    saved: Vec<(ResourceKind, Value)>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub saves: usize,
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Identity used for failure injection: application name, `application/name`
/// for pipelines, template id for pipeline templates
fn pipeline_identity(application: &str, name: &str) -> String {
    format!("{}/{}", application, name)
}

impl MockGateClient {
    /// Create an empty mock Gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an application (keyed by its `name`)
    pub fn with_application(self, application: Value) -> Self {
        {
            let mut store = self.store.write().unwrap();
            let name = str_field(&application, "name").to_string();
            store.applications.insert(name, application);
        }
        self
    }

    /// Pre-populate a pipeline (keyed by its `application` and `name`)
    pub fn with_pipeline(self, pipeline: Value) -> Self {
        {
            let mut store = self.store.write().unwrap();
            let key = (
                str_field(&pipeline, "application").to_string(),
                str_field(&pipeline, "name").to_string(),
            );
            store.pipelines.insert(key, pipeline);
        }
        self
    }

    /// Pre-populate a pipeline template (keyed by its `id`)
    pub fn with_pipeline_template(self, template: Value) -> Self {
        {
            let mut store = self.store.write().unwrap();
            let id = str_field(&template, "id").to_string();
            store.pipeline_templates.insert(id, template);
        }
        self
    }

    /// Answer fetches of the given resource with an error status
    pub fn fail_fetch(self, kind: ResourceKind, identity: &str, status: u16) -> Self {
        self.store
            .write()
            .unwrap()
            .fetch_failures
            .insert((kind, identity.to_string()), status);
        self
    }

    /// Answer saves of the given resource with an error status
    pub fn fail_save(self, kind: ResourceKind, identity: &str, status: u16) -> Self {
        self.store
            .write()
            .unwrap()
            .save_failures
            .insert((kind, identity.to_string()), status);
        self
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        let mut ops = self.operations.write().unwrap();
        *ops = OperationCounts::default();
    }

    /// Every accepted save, in order
    pub fn saved(&self) -> Vec<(ResourceKind, Value)> {
        self.store.read().unwrap().saved.clone()
    }

    /// Current remote copy of a pipeline
    pub fn pipeline(&self, application: &str, name: &str) -> Option<Value> {
        self.store
            .read()
            .unwrap()
            .pipelines
            .get(&(application.to_string(), name.to_string()))
            .cloned()
    }

    fn count_get(&self) {
        self.operations.write().unwrap().gets += 1;
    }

    fn count_save(&self) {
        self.operations.write().unwrap().saves += 1;
    }

    fn fetch(&self, kind: ResourceKind, identity: &str, found: Option<Value>) -> GateResponse {
        self.count_get();
        let store = self.store.read().unwrap();
        if let Some(status) = store.fetch_failures.get(&(kind, identity.to_string())) {
            return GateResponse::status(*status);
        }
        match found {
            Some(payload) => GateResponse::ok(payload),
            None => GateResponse::status(404),
        }
    }

    /// Check for an injected failure, otherwise record the save
    fn accept_save(&self, kind: ResourceKind, identity: &str, payload: &Value) -> Option<u16> {
        self.count_save();
        let mut store = self.store.write().unwrap();
        if let Some(status) = store.save_failures.get(&(kind, identity.to_string())) {
            return Some(*status);
        }
        store.saved.push((kind, payload.clone()));
        None
    }
}

#[async_trait]
impl GateClient for MockGateClient {
    async fn get_application(&self, name: &str) -> Result<GateResponse> {
        let found = self.store.read().unwrap().applications.get(name).cloned();
        Ok(self.fetch(ResourceKind::Application, name, found))
    }

    async fn save_application(&self, name: &str, application: &Value) -> Result<u16> {
        if let Some(status) = self.accept_save(ResourceKind::Application, name, application) {
            return Ok(status);
        }
        self.store
            .write()
            .unwrap()
            .applications
            .insert(name.to_string(), application.clone());
        Ok(200)
    }

    async fn get_pipeline_config(&self, application: &str, name: &str) -> Result<GateResponse> {
        let found = self
            .store
            .read()
            .unwrap()
            .pipelines
            .get(&(application.to_string(), name.to_string()))
            .cloned();
        Ok(self.fetch(
            ResourceKind::Pipeline,
            &pipeline_identity(application, name),
            found,
        ))
    }

    async fn save_pipeline(&self, pipeline: &Value) -> Result<u16> {
        let application = str_field(pipeline, "application");
        let name = str_field(pipeline, "name");
        if application.is_empty() || name.is_empty() {
            return Ok(400);
        }
        let identity = pipeline_identity(application, name);
        if let Some(status) = self.accept_save(ResourceKind::Pipeline, &identity, pipeline) {
            return Ok(status);
        }
        self.store
            .write()
            .unwrap()
            .pipelines
            .insert((application.to_string(), name.to_string()), pipeline.clone());
        Ok(200)
    }

    async fn get_pipeline_template(&self, id: &str) -> Result<GateResponse> {
        let found = self
            .store
            .read()
            .unwrap()
            .pipeline_templates
            .get(id)
            .cloned();
        Ok(self.fetch(ResourceKind::PipelineTemplate, id, found))
    }

    async fn create_pipeline_template(&self, template: &Value) -> Result<u16> {
        let id = str_field(template, "id").to_string();
        if self
            .store
            .read()
            .unwrap()
            .pipeline_templates
            .contains_key(&id)
        {
            return Ok(409);
        }
        if let Some(status) = self.accept_save(ResourceKind::PipelineTemplate, &id, template) {
            return Ok(status);
        }
        self.store
            .write()
            .unwrap()
            .pipeline_templates
            .insert(id, template.clone());
        Ok(200)
    }

    async fn update_pipeline_template(&self, id: &str, template: &Value) -> Result<u16> {
        if !self
            .store
            .read()
            .unwrap()
            .pipeline_templates
            .contains_key(id)
        {
            return Ok(404);
        }
        if let Some(status) = self.accept_save(ResourceKind::PipelineTemplate, id, template) {
            return Ok(status);
        }
        self.store
            .write()
            .unwrap()
            .pipeline_templates
            .insert(id.to_string(), template.clone());
        Ok(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_missing_is_404() {
        let gate = MockGateClient::new();
        let response = gate.get_application("shop").await.unwrap();
        assert!(response.is_not_found());
        assert_eq!(gate.operation_counts().gets, 1);
    }

    #[tokio::test]
    async fn test_save_then_fetch() {
        let gate = MockGateClient::new();
        let pipeline = json!({"name": "deploy", "application": "shop", "id": "1"});

        assert_eq!(gate.save_pipeline(&pipeline).await.unwrap(), 200);
        let response = gate.get_pipeline_config("shop", "deploy").await.unwrap();
        assert_eq!(response.payload, Some(pipeline));
        assert_eq!(
            gate.operation_counts(),
            OperationCounts { gets: 1, saves: 1 }
        );
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let gate = MockGateClient::new()
            .with_pipeline(json!({"name": "deploy", "application": "shop"}))
            .fail_fetch(ResourceKind::Pipeline, "shop/deploy", 503)
            .fail_save(ResourceKind::Pipeline, "shop/deploy", 500);

        let response = gate.get_pipeline_config("shop", "deploy").await.unwrap();
        assert_eq!(response.status, 503);

        let status = gate
            .save_pipeline(&json!({"name": "deploy", "application": "shop"}))
            .await
            .unwrap();
        assert_eq!(status, 500);
        assert!(gate.saved().is_empty());
    }

    #[tokio::test]
    async fn test_template_create_conflicts_when_present() {
        let gate = MockGateClient::new().with_pipeline_template(json!({"id": "tpl"}));
        assert_eq!(
            gate.create_pipeline_template(&json!({"id": "tpl"}))
                .await
                .unwrap(),
            409
        );
        assert_eq!(
            gate.update_pipeline_template("tpl", &json!({"id": "tpl"}))
                .await
                .unwrap(),
            200
        );
    }

    #[test]
    fn test_clones_share_state() {
        let gate = MockGateClient::new();
        let other = gate.clone();
        gate.count_get();
        assert_eq!(other.operation_counts().gets, 1);
        other.reset_counts();
        assert_eq!(gate.operation_counts(), OperationCounts::default());
    }
}
