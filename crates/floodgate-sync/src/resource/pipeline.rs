//! Pipeline resource

use async_trait::async_trait;

use floodgate_core::{Definition, ResourceKind};

use super::{
    Resource, Resourcer, check_saved, fetched_payload, optional_object, require_string,
};
use crate::error::Result;
use crate::gate::GateClient;

const KIND: ResourceKind = ResourceKind::Pipeline;

/// A pipeline, identified on Gate by owning application and name
#[derive(Debug, Clone)]
pub struct Pipeline {
    resource: Resource,
    name: String,
    application: String,
    id: String,
}

impl Pipeline {
    /// Owning application
    pub fn application(&self) -> &str {
        &self.application
    }

    /// Check identity fields, returning name, application and id
    fn validate(definition: &Definition) -> Result<(&str, &str, &str)> {
        let name = require_string(KIND, definition, "name", "name")?;
        let application = require_string(KIND, definition, "application", "application")?;
        let id = require_string(KIND, definition, "id", "id")?;

        // A template reference is optional, but must name its schema
        if let Some(template) = optional_object(KIND, definition, "template", "template")? {
            require_string(KIND, template, "schema", "template.schema")?;
        }
        Ok((name, application, id))
    }
}

#[async_trait]
impl Resourcer for Pipeline {
    fn new(definition: &Definition) -> Result<Self> {
        let (name, application, id) = Self::validate(definition)?;
        Ok(Self {
            resource: Resource::new(definition)?,
            name: name.to_string(),
            application: application.to_string(),
            id: id.to_string(),
        })
    }

    fn kind(&self) -> ResourceKind {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn display_name(&self) -> String {
        format!("{}/{}", self.application, self.name)
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    async fn load_remote_state(&mut self, client: &dyn GateClient) -> Result<()> {
        let response = client
            .get_pipeline_config(&self.application, &self.name)
            .await;
        let payload = fetched_payload(KIND, &self.display_name(), response)?;
        self.resource.set_remote_state(payload.as_ref())
    }

    async fn save_local_state(&self, client: &dyn GateClient) -> Result<()> {
        let payload = self.resource.local_value()?;
        let status = client.save_pipeline(&payload).await;
        check_saved(KIND, &self.display_name(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::gate::MockGateClient;
    use crate::resource::init;
    use serde_json::{Value, json};

    fn definition(value: Value) -> Definition {
        value.as_object().cloned().unwrap()
    }

    fn deploy_staging() -> Definition {
        definition(json!({"name": "deploy-staging", "application": "shop", "id": "abc123"}))
    }

    #[test]
    fn test_new_reads_identity() {
        let pipeline = Pipeline::new(&deploy_staging()).unwrap();
        assert_eq!(pipeline.name(), "deploy-staging");
        assert_eq!(pipeline.application(), "shop");
        assert_eq!(pipeline.id(), Some("abc123"));
        assert_eq!(pipeline.display_name(), "shop/deploy-staging");
        assert!(pipeline.remote_state().is_empty());
    }

    #[test]
    fn test_missing_identity_fields() {
        for field in ["name", "application", "id"] {
            let mut def = deploy_staging();
            def.remove(field);
            let err = Pipeline::new(&def).unwrap_err();
            assert!(
                matches!(err, SyncError::Validation { field: ref f, .. } if f == field),
                "expected validation error for {}",
                field
            );
        }
    }

    #[test]
    fn test_identity_fields_must_be_strings() {
        for field in ["name", "application", "id"] {
            let mut def = deploy_staging();
            def.insert(field.to_string(), json!(7));
            let err = Pipeline::new(&def).unwrap_err();
            assert!(
                matches!(err, SyncError::Validation { field: ref f, ref reason, .. } if f == field && reason == "must be a string"),
                "expected type error for {}",
                field
            );
        }
    }

    #[test]
    fn test_non_string_identity() {
        let mut def = deploy_staging();
        def.insert("id".to_string(), json!(42));
        assert!(Pipeline::new(&def).unwrap_err().is_validation());
    }

    #[test]
    fn test_template_reference() {
        let mut def = deploy_staging();
        def.insert("template".to_string(), json!({"source": "spinnaker://tpl"}));
        let err = Pipeline::new(&def).unwrap_err();
        assert!(matches!(err, SyncError::Validation { ref field, .. } if field == "template.schema"));

        def.insert("template".to_string(), json!({"schema": 1}));
        assert!(Pipeline::new(&def).unwrap_err().is_validation());

        def.insert("template".to_string(), json!("v2"));
        assert!(Pipeline::new(&def).unwrap_err().is_validation());

        def.insert("template".to_string(), json!({"schema": "v2"}));
        assert!(Pipeline::new(&def).is_ok());
    }

    #[tokio::test]
    async fn test_extra_remote_field_is_drift() {
        let gate = MockGateClient::new().with_pipeline(json!({
            "name": "deploy-staging",
            "application": "shop",
            "id": "abc123",
            "stages": []
        }));

        let pipeline: Pipeline = init(Some(&gate), &deploy_staging()).await.unwrap();
        assert!(pipeline.is_changed().unwrap());
        assert!(pipeline.full_diff().unwrap().contains("stages"));
    }

    #[tokio::test]
    async fn test_key_order_is_not_drift() {
        let gate = MockGateClient::new().with_pipeline(json!({
            "id": "abc123",
            "application": "shop",
            "name": "deploy-staging"
        }));

        let pipeline: Pipeline = init(Some(&gate), &deploy_staging()).await.unwrap();
        assert!(!pipeline.is_changed().unwrap());
        assert_eq!(pipeline.remote_state(), pipeline.local_state());
    }

    #[tokio::test]
    async fn test_located_by_application_and_name() {
        let gate = MockGateClient::new().with_pipeline(json!({
            "name": "deploy-staging",
            "application": "shop",
            "id": "other-id"
        }));

        let pipeline: Pipeline = init(Some(&gate), &deploy_staging()).await.unwrap();
        assert!(pipeline.is_changed().unwrap());
        let diff = pipeline.full_diff().unwrap();
        assert!(diff.contains("-  \"id\": \"other-id\""));
        assert!(diff.contains("+  \"id\": \"abc123\""));
    }

    #[tokio::test]
    async fn test_fetch_failure() {
        let gate =
            MockGateClient::new().fail_fetch(ResourceKind::Pipeline, "shop/deploy-staging", 500);

        let err = init::<Pipeline>(Some(&gate), &deploy_staging())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::RemoteFetch { ref resource, status: Some(500), .. } if resource == "shop/deploy-staging"
        ));
    }

    #[tokio::test]
    async fn test_not_found_remotely() {
        let gate = MockGateClient::new();
        let pipeline: Pipeline = init(Some(&gate), &deploy_staging()).await.unwrap();
        assert!(pipeline.is_changed().unwrap());
        assert!(!pipeline.resource().exists_remotely());
    }

    #[test]
    fn test_change_detection_requires_remote_state() {
        let pipeline = Pipeline::new(&deploy_staging()).unwrap();
        assert!(matches!(
            pipeline.is_changed(),
            Err(SyncError::StateMissing { .. })
        ));
        assert!(pipeline.full_diff().is_err());
    }

    #[tokio::test]
    async fn test_save_submits_local_definition() {
        let gate = MockGateClient::new();
        let pipeline = Pipeline::new(&deploy_staging()).unwrap();

        pipeline.save_local_state(&gate).await.unwrap();
        assert_eq!(
            gate.pipeline("shop", "deploy-staging"),
            Some(json!({"name": "deploy-staging", "application": "shop", "id": "abc123"}))
        );
    }

    #[tokio::test]
    async fn test_save_failure() {
        let gate =
            MockGateClient::new().fail_save(ResourceKind::Pipeline, "shop/deploy-staging", 400);
        let pipeline = Pipeline::new(&deploy_staging()).unwrap();

        let err = pipeline.save_local_state(&gate).await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteSave { status: Some(400), .. }));
    }
}
