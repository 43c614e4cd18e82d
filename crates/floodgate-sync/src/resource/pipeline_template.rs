//! Pipeline template resource (Spinnaker managed pipeline templates, v2)

use async_trait::async_trait;

use floodgate_core::{Definition, ResourceKind};

use super::{Resource, Resourcer, check_saved, fetched_payload, require_object, require_string};
use crate::error::Result;
use crate::gate::GateClient;

const KIND: ResourceKind = ResourceKind::PipelineTemplate;

/// A pipeline template, identified on Gate by id
#[derive(Debug, Clone)]
pub struct PipelineTemplate {
    resource: Resource,
    id: String,
    name: String,
}

#[async_trait]
impl Resourcer for PipelineTemplate {
    fn new(definition: &Definition) -> Result<Self> {
        let id = require_string(KIND, definition, "id", "id")?.to_string();
        let metadata = require_object(KIND, definition, "metadata", "metadata")?;
        let name = require_string(KIND, metadata, "name", "metadata.name")?.to_string();

        Ok(Self {
            resource: Resource::new(definition)?,
            id,
            name,
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
        self.id.clone()
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    async fn load_remote_state(&mut self, client: &dyn GateClient) -> Result<()> {
        let response = client.get_pipeline_template(&self.id).await;
        let payload = fetched_payload(KIND, &self.id, response)?;
        self.resource.set_remote_state(payload.as_ref())
    }

    async fn save_local_state(&self, client: &dyn GateClient) -> Result<()> {
        let payload = self.resource.local_value()?;
        let status = if self.resource.exists_remotely() {
            client.update_pipeline_template(&self.id, &payload).await
        } else {
            client.create_pipeline_template(&payload).await
        };
        check_saved(KIND, &self.id, status)
    }
}
