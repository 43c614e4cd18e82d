//! Application resource

use async_trait::async_trait;
use serde_json::Value;

use floodgate_core::{Definition, ResourceKind};

use super::{Resource, Resourcer, check_saved, fetched_payload, require_string};
use crate::error::Result;
use crate::gate::GateClient;

const KIND: ResourceKind = ResourceKind::Application;

/// A Spinnaker application, identified by name
#[derive(Debug, Clone)]
pub struct Application {
    resource: Resource,
    name: String,
}

#[async_trait]
impl Resourcer for Application {
    fn new(definition: &Definition) -> Result<Self> {
        let name = require_string(KIND, definition, "name", "name")?.to_string();
        Ok(Self {
            resource: Resource::new(definition)?,
            name,
        })
    }

    fn kind(&self) -> ResourceKind {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    async fn load_remote_state(&mut self, client: &dyn GateClient) -> Result<()> {
        let response = client.get_application(&self.name).await;
        let payload = fetched_payload(KIND, &self.name, response)?;

        // Gate wraps the stored definition in `attributes`
        let attributes = match payload {
            Some(Value::Object(mut app)) if app.get("attributes").is_some_and(Value::is_object) => {
                app.remove("attributes")
            }
            other => other,
        };
        self.resource.set_remote_state(attributes.as_ref())
    }

    async fn save_local_state(&self, client: &dyn GateClient) -> Result<()> {
        let payload = self.resource.local_value()?;
        let status = client.save_application(&self.name, &payload).await;
        check_saved(KIND, &self.name, status)
    }
}
