//! Spinnaker resources and their local/remote state
//!
//! Every kind embeds a [`Resource`] holding two canonical JSON documents:
//! the local definition and the last snapshot fetched from Gate. Canonical
//! means compact JSON with object keys sorted, so two documents describe the
//! same resource exactly when their bytes are equal.

mod application;
mod pipeline;
mod pipeline_template;

pub use application::Application;
pub use pipeline::Pipeline;
pub use pipeline_template::PipelineTemplate;

use async_trait::async_trait;
use serde_json::Value;

use floodgate_core::{Definition, ResourceKind};

use crate::diff::DiffEngine;
use crate::error::{Result, SyncError};
use crate::gate::{GateClient, GateResponse, is_success};

/// Local and remote state of a single resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    /// Canonical local definition
    local_state: Vec<u8>,
    /// Canonical remote snapshot; empty when the resource does not exist remotely
    remote_state: Option<Vec<u8>>,
}

impl Resource {
    /// Serialize a definition into local state
    pub fn new(definition: &Definition) -> Result<Self> {
        let local_state = canonical_bytes(&Value::Object(definition.clone()))?;
        Ok(Self {
            local_state,
            remote_state: None,
        })
    }

    pub fn local_state(&self) -> &[u8] {
        &self.local_state
    }

    /// Last fetched snapshot, `None` before the first fetch
    pub fn remote_state(&self) -> Option<&[u8]> {
        self.remote_state.as_deref()
    }

    /// Record a fetched snapshot; `None` or `null` means absent remotely
    pub fn set_remote_state(&mut self, payload: Option<&Value>) -> Result<()> {
        self.remote_state = Some(match payload {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => canonical_bytes(value)?,
        });
        Ok(())
    }

    /// Whether a fetch ran and found the resource on Gate
    pub fn exists_remotely(&self) -> bool {
        self.remote_state.as_ref().is_some_and(|state| !state.is_empty())
    }

    /// Local state decoded for submission to Gate
    pub fn local_value(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.local_state)?)
    }
}

/// Common operations of every resource kind
#[async_trait]
pub trait Resourcer: Send + Sync {
    /// Validate a definition and serialize it into local state
    fn new(definition: &Definition) -> Result<Self>
    where
        Self: Sized;

    /// Kind tag
    fn kind(&self) -> ResourceKind;

    /// Resource name
    fn name(&self) -> &str;

    /// Remote id, for kinds that have one
    fn id(&self) -> Option<&str> {
        None
    }

    /// Name used in reports and errors
    fn display_name(&self) -> String {
        self.name().to_string()
    }

    /// Embedded state holder
    fn resource(&self) -> &Resource;

    /// Fetch the current remote representation and store it
    async fn load_remote_state(&mut self, client: &dyn GateClient) -> Result<()>;

    /// Push the local definition to Gate as a create-or-update
    async fn save_local_state(&self, client: &dyn GateClient) -> Result<()>;

    fn local_state(&self) -> &[u8] {
        self.resource().local_state()
    }

    /// Last fetched remote snapshot, empty if never fetched
    fn remote_state(&self) -> &[u8] {
        self.resource().remote_state().unwrap_or_default()
    }

    /// Whether local and remote state differ
    fn is_changed(&self) -> Result<bool> {
        let remote = self.resource().remote_state().ok_or_else(|| self.state_missing())?;
        Ok(self.local_state() != remote)
    }

    /// Line diff from the remote snapshot to the local definition
    fn full_diff(&self) -> Result<String> {
        let remote = self.resource().remote_state().ok_or_else(|| self.state_missing())?;
        let diff = DiffEngine::new().diff_states(remote, self.local_state())?;
        Ok(diff.to_unified_diff())
    }

    fn state_missing(&self) -> SyncError {
        SyncError::StateMissing {
            kind: self.kind(),
            resource: self.display_name(),
        }
    }
}

/// Build a resource and, given a client, fetch its remote state
pub async fn init<R: Resourcer>(
    client: Option<&dyn GateClient>,
    definition: &Definition,
) -> Result<R> {
    let mut resource = R::new(definition)?;
    if let Some(client) = client {
        resource.load_remote_state(client).await?;
    }
    Ok(resource)
}

/// Serialize a value as canonical JSON
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&canonicalize(value))?)
}

/// Rebuild a value with every object's keys in sorted order
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// ========== Validation ==========

/// Require `key` to be a string, returning it
pub(crate) fn require_string<'a>(
    kind: ResourceKind,
    definition: &'a Definition,
    key: &str,
    field: &str,
) -> Result<&'a str> {
    match definition.get(key) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(invalid(kind, field, "must be a string")),
        None => Err(invalid(kind, field, "is required")),
    }
}

/// Require `key` to be an object, returning it
pub(crate) fn require_object<'a>(
    kind: ResourceKind,
    definition: &'a Definition,
    key: &str,
    field: &str,
) -> Result<&'a Definition> {
    optional_object(kind, definition, key, field)?.ok_or_else(|| invalid(kind, field, "is required"))
}

/// Accept a missing `key`, but require an object when present
pub(crate) fn optional_object<'a>(
    kind: ResourceKind,
    definition: &'a Definition,
    key: &str,
    field: &str,
) -> Result<Option<&'a Definition>> {
    match definition.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(invalid(kind, field, "must be an object")),
        None => Ok(None),
    }
}

fn invalid(kind: ResourceKind, field: &str, reason: &str) -> SyncError {
    SyncError::Validation {
        kind,
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// ========== Gate responses ==========

/// Turn a fetch result into a payload; 404 means absent remotely
pub(crate) fn fetched_payload(
    kind: ResourceKind,
    resource: &str,
    response: Result<GateResponse>,
) -> Result<Option<Value>> {
    let response = response.map_err(|e| SyncError::RemoteFetch {
        kind,
        resource: resource.to_string(),
        status: None,
        message: e.to_string(),
    })?;

    if response.is_not_found() {
        return Ok(None);
    }
    if !response.is_success() {
        return Err(SyncError::RemoteFetch {
            kind,
            resource: resource.to_string(),
            status: Some(response.status),
            message: format!("status code: {}", response.status),
        });
    }
    Ok(response.payload)
}

/// Check the status returned by a save
pub(crate) fn check_saved(kind: ResourceKind, resource: &str, status: Result<u16>) -> Result<()> {
    let status = status.map_err(|e| SyncError::RemoteSave {
        kind,
        resource: resource.to_string(),
        status: None,
        message: e.to_string(),
    })?;

    if !is_success(status) {
        return Err(SyncError::RemoteSave {
            kind,
            resource: resource.to_string(),
            status: Some(status),
            message: format!("status code: {}", status),
        });
    }
    Ok(())
}
