//! Resource manager: load, compare and sync collections of resources
//!
//! A run goes through three steps:
//! 1. **Load**: every definition becomes a resource and fetches its remote
//!    state. The first failure aborts the load.
//! 2. **Compare**: [`ResourceManager::get_changes`] reports every resource whose
//!    local and remote state differ.
//! 3. **Sync**: [`ResourceManager::sync_resources`] pushes changed resources to
//!    Gate, one at a time, and refreshes their remote state.
//!
//! Kinds are always processed in the same order: applications, pipelines,
//! pipeline templates. Within a kind, resources keep their scan order.

use serde::{Deserialize, Serialize};
use std::path::Path;

use floodgate_core::{Config, Definition, DefinitionSet, ResourceKind};

use crate::error::{Result, SyncError};
use crate::gate::{GateClient, HttpGateClient};
use crate::reporter::{Phase, SyncReporter};
use crate::resource::{self, Application, Pipeline, PipelineTemplate, Resourcer};

/// Loaded resources, one insertion-ordered list per kind
#[derive(Debug, Clone, Default)]
pub struct SpinnakerResources {
    pub applications: Vec<Application>,
    pub pipelines: Vec<Pipeline>,
    pub pipeline_templates: Vec<PipelineTemplate>,
}

impl SpinnakerResources {
    /// All resources, kind by kind, in load order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Resourcer> {
        self.applications
            .iter()
            .map(|r| r as &dyn Resourcer)
            .chain(self.pipelines.iter().map(|r| r as &dyn Resourcer))
            .chain(self.pipeline_templates.iter().map(|r| r as &dyn Resourcer))
    }

    /// Resources of a single kind, in load order
    pub fn of_kind(&self, kind: ResourceKind) -> Vec<&dyn Resourcer> {
        match kind {
            ResourceKind::Application => self
                .applications
                .iter()
                .map(|r| r as &dyn Resourcer)
                .collect(),
            ResourceKind::Pipeline => self.pipelines.iter().map(|r| r as &dyn Resourcer).collect(),
            ResourceKind::PipelineTemplate => self
                .pipeline_templates
                .iter()
                .map(|r| r as &dyn Resourcer)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.applications.len() + self.pipelines.len() + self.pipeline_templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drift detected for one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Resource kind tag
    #[serde(rename = "type")]
    pub kind: ResourceKind,

    /// Remote id (empty for applications)
    pub id: String,

    /// Resource name
    pub name: String,

    /// Rendered diff from remote to local
    pub changes: String,
}

impl ResourceChange {
    fn from_resource(resource: &dyn Resourcer) -> Result<Self> {
        Ok(Self {
            kind: resource.kind(),
            id: resource.id().unwrap_or_default().to_string(),
            name: resource.name().to_string(),
            changes: resource.full_diff()?,
        })
    }

    /// Get a display name for the resource
    pub fn display_name(&self) -> String {
        if self.id.is_empty() {
            format!("{}/{}", self.kind, self.name)
        } else {
            format!("{}/{} ({})", self.kind, self.name, self.id)
        }
    }
}

/// Outcome of a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Resources saved to Gate
    pub succeeded: Vec<String>,
    /// Resources that failed, with the error
    pub failed: Vec<(String, String)>,
    /// Resources already in sync
    pub skipped: Vec<String>,
    /// Saved resources whose remote state could not be fetched again, with
    /// the error; they are also listed in `succeeded`
    pub refresh_failed: Vec<(String, String)>,
}

impl SyncSummary {
    /// Check if all operations succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Get total count
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    /// Format as human-readable summary
    pub fn summary(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if !self.succeeded.is_empty() {
            parts.push(format!("{} synced", self.succeeded.len()));
        }
        if !self.failed.is_empty() {
            parts.push(format!("{} failed", self.failed.len()));
        }
        if !self.skipped.is_empty() {
            parts.push(format!("{} up to date", self.skipped.len()));
        }
        if !self.refresh_failed.is_empty() {
            parts.push(format!("{} not refreshed", self.refresh_failed.len()));
        }
        if parts.is_empty() {
            "No resources processed".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Turn any failure into an error listing the failed resources
    pub fn into_result(self) -> Result<SyncSummary> {
        if self.is_success() {
            return Ok(self);
        }
        let details = self
            .failed
            .iter()
            .map(|(name, error)| format!("  {}: {}", name, error))
            .collect::<Vec<_>>()
            .join("\n");
        Err(SyncError::SyncIncomplete {
            failed: self.failed.len(),
            total: self.total(),
            details,
        })
    }
}

/// Owns every resource loaded in a run and drives comparison and sync
pub struct ResourceManager<C: GateClient> {
    /// Gate client
    client: C,
    /// Event observer
    reporter: Box<dyn SyncReporter>,
    /// Everything loaded this run
    resources: SpinnakerResources,
    /// Resources that differed from Gate at load time
    desynced_resources: SpinnakerResources,
}

impl ResourceManager<HttpGateClient> {
    /// Load config, scan definitions and fetch their remote state over HTTP
    pub async fn init(config_path: &Path, reporter: Box<dyn SyncReporter>) -> Result<Self> {
        let config = Config::load_from(config_path)?;
        let client = HttpGateClient::new(&config)?;
        let definitions = DefinitionSet::load(&config.resources)?;
        Self::load(client, &definitions, reporter).await
    }
}

impl<C: GateClient> ResourceManager<C> {
    /// Build every resource from its definition and fetch its remote state
    ///
    /// Fails fast: the first error is returned and nothing is kept.
    pub async fn load(
        client: C,
        definitions: &DefinitionSet,
        reporter: Box<dyn SyncReporter>,
    ) -> Result<Self> {
        let mut manager = Self {
            client,
            reporter,
            resources: SpinnakerResources::default(),
            desynced_resources: SpinnakerResources::default(),
        };

        let (all, desynced) = manager
            .load_kind::<Application>(ResourceKind::Application, &definitions.applications)
            .await?;
        manager.resources.applications = all;
        manager.desynced_resources.applications = desynced;

        let (all, desynced) = manager
            .load_kind::<Pipeline>(ResourceKind::Pipeline, &definitions.pipelines)
            .await?;
        manager.resources.pipelines = all;
        manager.desynced_resources.pipelines = desynced;

        let (all, desynced) = manager
            .load_kind::<PipelineTemplate>(
                ResourceKind::PipelineTemplate,
                &definitions.pipeline_templates,
            )
            .await?;
        manager.resources.pipeline_templates = all;
        manager.desynced_resources.pipeline_templates = desynced;

        Ok(manager)
    }

    async fn load_kind<R: Resourcer + Clone>(
        &self,
        kind: ResourceKind,
        definitions: &[Definition],
    ) -> Result<(Vec<R>, Vec<R>)> {
        self.reporter
            .kind_started(Phase::Load, kind, definitions.len());

        let client: &dyn GateClient = &self.client;
        let mut all = Vec::with_capacity(definitions.len());
        let mut desynced = Vec::new();

        for (index, definition) in definitions.iter().enumerate() {
            let loaded = async {
                let resource: R = resource::init(Some(client), definition).await?;
                let changed = resource.is_changed()?;
                Ok::<_, SyncError>((resource, changed))
            }
            .await;

            let (resource, changed) = match loaded {
                Ok(loaded) => loaded,
                Err(e) => {
                    self.reporter.resource_failed(
                        Phase::Load,
                        kind,
                        &definition_label(definition, index),
                        &e,
                    );
                    return Err(e);
                }
            };

            self.reporter
                .resource_loaded(kind, &resource.display_name(), changed);
            if changed {
                desynced.push(resource.clone());
            }
            all.push(resource);
        }

        Ok((all, desynced))
    }

    /// Every resource whose local state currently differs from Gate
    ///
    /// Change status is recomputed for each resource rather than taken from
    /// the load-time snapshot.
    pub fn get_changes(&self) -> Result<Vec<ResourceChange>> {
        let mut changes = Vec::new();
        for resource in self.resources.iter() {
            if resource.is_changed()? {
                changes.push(ResourceChange::from_resource(resource)?);
            }
        }
        Ok(changes)
    }

    /// Push every changed resource to Gate
    ///
    /// Resources are handled independently: a failure is recorded in the
    /// summary and the run moves on to the next resource. Unchanged resources
    /// are never sent. After a successful save the remote state is fetched
    /// again, so a second sync in the same run sends nothing. A failed refetch
    /// does not undo the save: the resource counts as synced and the error is
    /// kept in `refresh_failed`.
    pub async fn sync_resources(&mut self) -> SyncSummary {
        let mut summary = SyncSummary::default();
        let client: &dyn GateClient = &self.client;
        let reporter = self.reporter.as_ref();

        sync_kind(
            client,
            reporter,
            ResourceKind::Application,
            &mut self.resources.applications,
            &mut summary,
        )
        .await;
        sync_kind(
            client,
            reporter,
            ResourceKind::Pipeline,
            &mut self.resources.pipelines,
            &mut summary,
        )
        .await;
        sync_kind(
            client,
            reporter,
            ResourceKind::PipelineTemplate,
            &mut self.resources.pipeline_templates,
            &mut summary,
        )
        .await;

        summary
    }

    /// Concatenated remote state of every application, in load order
    pub fn applications_remote_state(&self) -> String {
        self.remote_state_of(ResourceKind::Application)
    }

    /// Concatenated remote state of every pipeline, in load order
    pub fn pipelines_remote_state(&self) -> String {
        self.remote_state_of(ResourceKind::Pipeline)
    }

    /// Concatenated remote state of every pipeline template, in load order
    pub fn pipeline_templates_remote_state(&self) -> String {
        self.remote_state_of(ResourceKind::PipelineTemplate)
    }

    /// Concatenated remote state of one kind, no separator
    pub fn remote_state_of(&self, kind: ResourceKind) -> String {
        self.resources
            .of_kind(kind)
            .into_iter()
            .map(|resource| String::from_utf8_lossy(resource.remote_state()).into_owned())
            .collect()
    }

    /// Everything loaded this run
    pub fn resources(&self) -> &SpinnakerResources {
        &self.resources
    }

    /// Resources that differed from Gate when they were loaded
    pub fn desynced_resources(&self) -> &SpinnakerResources {
        &self.desynced_resources
    }

    /// Get the Gate client
    pub fn client(&self) -> &C {
        &self.client
    }
}

async fn sync_kind<R: Resourcer>(
    client: &dyn GateClient,
    reporter: &dyn SyncReporter,
    kind: ResourceKind,
    resources: &mut [R],
    summary: &mut SyncSummary,
) {
    reporter.kind_started(Phase::Sync, kind, resources.len());

    for resource in resources.iter_mut() {
        let label = format!("{} {}", kind, resource.display_name());
        match sync_resource(client, resource).await {
            Ok(Outcome::Synced) => {
                reporter.resource_synced(kind, &resource.display_name());
                summary.succeeded.push(label);
            }
            Ok(Outcome::SyncedStale(e)) => {
                reporter.resource_synced(kind, &resource.display_name());
                reporter.resource_refresh_failed(kind, &resource.display_name(), &e);
                summary.succeeded.push(label.clone());
                summary.refresh_failed.push((label, e.to_string()));
            }
            Ok(Outcome::Skipped) => {
                reporter.resource_skipped(kind, &resource.display_name());
                summary.skipped.push(label);
            }
            Err(e) => {
                reporter.resource_failed(Phase::Sync, kind, &resource.display_name(), &e);
                summary.failed.push((label, e.to_string()));
            }
        }
    }
}

/// What happened to one resource during sync
enum Outcome {
    /// Already in sync, nothing sent
    Skipped,
    /// Saved and refetched
    Synced,
    /// Saved, but the refetch failed; the old snapshot is kept
    SyncedStale(SyncError),
}

/// Save a resource if it changed, then refresh its remote state
async fn sync_resource<R: Resourcer>(client: &dyn GateClient, resource: &mut R) -> Result<Outcome> {
    if !resource.is_changed()? {
        return Ok(Outcome::Skipped);
    }
    resource.save_local_state(client).await?;
    match resource.load_remote_state(client).await {
        Ok(()) => Ok(Outcome::Synced),
        Err(e) => Ok(Outcome::SyncedStale(e)),
    }
}

/// Name a definition for error reports, even when validation failed
///
/// Pipelines with a string `application` get the same `application/name`
/// form used once they are loaded.
fn definition_label(definition: &Definition, index: usize) -> String {
    let label = ["name", "id"]
        .iter()
        .find_map(|key| definition.get(*key).and_then(|v| v.as_str()));

    match (label, definition.get("application").and_then(|v| v.as_str())) {
        (Some(name), Some(application)) => format!("{}/{}", application, name),
        (Some(name), None) => name.to_string(),
        (None, _) => format!("#{}", index + 1),
    }
}
