//! Resource definitions loaded from disk
//!
//! Definitions are plain JSON or YAML documents. A file holds either a single
//! object or an array of objects. Each object is sorted into one of the three
//! resource kinds by its shape:
//!
//! - `schema` + `metadata` keys: pipeline template
//! - `application` key: pipeline (its type is checked when the pipeline is built)
//! - `name` key: application

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// A raw resource definition, field name to value
pub type Definition = serde_json::Map<String, Value>;

/// Kind of Spinnaker resource managed by Floodgate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Application,
    Pipeline,
    PipelineTemplate,
}

impl ResourceKind {
    /// All kinds, in the order they are loaded and synced
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Application,
        ResourceKind::Pipeline,
        ResourceKind::PipelineTemplate,
    ];

    /// Tag used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Application => "application",
            ResourceKind::Pipeline => "pipeline",
            ResourceKind::PipelineTemplate => "pipelinetemplate",
        }
    }

    /// Human-readable plural, for log lines
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Application => "applications",
            ResourceKind::Pipeline => "pipelines",
            ResourceKind::PipelineTemplate => "pipeline templates",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide which kind a definition describes
pub fn classify(definition: &Definition) -> Option<ResourceKind> {
    if definition.contains_key("schema") && definition.contains_key("metadata") {
        Some(ResourceKind::PipelineTemplate)
    } else if definition.contains_key("application") {
        Some(ResourceKind::Pipeline)
    } else if definition.contains_key("name") {
        Some(ResourceKind::Application)
    } else {
        None
    }
}

/// Definitions grouped by kind, in scan order
#[derive(Debug, Clone, Default)]
pub struct DefinitionSet {
    pub applications: Vec<Definition>,
    pub pipelines: Vec<Definition>,
    pub pipeline_templates: Vec<Definition>,
}

impl DefinitionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every path and collect the definitions found
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let mut set = Self::new();
        for path in paths {
            set.load_path(path)?;
        }
        Ok(set)
    }

    /// Scan a directory (recursively) or a single file
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(CoreError::ResourcePathNotFound {
                path: path.display().to_string(),
            });
        }

        for file in definition_files(path) {
            self.load_file(&file)?;
        }
        Ok(())
    }

    /// Parse one file and sort its objects by kind
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let display = path.display().to_string();

        let value: Value = if is_json(path) {
            serde_json::from_str(&content).map_err(|source| CoreError::JsonParse {
                path: display.clone(),
                source,
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|source| CoreError::YamlParse {
                path: display.clone(),
                source,
            })?
        };

        let objects = match value {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };

        for object in objects {
            let Value::Object(definition) = object else {
                return Err(CoreError::InvalidDefinition {
                    path: display,
                    message: "expected an object or an array of objects".to_string(),
                });
            };
            if self.push(definition).is_none() {
                return Err(CoreError::InvalidDefinition {
                    path: display,
                    message: "cannot tell whether this is an application, pipeline or pipeline template".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Add a definition to the matching kind, returning that kind
    pub fn push(&mut self, definition: Definition) -> Option<ResourceKind> {
        let kind = classify(&definition)?;
        self.of_kind_mut(kind).push(definition);
        Some(kind)
    }

    /// Definitions of a single kind
    pub fn of_kind(&self, kind: ResourceKind) -> &[Definition] {
        match kind {
            ResourceKind::Application => &self.applications,
            ResourceKind::Pipeline => &self.pipelines,
            ResourceKind::PipelineTemplate => &self.pipeline_templates,
        }
    }

    fn of_kind_mut(&mut self, kind: ResourceKind) -> &mut Vec<Definition> {
        match kind {
            ResourceKind::Application => &mut self.applications,
            ResourceKind::Pipeline => &mut self.pipelines,
            ResourceKind::PipelineTemplate => &mut self.pipeline_templates,
        }
    }

    /// Total number of definitions
    pub fn len(&self) -> usize {
        self.applications.len() + self.pipelines.len() + self.pipeline_templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// List JSON/YAML files under a path, sorted for deterministic scan order
fn definition_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| matches!(ext.as_str(), "json" | "yaml" | "yml"))
        })
        .collect();

    files.sort();
    files
}
