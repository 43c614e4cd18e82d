//! Floodgate configuration
//!
//! Stored by default in `~/.config/floodgate/config.yaml`:
//!
//! ```yaml
//! endpoint: https://gate.example.com
//! insecure: false
//! timeout: 30s
//! auth:
//!   basic:
//!     user: admin
//!     password: secret
//! resources:
//!   - ./resources
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV_VAR: &str = "FLOODGATE_CONFIG";

/// Floodgate configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gate API endpoint
    pub endpoint: String,

    /// Skip TLS verification (insecure, not recommended)
    #[serde(default)]
    pub insecure: bool,

    /// Timeout for a single Gate request
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Gate credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// Directories (or files) holding resource definitions
    #[serde(default)]
    pub resources: Vec<PathBuf>,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Gate authentication settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HTTP basic authentication
    #[serde(default)]
    pub basic: Option<BasicAuth>,

    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,
}

/// HTTP basic credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Create a configuration for an endpoint with no resources
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            insecure: false,
            timeout: default_timeout(),
            auth: AuthConfig::default(),
            resources: Vec::new(),
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load configuration from a specific path
    ///
    /// Relative resource paths are resolved against the directory holding
    /// the config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Self =
            serde_yaml::from_str(&content).map_err(|source| CoreError::YamlParse {
                path: path.display().to_string(),
                source,
            })?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;

        Ok(config)
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("floodgate").join("config.yaml"))
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint).map_err(|e| CoreError::InvalidConfig {
            message: format!("endpoint '{}' is not a valid URL: {}", self.endpoint, e),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::InvalidConfig {
                message: format!("endpoint '{}' must use http or https", self.endpoint),
            });
        }

        if self.auth.basic.is_some() && self.auth.token.is_some() {
            return Err(CoreError::InvalidConfig {
                message: "auth.basic and auth.token are mutually exclusive".to_string(),
            });
        }

        if self.resources.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "at least one resources path is required".to_string(),
            });
        }

        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in &mut self.resources {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
