//! Access to the Spinnaker Gate API
//!
//! Floodgate talks to Gate through the [`GateClient`] trait:
//! - **HttpGateClient**: Real HTTP client built from the Floodgate config
//! - **MockGateClient**: In-memory Gate for unit tests
//!
//! Clients report HTTP statuses as-is. Deciding which statuses are failures
//! is left to the resource kinds.

mod http;
mod mock;

pub use http::HttpGateClient;
pub use mock::{MockGateClient, OperationCounts};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Response to a fetch request
#[derive(Debug, Clone, PartialEq)]
pub struct GateResponse {
    /// HTTP status code
    pub status: u16,

    /// Decoded body for successful responses
    pub payload: Option<Value>,
}

impl GateResponse {
    /// A 200 response carrying a payload
    pub fn ok(payload: Value) -> Self {
        Self {
            status: 200,
            payload: Some(payload),
        }
    }

    /// A bodyless response with the given status
    pub fn status(status: u16) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Whether an HTTP status counts as success
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Typed Gate operations used by the resource kinds
///
/// Implementations must be Send + Sync so resources can hold `&dyn GateClient`
/// across await points.
#[async_trait]
pub trait GateClient: Send + Sync {
    /// Fetch an application by name
    async fn get_application(&self, name: &str) -> Result<GateResponse>;

    /// Create or update an application
    async fn save_application(&self, name: &str, application: &Value) -> Result<u16>;

    /// Fetch a pipeline config by owning application and pipeline name
    async fn get_pipeline_config(&self, application: &str, name: &str) -> Result<GateResponse>;

    /// Create or update a pipeline
    async fn save_pipeline(&self, pipeline: &Value) -> Result<u16>;

    /// Fetch a pipeline template by id
    async fn get_pipeline_template(&self, id: &str) -> Result<GateResponse>;

    /// Create a new pipeline template
    async fn create_pipeline_template(&self, template: &Value) -> Result<u16>;

    /// Replace an existing pipeline template
    async fn update_pipeline_template(&self, id: &str, template: &Value) -> Result<u16>;
}
