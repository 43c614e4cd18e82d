//! HTTP implementation of the Gate client

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde_json::{Value, json};
use url::Url;

use floodgate_core::{AuthConfig, Config};

use super::{GateClient, GateResponse};
use crate::error::{Result, SyncError};

/// Gate client over HTTP(S)
pub struct HttpGateClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    /// Gate base URL
    base: Url,
    /// Credentials attached to every request
    auth: AuthConfig,
}

impl HttpGateClient {
    /// Build a client from the Floodgate configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let base = Url::parse(&config.endpoint)?;
        if base.cannot_be_a_base() {
            return Err(SyncError::Transport(format!(
                "Gate endpoint '{}' cannot be used as a base URL",
                config.endpoint
            )));
        }

        Ok(Self {
            client,
            base,
            auth: config.auth.clone(),
        })
    }

    /// Get the Gate base URL
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL, percent-encoding every segment
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.auth.basic, &self.auth.token) {
            (Some(basic), _) => request.basic_auth(&basic.user, Some(&basic.password)),
            (None, Some(token)) => request.bearer_auth(token),
            (None, None) => request,
        }
    }

    async fn get_json(&self, url: Url) -> Result<GateResponse> {
        tracing::debug!("GET {}", url);
        let response = self.authorize(self.client.get(url)).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Ok(GateResponse::status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let payload = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_slice::<Value>(&body)?)
        };

        Ok(GateResponse {
            status: status.as_u16(),
            payload,
        })
    }

    async fn post_json(&self, url: Url, body: &Value) -> Result<u16> {
        tracing::debug!("POST {}", url);
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl GateClient for HttpGateClient {
    async fn get_application(&self, name: &str) -> Result<GateResponse> {
        self.get_json(self.url(&["applications", name])).await
    }

    async fn save_application(&self, name: &str, application: &Value) -> Result<u16> {
        // Applications are written through an orchestration task
        let task = json!({
            "application": name,
            "description": format!("Create or update application: {}", name),
            "job": [{
                "type": "createApplication",
                "application": application,
            }],
        });
        self.post_json(self.url(&["applications", name, "tasks"]), &task)
            .await
    }

    async fn get_pipeline_config(&self, application: &str, name: &str) -> Result<GateResponse> {
        self.get_json(self.url(&["applications", application, "pipelineConfigs", name]))
            .await
    }

    async fn save_pipeline(&self, pipeline: &Value) -> Result<u16> {
        self.post_json(self.url(&["pipelines"]), pipeline).await
    }

    async fn get_pipeline_template(&self, id: &str) -> Result<GateResponse> {
        self.get_json(self.url(&["v2", "pipelineTemplates", id])).await
    }

    async fn create_pipeline_template(&self, template: &Value) -> Result<u16> {
        self.post_json(self.url(&["v2", "pipelineTemplates", "create"]), template)
            .await
    }

    async fn update_pipeline_template(&self, id: &str, template: &Value) -> Result<u16> {
        self.post_json(
            self.url(&["v2", "pipelineTemplates", "update", id]),
            template,
        )
        .await
    }
}
