//! HTTP implementation of the agent service
//!
//! Agent versions live under `{endpoint}/agents`, conversations and responses
//! under the project's OpenAI-compatible `{endpoint}/openai` surface. Every
//! call carries the configured `api-version` and a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::auth::TokenCredential;
use crate::config::Config;
use crate::error::{AgentError, Result};

use super::client::AgentService;
use super::types::{AgentDefinition, AgentRegistration, Conversation, Response, ResponseRequest};

pub struct FoundryClient {
    client: Client,
    endpoint: String,
    api_version: String,
    token: String,
}

impl FoundryClient {
    /// Acquire a token and build a client for the configured project
    pub async fn connect(config: &Config, credential: &dyn TokenCredential) -> Result<Self> {
        let token = credential.get_token().await?;
        Self::with_token(&config.project_endpoint, &config.api_version, config.timeout(), token)
    }

    /// Create a client with an explicit bearer token
    pub fn with_token(endpoint: &str, api_version: &str, timeout: Duration, token: String) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.endpoint, path, self.api_version)
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::BAD_REQUEST {
            return Err(AgentError::BadRequest(error_message(&body)));
        }
        if !status.is_success() {
            return Err(AgentError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| AgentError::InvalidResponse(format!("{}: {}", e, body)))
    }
}

/// Pull `error.message` out of an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl AgentService for FoundryClient {
    async fn create_agent_version(&self, name: &str, definition: &AgentDefinition) -> Result<AgentRegistration> {
        log::debug!("Creating agent version for {}", name);
        let request = self
            .client
            .post(self.url(&format!("agents/{}/versions", name)))
            .json(&definition.to_api_body());
        self.send_json(request).await
    }

    async fn delete_agent_version(&self, name: &str, version: &str) -> Result<()> {
        log::debug!("Deleting agent {} version {}", name, version);
        let request = self
            .client
            .delete(self.url(&format!("agents/{}/versions/{}", name, version)));
        self.send(request).await?;
        Ok(())
    }

    async fn create_conversation(&self) -> Result<Conversation> {
        let request = self.client.post(self.url("openai/conversations")).json(&json!({}));
        self.send_json(request).await
    }

    async fn create_response(&self, request: &ResponseRequest) -> Result<Response> {
        log::debug!("Submitting response request: {:?}", request.anchor);
        let http_request = self.client.post(self.url("openai/responses")).json(request);
        let response: Response = self.send_json(http_request).await?;
        log::debug!("Received response {} with {} output items", response.id, response.output.len());
        Ok(response)
    }
}

impl std::fmt::Debug for FoundryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoundryClient")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .finish()
    }
}
