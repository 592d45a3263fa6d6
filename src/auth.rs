//! Bearer-token acquisition for the hosted agent service
//!
//! `DefaultCredential` tries a static token from the environment first and
//! falls back to the Azure CLI's cached login.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::{AgentError, Result};

/// Environment variable holding a pre-issued access token
pub const ENV_ACCESS_TOKEN: &str = "AZURE_AI_ACCESS_TOKEN";

/// Resource the token must be issued for
pub const TOKEN_RESOURCE: &str = "https://ai.azure.com";

/// Source of bearer tokens
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self) -> Result<String>;
}

/// A fixed token, typically from the environment
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// Read the token from `AZURE_AI_ACCESS_TOKEN`
    pub fn from_env() -> Option<Self> {
        std::env::var(ENV_ACCESS_TOKEN)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Self::new)
    }
}

impl std::fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenCredential").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
}

/// Token from `az account get-access-token`
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    resource: String,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self {
            resource: TOKEN_RESOURCE.to_string(),
        }
    }
}

impl AzureCliCredential {
    fn parse_output(stdout: &[u8]) -> Result<String> {
        let token: CliToken = serde_json::from_slice(stdout)
            .map_err(|e| AgentError::Auth(format!("Unexpected az output: {}", e)))?;
        if token.access_token.is_empty() {
            return Err(AgentError::Auth("az returned an empty access token".to_string()));
        }
        Ok(token.access_token)
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self) -> Result<String> {
        let output = Command::new("az")
            .args(["account", "get-access-token", "--output", "json", "--resource"])
            .arg(&self.resource)
            .output()
            .await
            .map_err(|e| AgentError::Auth(format!("Failed to run az: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentError::Auth(format!("az get-access-token failed: {}", stderr.trim())));
        }

        Self::parse_output(&output.stdout)
    }
}

/// Environment token, then Azure CLI
#[derive(Debug, Default)]
pub struct DefaultCredential {
    cli: AzureCliCredential,
}

impl DefaultCredential {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    async fn get_token(&self) -> Result<String> {
        if let Some(static_token) = StaticTokenCredential::from_env() {
            log::debug!("Using access token from {}", ENV_ACCESS_TOKEN);
            return static_token.get_token().await;
        }

        log::debug!("{} not set, falling back to Azure CLI", ENV_ACCESS_TOKEN);
        self.cli.get_token().await.map_err(|e| {
            AgentError::Auth(format!("No credential available (set {} or run `az login`): {}", ENV_ACCESS_TOKEN, e))
        })
    }
}
