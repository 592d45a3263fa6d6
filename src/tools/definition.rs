//! MCP tool descriptors
//!
//! Each descriptor points the hosted agent at one remote MCP server and carries
//! the static routing metadata the service needs to call it.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Whether the hosted agent must ask before invoking a server's tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalPolicy {
    /// Calls run without a confirmation round-trip
    #[default]
    Never,
    /// Every call surfaces an approval request first
    Always,
}

impl ApprovalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Always => "always",
        }
    }
}

/// A remote MCP server the agent may call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpTool {
    /// Label the agent and the instructions refer to (e.g., "jira-mcp")
    pub server_label: String,
    /// SSE endpoint of the server
    pub server_url: String,
    #[serde(default)]
    pub require_approval: ApprovalPolicy,
    /// Restricts the callable operations when set
    #[serde(default)]
    pub allowed_tools: Option<Vec<String>>,
    /// Upstream connection holding the server's credentials
    #[serde(default)]
    pub project_connection_id: Option<String>,
}

impl McpTool {
    /// Create a descriptor with no approval gate, allow-list, or connection
    pub fn new(server_label: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            server_label: server_label.into(),
            server_url: server_url.into(),
            require_approval: ApprovalPolicy::Never,
            allowed_tools: None,
            project_connection_id: None,
        }
    }

    /// Set approval policy
    pub fn with_approval(mut self, policy: ApprovalPolicy) -> Self {
        self.require_approval = policy;
        self
    }

    /// Restrict to the named operations
    pub fn with_allowed_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    /// Set upstream connection identifier
    pub fn with_connection(mut self, connection_id: impl Into<String>) -> Self {
        self.project_connection_id = Some(connection_id.into());
        self
    }

    /// Convert to the hosted agent's tool schema
    pub fn to_api_schema(&self) -> Value {
        let mut schema = json!({
            "type": "mcp",
            "server_label": self.server_label,
            "server_url": self.server_url,
            "require_approval": self.require_approval.as_str(),
        });

        if let Some(allowed) = &self.allowed_tools {
            schema["allowed_tools"] = json!(allowed);
        }
        if let Some(connection) = &self.project_connection_id {
            schema["project_connection_id"] = json!(connection);
        }

        schema
    }
}
