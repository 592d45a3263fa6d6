//! The fixed set of MCP servers the agent is registered with
//!
//! Three servers sit behind the API gateway; GitHub is reached directly and
//! authenticates through a project connection.

use serde_json::Value;

use crate::config::Config;

use super::definition::{ApprovalPolicy, McpTool};

pub const FUNCTIONS_LABEL: &str = "mcp-functions";
pub const SLACK_LABEL: &str = "slack-mcp";
pub const JIRA_LABEL: &str = "jira-mcp";
pub const GITHUB_LABEL: &str = "github-mcp";

/// Jira operations whose input schemas the hosted agent accepts.
///
/// The remaining Jira operations (jira_get_issue, jira_create_issue,
/// jira_update_issue, ...) use anyOf/allOf and are rejected at registration.
pub const JIRA_ALLOWED_TOOLS: [&str; 16] = [
    "jira_search_issues",
    "jira_list_projects",
    "jira_list_statuses",
    "jira_list_priorities",
    "jira_get_transitions",
    "jira_get_comments",
    "jira_get_worklogs",
    "jira_get_project",
    "jira_list_sprints",
    "jira_get_sprint",
    "jira_get_board",
    "jira_list_boards",
    "jira_get_issue_link_types",
    "jira_link_issues",
    "jira_list_fields",
    "jira_get_field",
];

/// Ordered catalog of MCP server descriptors
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<McpTool>,
}

impl ToolCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Build the four servers from configuration
    pub fn from_config(config: &Config) -> Self {
        let gateway = config.gateway_url.trim_end_matches('/');

        let mut catalog = Self::new();
        catalog.add(McpTool::new(FUNCTIONS_LABEL, format!("{}/mcp/sse", gateway)));
        catalog.add(McpTool::new(SLACK_LABEL, format!("{}/slack-mcp/sse", gateway)));
        catalog.add(
            McpTool::new(JIRA_LABEL, format!("{}/jira-mcp/sse", gateway))
                .with_allowed_tools(JIRA_ALLOWED_TOOLS),
        );
        catalog.add(
            McpTool::new(GITHUB_LABEL, config.github_mcp_url.clone())
                .with_approval(ApprovalPolicy::Never)
                .with_connection(config.github_mcp_connection.clone()),
        );
        catalog
    }

    /// Add a server, replacing any existing one with the same label
    pub fn add(&mut self, tool: McpTool) {
        match self.tools.iter_mut().find(|t| t.server_label == tool.server_label) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a server by label
    pub fn get(&self, label: &str) -> Option<&McpTool> {
        self.tools.iter().find(|t| t.server_label == label)
    }

    /// List labels in registration order
    pub fn labels(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.server_label.as_str()).collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &McpTool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool list as sent in the agent definition
    pub fn to_api_schema(&self) -> Vec<Value> {
        self.tools.iter().map(McpTool::to_api_schema).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            gateway_url: "https://gw.example.net/".to_string(),
            github_mcp_url: "https://gh.example.com/mcp/".to_string(),
            github_mcp_connection: "gh-conn".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_from_config_registers_four_servers_in_order() {
        let catalog = ToolCatalog::from_config(&test_config());
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.labels(), vec![FUNCTIONS_LABEL, SLACK_LABEL, JIRA_LABEL, GITHUB_LABEL]);
    }

    #[test]
    fn test_gateway_urls_are_joined_without_double_slash() {
        let catalog = ToolCatalog::from_config(&test_config());
        assert_eq!(catalog.get(FUNCTIONS_LABEL).unwrap().server_url, "https://gw.example.net/mcp/sse");
        assert_eq!(catalog.get(SLACK_LABEL).unwrap().server_url, "https://gw.example.net/slack-mcp/sse");
        assert_eq!(catalog.get(JIRA_LABEL).unwrap().server_url, "https://gw.example.net/jira-mcp/sse");
    }

    #[test]
    fn test_github_is_direct_with_connection() {
        let catalog = ToolCatalog::from_config(&test_config());
        let github = catalog.get(GITHUB_LABEL).unwrap();
        assert_eq!(github.server_url, "https://gh.example.com/mcp/");
        assert_eq!(github.project_connection_id.as_deref(), Some("gh-conn"));
        assert!(github.allowed_tools.is_none());
    }

    #[test]
    fn test_jira_allow_list() {
        let catalog = ToolCatalog::from_config(&test_config());
        let jira = catalog.get(JIRA_LABEL).unwrap();
        assert_eq!(jira.allowed_tools.as_ref().unwrap().len(), 16);
        let allowed = jira.allowed_tools.as_ref().unwrap();
        assert!(allowed.iter().any(|t| t == "jira_search_issues"));
        assert!(!allowed.iter().any(|t| t == "jira_get_issue"));
        assert!(!allowed.iter().any(|t| t == "jira_create_issue"));
    }

    #[test]
    fn test_all_servers_skip_approval() {
        let catalog = ToolCatalog::from_config(&test_config());
        assert!(catalog.all().all(|t| t.require_approval == ApprovalPolicy::Never));
    }

    #[test]
    fn test_add_replaces_same_label() {
        let mut catalog = ToolCatalog::from_config(&test_config());
        catalog.add(McpTool::new(SLACK_LABEL, "https://other/sse").with_approval(ApprovalPolicy::Always));
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(SLACK_LABEL).unwrap().require_approval, ApprovalPolicy::Always);
    }

    #[test]
    fn test_to_api_schema() {
        let schema = ToolCatalog::from_config(&test_config()).to_api_schema();
        assert_eq!(schema.len(), 4);
        assert!(schema.iter().all(|t| t["type"] == "mcp"));
        assert_eq!(schema[2]["allowed_tools"].as_array().unwrap().len(), 16);
        assert_eq!(schema[3]["project_connection_id"], "gh-conn");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ToolCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.get(JIRA_LABEL).is_none());
    }
}
