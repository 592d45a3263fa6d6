//! Tool System - MCP server descriptors and the catalog the agent is registered with

mod catalog;
mod definition;

pub use catalog::{FUNCTIONS_LABEL, GITHUB_LABEL, JIRA_ALLOWED_TOOLS, JIRA_LABEL, SLACK_LABEL, ToolCatalog};
pub use definition::{ApprovalPolicy, McpTool};
