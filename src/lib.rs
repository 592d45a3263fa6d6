//! gateway-agent - an interactive agent routed across MCP servers
//!
//! Registers a prompt agent with four remote MCP servers (sample functions,
//! Slack, Jira behind an API gateway, and GitHub directly), then drives a chat
//! loop against the hosted Responses API, auto-approving held tool calls.

pub mod auth;
pub mod config;
pub mod error;
pub mod foundry;
pub mod prompt;
pub mod session;
pub mod tools;

pub use error::{AgentError, Result};
