//! Hosted agent service layer - agent registration, conversations, and responses
//!
//! This module provides:
//! - Wire types for agent definitions and the Responses API
//! - AgentService trait for API abstraction
//! - FoundryClient HTTP implementation
//! - MockAgentService for scripted tests

pub mod client;
pub mod http;
pub mod types;

pub use client::{AgentService, MockAgentService};
pub use http::FoundryClient;
pub use types::{
    AgentDefinition, AgentReference, AgentRegistration, ApprovalRequest, ContentPart, Conversation, InputItem,
    OutputItem, Response, ResponseAnchor, ResponseInput, ResponseRequest,
};
