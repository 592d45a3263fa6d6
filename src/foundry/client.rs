//! The hosted agent service seam and a scripted in-memory implementation

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AgentError, Result};

use super::types::{AgentDefinition, AgentRegistration, Conversation, Response, ResponseRequest};

/// Operations the session needs from the hosted agent service
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Register a new version of a prompt agent
    async fn create_agent_version(&self, name: &str, definition: &AgentDefinition) -> Result<AgentRegistration>;

    /// Deregister an agent version
    async fn delete_agent_version(&self, name: &str, version: &str) -> Result<()>;

    async fn create_conversation(&self) -> Result<Conversation>;

    /// One Responses API exchange
    async fn create_response(&self, request: &ResponseRequest) -> Result<Response>;
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<Response>>,
    requests: Vec<ResponseRequest>,
    definitions: Vec<(String, AgentDefinition)>,
    deleted: Vec<(String, String)>,
    conversations: usize,
    fail_deletes: bool,
}

/// Replays scripted responses in order and records every call
#[derive(Default)]
pub struct MockAgentService {
    state: Mutex<MockState>,
}

impl MockAgentService {
    pub fn new(responses: Vec<Result<Response>>) -> Self {
        Self {
            state: Mutex::new(MockState {
                responses: responses.into(),
                ..Default::default()
            }),
        }
    }

    /// Make every delete fail after recording it
    pub fn with_failing_delete(self) -> Self {
        self.state().fail_deletes = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Response requests received so far
    pub fn requests(&self) -> Vec<ResponseRequest> {
        self.state().requests.clone()
    }

    /// Agent definitions registered so far, by name
    pub fn definitions(&self) -> Vec<(String, AgentDefinition)> {
        self.state().definitions.clone()
    }

    /// Deleted (name, version) pairs
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.state().deleted.clone()
    }

    pub fn conversations_created(&self) -> usize {
        self.state().conversations
    }
}

#[async_trait]
impl AgentService for MockAgentService {
    async fn create_agent_version(&self, name: &str, definition: &AgentDefinition) -> Result<AgentRegistration> {
        let mut state = self.state();
        state.definitions.push((name.to_string(), definition.clone()));
        let version = state.definitions.len().to_string();
        Ok(AgentRegistration {
            id: format!("{}:{}", name, version),
            name: name.to_string(),
            version,
        })
    }

    async fn delete_agent_version(&self, name: &str, version: &str) -> Result<()> {
        let mut state = self.state();
        state.deleted.push((name.to_string(), version.to_string()));
        if state.fail_deletes {
            return Err(AgentError::Api {
                status: 404,
                message: format!("agent {} version {} not found", name, version),
            });
        }
        Ok(())
    }

    async fn create_conversation(&self) -> Result<Conversation> {
        let mut state = self.state();
        state.conversations += 1;
        Ok(Conversation {
            id: format!("conv_mock_{}", state.conversations),
        })
    }

    async fn create_response(&self, request: &ResponseRequest) -> Result<Response> {
        let mut state = self.state();
        state.requests.push(request.clone());
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::InvalidResponse("no scripted response left".to_string())))
    }
}
