//! Interactive chat session against a registered agent
//!
//! One request/response exchange per user line. The first turn is anchored to
//! the conversation, every later turn chains to the previous response. Held
//! tool calls are answered in a single follow-up request before any text is
//! shown.

use std::io::{BufRead, Write};

use colored::*;

use crate::config::Config;
use crate::error::{AgentError, Result};
use crate::foundry::{
    AgentDefinition, AgentReference, AgentRegistration, AgentService, InputItem, Response, ResponseAnchor,
    ResponseRequest,
};
use crate::prompt;
use crate::tools::ToolCatalog;

use super::approval::{Approver, AutoApprove};

/// Words that end the session (compared case-insensitively)
pub const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// Shown when a response carries no text
pub const NO_TEXT_PLACEHOLDER: &str = "(no text response)";

/// True when the line should end the session instead of being submitted
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || EXIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd))
}

/// Per-session continuation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    conversation_id: String,
    previous_response_id: Option<String>,
}

impl SessionState {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            previous_response_id: None,
        }
    }

    /// Conversation for the first turn, previous response afterwards
    pub fn anchor(&self) -> ResponseAnchor {
        match &self.previous_response_id {
            Some(id) => ResponseAnchor::PreviousResponse(id.clone()),
            None => ResponseAnchor::Conversation(self.conversation_id.clone()),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn previous_response_id(&self) -> Option<&str> {
        self.previous_response_id.as_deref()
    }

    fn record(&mut self, response: &Response) {
        self.previous_response_id = Some(response.id.clone());
    }
}

/// How a single turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The agent answered; text is absent when the response carried none
    Replied(Option<String>),
    /// The service rejected a request; the session keeps going
    Rejected(String),
}

enum Exchange {
    Answered(Response),
    Rejected(String),
}

pub struct ChatSession<'a, S: AgentService + ?Sized> {
    service: &'a S,
    agent: AgentRegistration,
    state: SessionState,
    approver: Box<dyn Approver>,
}

impl<'a, S: AgentService + ?Sized> ChatSession<'a, S> {
    /// Wrap an already registered agent and conversation
    pub fn new(service: &'a S, agent: AgentRegistration, conversation_id: impl Into<String>) -> Self {
        Self {
            service,
            agent,
            state: SessionState::new(conversation_id),
            approver: Box::new(AutoApprove),
        }
    }

    /// Register the agent with every catalog server and open a conversation
    pub async fn start(service: &'a S, config: &Config, catalog: ToolCatalog) -> Result<Self> {
        for missing in prompt::unreferenced_tools(&catalog) {
            log::warn!("Instructions never mention {}", missing);
        }

        log::info!("Registering agent with tool servers: {}", catalog.labels().join(", "));
        let definition = AgentDefinition::new(config.model.clone(), prompt::instructions(), catalog);
        let agent = service.create_agent_version(&config.agent_name, &definition).await?;
        log::info!("Created agent {} version {}", agent.name, agent.version);

        let conversation = match service.create_conversation().await {
            Ok(conversation) => conversation,
            Err(e) => {
                // Don't leave an orphaned agent version behind
                if let Err(cleanup) = service.delete_agent_version(&agent.name, &agent.version).await {
                    log::warn!("Failed to delete agent after conversation error: {}", cleanup);
                }
                return Err(e);
            }
        };
        log::info!("Created conversation {}", conversation.id);

        Ok(Self::new(service, agent, conversation.id))
    }

    pub fn with_approver(mut self, approver: Box<dyn Approver>) -> Self {
        self.approver = approver;
        self
    }

    pub fn agent(&self) -> &AgentRegistration {
        &self.agent
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn agent_reference(&self) -> AgentReference {
        AgentReference::new(self.agent.name.clone())
    }

    /// Read lines until an exit command or end of input
    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<()> {
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "Chat with your agent (type 'quit' to exit)")?;
        writeln!(out, "{}", "=".repeat(60))?;

        loop {
            write!(out, "\n{} ", "You:".bold())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                log::info!("End of input");
                break;
            }
            if is_exit_command(&line) {
                log::info!("Exit requested");
                break;
            }

            self.turn(line.trim(), out).await?;
        }

        Ok(())
    }

    /// Submit one line of user text and print the agent's answer
    pub async fn turn<W: Write>(&mut self, text: &str, out: &mut W) -> Result<TurnOutcome> {
        let request = ResponseRequest::text(text, self.state.anchor(), self.agent_reference());
        let response = match self.submit(&request, out).await? {
            Exchange::Answered(response) => response,
            Exchange::Rejected(message) => return Ok(TurnOutcome::Rejected(message)),
        };

        let response = if response.approval_requests().is_empty() {
            response
        } else {
            let approvals = self.review_approvals(&response, out).await?;
            let request = ResponseRequest::approvals(approvals, response.id.clone(), self.agent_reference());
            match self.submit(&request, out).await? {
                Exchange::Answered(response) => response,
                Exchange::Rejected(message) => return Ok(TurnOutcome::Rejected(message)),
            }
        };

        for (server, tool, failed) in response.mcp_calls() {
            if failed {
                log::warn!("MCP call {} on {} failed", tool, server);
            } else {
                log::debug!("MCP call {} on {}", tool, server);
            }
        }

        let text = response.output_text();
        match &text {
            Some(reply) => writeln!(out, "\n{} {}", "Agent:".cyan().bold(), reply)?,
            None => writeln!(out, "\n{} {}", "Agent:".cyan().bold(), NO_TEXT_PLACEHOLDER.dimmed())?,
        }

        Ok(TurnOutcome::Replied(text))
    }

    /// Send a request; a rejected request is reported, anything else fatal propagates
    async fn submit<W: Write>(&mut self, request: &ResponseRequest, out: &mut W) -> Result<Exchange> {
        match self.service.create_response(request).await {
            Ok(response) => {
                self.state.record(&response);
                Ok(Exchange::Answered(response))
            }
            Err(AgentError::BadRequest(message)) => {
                log::warn!("Request rejected: {}", message);
                writeln!(out, "\n  {} {}", "[Error]".red().bold(), message)?;
                writeln!(out, "  (The agent encountered a tool error. Try a different request.)")?;
                Ok(Exchange::Rejected(message))
            }
            Err(e) => Err(e),
        }
    }

    async fn review_approvals<W: Write>(&self, response: &Response, out: &mut W) -> Result<Vec<InputItem>> {
        let mut items = Vec::new();
        for request in response.approval_requests() {
            writeln!(out, "\n  {}", "[MCP approval requested]".yellow())?;
            writeln!(out, "    Server : {}", request.server_label)?;
            writeln!(out, "    Tool   : {}", request.tool_name())?;
            writeln!(out, "    Args   : {}", request.pretty_arguments())?;

            let decision = self.approver.decide(request).await;
            items.push(InputItem::approval(request.id.clone(), decision.approves()));
        }
        Ok(items)
    }

    /// Deregister the agent version
    pub async fn close(self) -> Result<()> {
        self.service
            .delete_agent_version(&self.agent.name, &self.agent.version)
            .await?;
        log::info!("Deleted agent {} version {}", self.agent.name, self.agent.version);
        Ok(())
    }
}

/// Register, chat until exit, then always deregister
pub async fn run_session<S, R, W>(service: &S, config: &Config, catalog: ToolCatalog, input: R, out: &mut W) -> Result<()>
where
    S: AgentService + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut session = ChatSession::start(service, config, catalog).await?;
    let agent = session.agent().clone();
    writeln!(out, "Agent created  (id: {}, name: {}, version: {})", agent.id, agent.name, agent.version)?;
    writeln!(out, "Conversation   (id: {})", session.state().conversation_id())?;
    writeln!(out)?;

    let result = session.run(input, out).await;
    writeln!(out, "\nCleaning up ...")?;
    let closed = session.close().await;
    if let (Err(_), Err(e)) = (&result, &closed) {
        log::warn!("Failed to delete agent {} version {}: {}", agent.name, agent.version, e);
    }
    result?;
    closed?;

    writeln!(out, "\n{}", "Agent deleted. Goodbye!".green())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command(""));
        assert!(is_exit_command("   \n"));
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("  Q \n"));
        assert!(!is_exit_command("quitter"));
        assert!(!is_exit_command("show me jira issues"));
    }

    #[test]
    fn test_state_anchor_switches_after_first_response() {
        let mut state = SessionState::new("conv_1");
        assert_eq!(state.anchor(), ResponseAnchor::Conversation("conv_1".to_string()));

        state.record(&Response {
            id: "resp_1".to_string(),
            output: vec![],
        });
        assert_eq!(state.anchor(), ResponseAnchor::PreviousResponse("resp_1".to_string()));
        assert_eq!(state.previous_response_id(), Some("resp_1"));
        assert_eq!(state.conversation_id(), "conv_1");
    }
}
