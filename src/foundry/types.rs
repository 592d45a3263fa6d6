//! Wire types for the hosted agent service
//!
//! Agent definitions and registrations, conversations, and the Responses API
//! request/response shapes including the MCP approval handshake.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::tools::ToolCatalog;

/// Prompt-agent definition registered as a new agent version
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub model: String,
    pub instructions: String,
    pub tools: ToolCatalog,
}

impl AgentDefinition {
    pub fn new(model: impl Into<String>, instructions: impl Into<String>, tools: ToolCatalog) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            tools,
        }
    }

    /// Body for the create-version call
    pub fn to_api_body(&self) -> Value {
        json!({
            "definition": {
                "kind": "prompt",
                "model": self.model,
                "instructions": self.instructions,
                "tools": self.tools.to_api_schema(),
            }
        })
    }
}

/// A created agent version; needed again to delete it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub id: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
}

/// Names the registered agent that should answer a response request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReference {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl AgentReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "agent_reference".to_string(),
        }
    }
}

/// What a turn continues from: a conversation or the previous response, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseAnchor {
    #[serde(rename = "conversation")]
    Conversation(String),
    #[serde(rename = "previous_response_id")]
    PreviousResponse(String),
}

/// A structured input item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputItem {
    #[serde(rename = "mcp_approval_response")]
    McpApprovalResponse { approve: bool, approval_request_id: String },
}

impl InputItem {
    pub fn approval(approval_request_id: impl Into<String>, approve: bool) -> Self {
        Self::McpApprovalResponse {
            approve,
            approval_request_id: approval_request_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseInput {
    Text(String),
    Items(Vec<InputItem>),
}

/// Body of a Responses API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRequest {
    pub input: ResponseInput,
    #[serde(flatten)]
    pub anchor: ResponseAnchor,
    pub agent: AgentReference,
}

impl ResponseRequest {
    /// User text for a turn
    pub fn text(text: impl Into<String>, anchor: ResponseAnchor, agent: AgentReference) -> Self {
        Self {
            input: ResponseInput::Text(text.into()),
            anchor,
            agent,
        }
    }

    /// Approval decisions chained to the response that asked for them
    pub fn approvals(items: Vec<InputItem>, response_id: impl Into<String>, agent: AgentReference) -> Self {
        Self {
            input: ResponseInput::Items(items),
            anchor: ResponseAnchor::PreviousResponse(response_id.into()),
            agent,
        }
    }
}

/// A tool call the service is holding until it gets a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: String,
    pub server_label: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl ApprovalRequest {
    pub fn tool_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unknown>")
    }

    /// Arguments as indented JSON; string-encoded JSON is decoded first
    pub fn pretty_arguments(&self) -> String {
        let value = match &self.arguments {
            None => Value::Null,
            Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())),
            Some(other) => other.clone(),
        };
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "output_text")]
    OutputText { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputItem {
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    #[serde(rename = "mcp_approval_request")]
    McpApprovalRequest(ApprovalRequest),
    #[serde(rename = "mcp_call")]
    McpCall {
        #[serde(default)]
        server_label: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        error: Option<Value>,
    },
    #[serde(rename = "mcp_list_tools")]
    McpListTools {
        #[serde(default)]
        server_label: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

impl Response {
    /// Concatenated output text, if the response carries any
    pub fn output_text(&self) -> Option<String> {
        let text: String = self
            .output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message { content } => Some(content),
                _ => None,
            })
            .flatten()
            .filter_map(|part| match part {
                ContentPart::OutputText { text } => Some(text.as_str()),
                ContentPart::Other => None,
            })
            .collect();

        (!text.is_empty()).then_some(text)
    }

    pub fn approval_requests(&self) -> Vec<&ApprovalRequest> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::McpApprovalRequest(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    /// MCP calls made while producing this response, as (server, tool, failed)
    pub fn mcp_calls(&self) -> Vec<(&str, &str, bool)> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::McpCall { server_label, name, error } => {
                    Some((server_label.as_str(), name.as_str(), error.as_ref().is_some_and(|e| !e.is_null())))
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_agent_definition_body() {
        let catalog = ToolCatalog::from_config(&Config::default());
        let body = AgentDefinition::new("gpt-4o", "be helpful", catalog).to_api_body();
        assert_eq!(body["definition"]["kind"], "prompt");
        assert_eq!(body["definition"]["model"], "gpt-4o");
        assert_eq!(body["definition"]["instructions"], "be helpful");
        assert_eq!(body["definition"]["tools"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_agent_reference_shape() {
        let json = serde_json::to_value(AgentReference::new("my-agent")).unwrap();
        assert_eq!(json, json!({"name": "my-agent", "type": "agent_reference"}));
    }

    #[test]
    fn test_first_turn_request_uses_conversation_only() {
        let req = ResponseRequest::text(
            "hello",
            ResponseAnchor::Conversation("conv_1".to_string()),
            AgentReference::new("a"),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["input"], "hello");
        assert_eq!(json["conversation"], "conv_1");
        assert!(json.get("previous_response_id").is_none());
        assert_eq!(json["agent"]["type"], "agent_reference");
    }

    #[test]
    fn test_chained_request_uses_previous_response_only() {
        let req = ResponseRequest::text(
            "again",
            ResponseAnchor::PreviousResponse("resp_1".to_string()),
            AgentReference::new("a"),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["previous_response_id"], "resp_1");
        assert!(json.get("conversation").is_none());
    }

    #[test]
    fn test_approval_request_body() {
        let req = ResponseRequest::approvals(
            vec![InputItem::approval("mcpr_1", true), InputItem::approval("mcpr_2", false)],
            "resp_9",
            AgentReference::new("a"),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["previous_response_id"], "resp_9");
        assert_eq!(
            json["input"],
            json!([
                {"type": "mcp_approval_response", "approve": true, "approval_request_id": "mcpr_1"},
                {"type": "mcp_approval_response", "approve": false, "approval_request_id": "mcpr_2"}
            ])
        );
    }

    #[test]
    fn test_parse_response_with_text_and_unknown_items() {
        let response: Response = serde_json::from_value(json!({
            "id": "resp_1",
            "object": "response",
            "output": [
                {"type": "mcp_list_tools", "server_label": "jira-mcp", "tools": []},
                {"type": "reasoning", "summary": []},
                {
                    "type": "message",
                    "id": "msg_1",
                    "role": "assistant",
                    "content": [
                        {"type": "output_text", "text": "Hello ", "annotations": []},
                        {"type": "refusal", "refusal": "no"},
                        {"type": "output_text", "text": "world"}
                    ]
                }
            ]
        }))
        .unwrap();

        assert_eq!(response.output_text().as_deref(), Some("Hello world"));
        assert!(response.approval_requests().is_empty());
        assert_eq!(response.output.len(), 3);
        assert_eq!(response.output[1], OutputItem::Other);
    }

    #[test]
    fn test_response_without_text() {
        let response: Response = serde_json::from_value(json!({"id": "resp_2", "output": []})).unwrap();
        assert!(response.output_text().is_none());
    }

    #[test]
    fn test_parse_approval_requests() {
        let response: Response = serde_json::from_value(json!({
            "id": "resp_3",
            "output": [
                {
                    "type": "mcp_approval_request",
                    "id": "mcpr_1",
                    "server_label": "slack-mcp",
                    "name": "conversations_add_message",
                    "arguments": "{\"channel\":\"#tech\"}"
                },
                {"type": "mcp_approval_request", "id": "mcpr_2", "server_label": "jira-mcp"}
            ]
        }))
        .unwrap();

        let requests = response.approval_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tool_name(), "conversations_add_message");
        assert!(requests[0].pretty_arguments().contains("\"channel\": \"#tech\""));
        assert_eq!(requests[1].tool_name(), "<unknown>");
        assert_eq!(requests[1].pretty_arguments(), "null");
    }

    #[test]
    fn test_mcp_calls_report_failures() {
        let response: Response = serde_json::from_value(json!({
            "id": "resp_4",
            "output": [
                {"type": "mcp_call", "server_label": "jira-mcp", "name": "jira_search_issues", "error": null},
                {"type": "mcp_call", "server_label": "slack-mcp", "name": "channels_list", "error": {"message": "boom"}}
            ]
        }))
        .unwrap();

        assert_eq!(
            response.mcp_calls(),
            vec![("jira-mcp", "jira_search_issues", false), ("slack-mcp", "channels_list", true)]
        );
    }
}
