//! Decisions on MCP tool-call approval requests

use async_trait::async_trait;

use crate::foundry::ApprovalRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Deny,
}

impl ApprovalDecision {
    pub fn approves(&self) -> bool {
        matches!(self, ApprovalDecision::Approve)
    }
}

/// Decides whether a held tool call may run.
///
/// Called once per approval request before the decisions are sent back.
#[async_trait]
pub trait Approver: Send + Sync {
    async fn decide(&self, request: &ApprovalRequest) -> ApprovalDecision;
}

/// Approves every request without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

#[async_trait]
impl Approver for AutoApprove {
    async fn decide(&self, request: &ApprovalRequest) -> ApprovalDecision {
        log::info!("Auto-approving {} on {}", request.tool_name(), request.server_label);
        ApprovalDecision::Approve
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auto_approve() {
        let request = ApprovalRequest {
            id: "mcpr_1".to_string(),
            server_label: "slack-mcp".to_string(),
            name: Some("conversations_add_message".to_string()),
            arguments: None,
        };
        let decision = AutoApprove.decide(&request).await;
        assert_eq!(decision, ApprovalDecision::Approve);
        assert!(decision.approves());
        assert!(!ApprovalDecision::Deny.approves());
    }
}
