//! Session driver - the interactive loop and the tool-approval handshake

mod approval;
mod driver;

pub use approval::{ApprovalDecision, Approver, AutoApprove};
pub use driver::{
    ChatSession, EXIT_COMMANDS, NO_TEXT_PLACEHOLDER, SessionState, TurnOutcome, is_exit_command, run_session,
};
