//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - chat: interactive session with the agent (default)
//! - tools: print the MCP tool catalog
//! - prompt: print the routing instructions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gateway-agent - chat with an agent routed across MCP servers
#[derive(Parser, Debug)]
#[command(name = "gateway-agent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Register the agent and start an interactive chat
    Chat,

    /// Print the MCP servers the agent is registered with
    Tools {
        /// Print the tool list exactly as sent to the service
        #[arg(short, long)]
        json: bool,
    },

    /// Print the routing instructions
    Prompt,
}
