//! CLI module for gateway-agent - command-line interface and subcommands.

pub mod commands;

pub use commands::{Cli, Commands};
