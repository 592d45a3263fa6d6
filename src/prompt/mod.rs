//! Prompt System - the routing instructions sent with the agent definition
//!
//! The instructions name every tool server and steer the model to the one
//! matching the request, with few-shot examples for the common cases.

use crate::tools::ToolCatalog;

const INSTRUCTIONS: &str = include_str!("instructions.md");

/// Routing instructions for the agent definition
pub fn instructions() -> &'static str {
    INSTRUCTIONS
}

/// Catalog entries the instructions never mention.
///
/// Covers server labels and allow-listed operations; an unmentioned server is
/// effectively invisible to the routing rules.
pub fn unreferenced_tools(catalog: &ToolCatalog) -> Vec<String> {
    let mut missing = Vec::new();
    for tool in catalog.all() {
        if !INSTRUCTIONS.contains(&tool.server_label) {
            missing.push(tool.server_label.clone());
        }
        for op in tool.allowed_tools.iter().flatten() {
            if !INSTRUCTIONS.contains(op.as_str()) {
                missing.push(format!("{}/{}", tool.server_label, op));
            }
        }
    }
    missing
}
