//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A process-wide registry of all available tools
//! - Dispatch-by-name for tool calls with raw JSON arguments
//! - Tool metadata for listing

use std::sync::Arc;

use rmcp::model::Tool;
use tracing::warn;

use crate::core::config::Config;

use super::definitions::{OnboardOrgTool, PageOncallTool};
use super::error::ToolError;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    config: Arc<Config>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![OnboardOrgTool::NAME, PageOncallTool::NAME]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// This is the single source of truth for all available tools; the
    /// router and the registry both derive from the tool definitions.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![OnboardOrgTool::to_tool(), PageOncallTool::to_tool()]
    }

    /// Dispatch a tool call by name with raw JSON arguments.
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        match name {
            OnboardOrgTool::NAME => OnboardOrgTool::dispatch(arguments, &self.config),
            PageOncallTool::NAME => PageOncallTool::dispatch(arguments, &self.config),
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(Config::default()))
    }

    #[test]
    fn test_registry_tool_names() {
        let names = test_registry().tool_names();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"onboard_organization"));
        assert!(names.contains(&"page_oncall_engineer"));
    }

    #[test]
    fn test_registry_metadata_matches_names() {
        let registry = test_registry();
        let tools = ToolRegistry::get_all_tools();
        assert_eq!(tools.len(), registry.tool_names().len());
        for tool in tools {
            assert!(registry.tool_names().contains(&tool.name.as_ref()));
        }
    }

    #[test]
    fn test_call_unknown_tool() {
        let err = test_registry()
            .call_tool("unknown", serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn test_call_with_invalid_arguments() {
        let err = test_registry()
            .call_tool("page_oncall_engineer", serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_call_without_credentials_reports_tool_error_result() {
        // Arguments are valid, so dispatch succeeds; the missing credentials
        // surface as an error result, not a process failure.
        let value = test_registry()
            .call_tool(
                "page_oncall_engineer",
                serde_json::json!({ "description": "db is down" }),
            )
            .unwrap();
        assert_eq!(value["isError"], true);
    }
}
