//! On-call paging tool definition.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::core::config::Config;
use crate::domains::tools::ToolError;

use super::client::PagerDutyClient;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the paging tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PageOncallParams {
    /// Description of the problem for the on-call engineer.
    #[schemars(description = "The description of the incident for the on-call engineer")]
    pub description: String,
}

// ============================================================================
// Output Structure
// ============================================================================

/// Result of creating an incident.
#[derive(Debug, Serialize, JsonSchema)]
struct PageResult {
    /// Identifier of the created incident.
    incident_id: String,
    /// User-facing incident URL.
    incident_url: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Paging tool - creates a PagerDuty incident and notifies the on-call engineer.
pub struct PageOncallTool;

impl PageOncallTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "page_oncall_engineer";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Create a PagerDuty incident and notify the on-call engineer. \
         Returns the incident URL the reporter can follow.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub fn execute(params: &PageOncallParams, config: &Config) -> CallToolResult {
        info!("Paging tool called");

        if params.description.trim().is_empty() {
            return CallToolResult::error(vec![Content::text("description must not be empty")]);
        }

        let client = match PagerDutyClient::from_config(&config.pagerduty) {
            Ok(c) => c,
            Err(e) => {
                warn!("Paging refused: {}", e);
                return CallToolResult::error(vec![Content::text(e.to_string())]);
            }
        };

        match client.create_incident(&params.description) {
            Ok(incident_id) => {
                let incident_url = client.incident_url(&incident_id);
                let summary = format!(
                    "The on-call engineer has been paged. They will reach out to you \
                     as soon as possible. Your PagerDuty incident URL is {}",
                    incident_url
                );

                let result = PageResult {
                    incident_id,
                    incident_url,
                };

                CallToolResult {
                    content: vec![Content::text(summary)],
                    structured_content: Some(serde_json::to_value(&result).unwrap()),
                    is_error: Some(false),
                    meta: None,
                }
            }
            Err(e) => {
                warn!("Incident creation failed: {}", e);
                CallToolResult::error(vec![Content::text(e.to_string())])
            }
        }
    }

    /// Dispatch a registry call with raw JSON arguments.
    pub fn dispatch(
        arguments: serde_json::Value,
        config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let params: PageOncallParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
        let result = Self::execute(&params, config);
        serde_json::to_value(&result).map_err(|e| ToolError::internal(e.to_string()))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<PageOncallParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<PageResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for the STDIO transport.
    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let config = config.clone();
            async move {
                let params: PageOncallParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                // The blocking HTTP client may not run on the async executor.
                tokio::task::spawn_blocking(move || Self::execute(&params, &config))
                    .await
                    .map_err(|e| McpError::internal_error(e.to_string(), None))
            }
            .boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PagerDutyConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn result_text(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            rmcp::model::RawContent::Text(t) => &t.text,
            _ => panic!("Expected text content"),
        }
    }

    #[test]
    fn test_execute_requires_credentials() {
        let params = PageOncallParams {
            description: "db is down".to_string(),
        };
        let result = PageOncallTool::execute(&params, &Config::default());
        assert!(result.is_error.unwrap_or(false));
        assert!(result_text(&result).contains("PD_API_KEY"));
    }

    #[test]
    fn test_execute_rejects_blank_description() {
        let params = PageOncallParams {
            description: "   ".to_string(),
        };
        let result = PageOncallTool::execute(&params, &Config::default());
        assert!(result.is_error.unwrap_or(false));
    }

    #[test]
    fn test_dispatch_rejects_missing_description() {
        let err =
            PageOncallTool::dispatch(serde_json::json!({}), &Config::default()).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_to_tool_metadata() {
        let tool = PageOncallTool::to_tool();
        assert_eq!(tool.name, PageOncallTool::NAME);
        assert!(tool.description.is_some());
    }

    #[tokio::test]
    async fn test_execute_end_to_end_against_mock() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/incidents"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "incident": { "id": "ABC123" }
            })))
            .mount(&server)
            .await;

        let config = Config {
            pagerduty: PagerDutyConfig {
                api_key: Some("pd-key".to_string()),
                service_id: Some("SVC1".to_string()),
                escalation_policy_id: Some("EP1".to_string()),
                from_email: Some("oncall@example.com".to_string()),
                subdomain: "acme".to_string(),
                api_base: server.uri(),
            },
            ..Config::default()
        };

        let result = tokio::task::spawn_blocking(move || {
            let params = PageOncallParams {
                description: "db is down".to_string(),
            };
            PageOncallTool::execute(&params, &config)
        })
        .await
        .unwrap();

        assert!(result.is_error.is_none() || !result.is_error.unwrap());
        assert!(result_text(&result).contains("https://acme.pagerduty.com/incidents/ABC123"));

        let structured = result.structured_content.expect("structured content");
        assert_eq!(structured["incident_id"], "ABC123");
        assert_eq!(
            structured["incident_url"],
            "https://acme.pagerduty.com/incidents/ABC123"
        );
    }
}
