//! Organization onboarding tool definition.

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

use super::terraform::{ProvisioningVars, TerraformRunner};

fn default_true() -> bool {
    true
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the onboarding tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OnboardOrgParams {
    /// Name of the organization to create.
    #[schemars(description = "The name of the organization to create")]
    pub org_name: String,

    /// Email address of the organization administrator.
    #[schemars(description = "The email address of the organization administrator")]
    pub admin_email: String,

    /// User email addresses to invite to the organization.
    #[serde(default)]
    #[schemars(description = "List of user email addresses to invite to the organization")]
    pub invite_users: Vec<String>,

    /// Admin email addresses to invite to the organization.
    #[serde(default)]
    #[schemars(description = "List of admin email addresses to invite to the organization")]
    pub invite_admins: Vec<String>,

    /// Whether to register the integration sources after onboarding.
    #[serde(default = "default_true")]
    #[schemars(description = "Register the integration sources after onboarding (default: true)")]
    pub provision_sources: bool,

    /// Enable the Kubernetes source.
    #[serde(default = "default_true")]
    pub enable_k8s_source: bool,

    /// Enable the GitHub source.
    #[serde(default = "default_true")]
    pub enable_github_source: bool,

    /// Enable the Jenkins source.
    #[serde(default = "default_true")]
    pub enable_jenkins_source: bool,

    /// Enable the Jira source.
    #[serde(default = "default_true")]
    pub enable_jira_source: bool,

    /// Enable the Slack source.
    #[serde(default = "default_true")]
    pub enable_slack_source: bool,
}

impl OnboardOrgParams {
    fn provisioning_vars(&self, config: &Config) -> ProvisioningVars {
        ProvisioningVars {
            org_name: self.org_name.clone(),
            admin_email: self.admin_email.clone(),
            invite_users: self.invite_users.clone(),
            invite_admins: self.invite_admins.clone(),
            api_url: config.onboarding.api_url.clone(),
            enable_k8s_source: self.enable_k8s_source,
            enable_github_source: self.enable_github_source,
            enable_jenkins_source: self.enable_jenkins_source,
            enable_jira_source: self.enable_jira_source,
            enable_slack_source: self.enable_slack_source,
        }
    }
}

// ============================================================================
// Output Structure
// ============================================================================

/// Result of an onboarding run.
#[derive(Debug, Serialize, JsonSchema)]
struct OnboardResult {
    /// Name of the onboarded organization.
    org_name: String,
    /// Administrator email.
    admin_email: String,
    /// Users invited during onboarding.
    invited_users: Vec<String>,
    /// Admins invited during onboarding.
    invited_admins: Vec<String>,
    /// The platform API token minted for the new organization.
    token: String,
    /// Whether the integration sources were registered.
    sources_provisioned: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Onboarding tool - provisions a new organization against the platform
/// control plane via Terraform.
pub struct OnboardOrgTool;

impl OnboardOrgTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "onboard_organization";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Onboard a new organization against the platform control plane. \
         Creates the organization, invites the given users and admins, mints a \
         platform API token, and registers the integration sources \
         (Kubernetes, GitHub, Jenkins, Jira, Slack) with it.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(org_name = %params.org_name))]
    pub fn execute(params: &OnboardOrgParams, config: &Config) -> CallToolResult {
        info!("Onboarding tool called for '{}'", params.org_name);

        if params.org_name.trim().is_empty() {
            return CallToolResult::error(vec![Content::text("org_name must not be empty")]);
        }
        if params.admin_email.trim().is_empty() {
            return CallToolResult::error(vec![Content::text("admin_email must not be empty")]);
        }

        let runner = match TerraformRunner::from_config(&config.onboarding) {
            Ok(r) => r,
            Err(e) => {
                warn!("Onboarding refused: {}", e);
                return CallToolResult::error(vec![Content::text(e.to_string())]);
            }
        };

        let vars = params.provisioning_vars(config);
        match runner.onboard(&vars, params.provision_sources) {
            Ok(outcome) => {
                let summary = if outcome.sources_provisioned {
                    format!(
                        "Organization '{}' onboarded and integration sources registered",
                        params.org_name
                    )
                } else {
                    format!("Organization '{}' onboarded", params.org_name)
                };

                let result = OnboardResult {
                    org_name: params.org_name.clone(),
                    admin_email: params.admin_email.clone(),
                    invited_users: params.invite_users.clone(),
                    invited_admins: params.invite_admins.clone(),
                    token: outcome.token,
                    sources_provisioned: outcome.sources_provisioned,
                };

                CallToolResult {
                    content: vec![Content::text(summary)],
                    structured_content: Some(serde_json::to_value(&result).unwrap()),
                    is_error: Some(false),
                    meta: None,
                }
            }
            Err(e) => {
                warn!("Onboarding failed: {}", e);
                CallToolResult::error(vec![Content::text(format!("Onboarding failed: {}", e))])
            }
        }
    }

    /// Dispatch a registry call with raw JSON arguments.
    pub fn dispatch(
        arguments: serde_json::Value,
        config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let params: OnboardOrgParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
        let result = Self::execute(&params, config);
        serde_json::to_value(&result).map_err(|e| ToolError::internal(e.to_string()))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<OnboardOrgParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<OnboardResult>().into()),
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
                let params: OnboardOrgParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                // Subprocess work is blocking; keep it off the async executor.
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

    fn params() -> OnboardOrgParams {
        serde_json::from_value(serde_json::json!({
            "org_name": "acme",
            "admin_email": "admin@acme.io"
        }))
        .unwrap()
    }

    #[test]
    fn test_params_defaults() {
        let p = params();
        assert!(p.invite_users.is_empty());
        assert!(p.invite_admins.is_empty());
        assert!(p.provision_sources);
        assert!(p.enable_k8s_source);
        assert!(p.enable_slack_source);
    }

    #[test]
    fn test_execute_requires_api_key() {
        // Default config has no PLATFORM_API_KEY: the tool must refuse
        // before touching the filesystem or spawning anything.
        let result = OnboardOrgTool::execute(&params(), &Config::default());
        assert!(result.is_error.unwrap_or(false));

        let text = match &result.content[0].raw {
            rmcp::model::RawContent::Text(t) => &t.text,
            _ => panic!("Expected text content"),
        };
        assert!(text.contains("PLATFORM_API_KEY"));
    }

    #[test]
    fn test_execute_rejects_blank_org_name() {
        let mut p = params();
        p.org_name = "  ".to_string();
        let result = OnboardOrgTool::execute(&p, &Config::default());
        assert!(result.is_error.unwrap_or(false));
    }

    #[test]
    fn test_dispatch_rejects_missing_required_args() {
        let err = OnboardOrgTool::dispatch(
            serde_json::json!({ "org_name": "acme" }),
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_to_tool_metadata() {
        let tool = OnboardOrgTool::to_tool();
        assert_eq!(tool.name, OnboardOrgTool::NAME);
        assert!(tool.description.is_some());
    }

    #[cfg(unix)]
    mod with_stub_terraform {
        use super::*;
        use crate::core::config::OnboardingConfig;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        const STUB: &str = r#"#!/bin/sh
case "$1" in
  apply)
    echo "tok-xyz" > "$PWD/token.txt"
    ;;
  output)
    echo '{"result":{"value":{"token":"tok-xyz"}}}'
    ;;
esac
exit 0
"#;

        fn stub_config(dir: &TempDir) -> Config {
            let bin = dir.path().join("terraform-stub");
            fs::write(&bin, STUB).unwrap();
            let mut perms = fs::metadata(&bin).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&bin, perms).unwrap();

            let workdir = dir.path().join("work");
            fs::create_dir_all(&workdir).unwrap();

            Config {
                onboarding: OnboardingConfig {
                    api_key: Some("uk-test".to_string()),
                    api_url: None,
                    terraform_bin: bin.to_string_lossy().into_owned(),
                    workdir: Some(workdir),
                },
                ..Config::default()
            }
        }

        #[test]
        fn test_execute_returns_structured_result() {
            let dir = TempDir::new().unwrap();
            let config = stub_config(&dir);

            let result = OnboardOrgTool::execute(&params(), &config);
            assert!(result.is_error.is_none() || !result.is_error.unwrap());

            let structured = result.structured_content.expect("structured content");
            assert_eq!(structured["org_name"], "acme");
            assert_eq!(structured["admin_email"], "admin@acme.io");
            assert_eq!(structured["token"], "tok-xyz");
            assert_eq!(structured["sources_provisioned"], true);
        }

        #[test]
        fn test_dispatch_round_trip() {
            let dir = TempDir::new().unwrap();
            let config = stub_config(&dir);

            let value = OnboardOrgTool::dispatch(
                serde_json::json!({
                    "org_name": "acme",
                    "admin_email": "admin@acme.io",
                    "provision_sources": false
                }),
                &config,
            )
            .unwrap();

            assert_eq!(value["structuredContent"]["token"], "tok-xyz");
            assert_eq!(value["structuredContent"]["sources_provisioned"], false);
        }
    }
}
