//! Terraform orchestration for organization onboarding.
//!
//! The sequence is: materialize the embedded configuration into a working
//! directory, render `terraform.tfvars`, `init`, a targeted `apply` that
//! performs the onboarding call, read back the token artifact it wrote, then
//! a second full `apply` (authenticated with the fresh token) that registers
//! the integration sources, and finally `output -json`.
//!
//! The token crosses stages as an explicit parameter; it only ever enters an
//! environment at the subprocess boundary, as `PLATFORM_API_TOKEN` for the
//! Terraform child process. Any non-zero exit aborts the whole sequence with
//! the captured stderr; no cleanup or rollback is attempted.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::OnboardingConfig;

use super::assets;
use super::token::extract_token;

/// Environment variable carrying the inbound platform API key.
pub const API_KEY_ENV_VAR: &str = "PLATFORM_API_KEY";

/// Environment variable carrying the freshly minted token into the second pass.
pub const TOKEN_ENV_VAR: &str = "PLATFORM_API_TOKEN";

/// Resource targeted by the first, onboarding-only apply pass.
const ONBOARD_TARGET: &str = "null_resource.onboard_organization";

/// Token artifact written by the onboarding resource's local side effect.
const TOKEN_ARTIFACT: &str = "token.txt";

/// Errors that can occur during the onboarding orchestration.
#[derive(Debug, Error)]
pub enum OnboardingError {
    /// Required configuration is absent; raised before anything runs.
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// I/O failure while materializing files or reading artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terraform exited non-zero; carries the captured stderr verbatim.
    #[error("terraform {step} failed: {stderr}")]
    CommandFailed { step: &'static str, stderr: String },

    /// The run completed but produced no usable token.
    #[error("no token found in provisioning output")]
    TokenMissing,
}

/// Variables rendered into `terraform.tfvars`.
#[derive(Debug, Clone)]
pub struct ProvisioningVars {
    pub org_name: String,
    pub admin_email: String,
    pub invite_users: Vec<String>,
    pub invite_admins: Vec<String>,
    /// Override for the control-plane base URL; the configuration default applies when unset.
    pub api_url: Option<String>,
    pub enable_k8s_source: bool,
    pub enable_github_source: bool,
    pub enable_jenkins_source: bool,
    pub enable_jira_source: bool,
    pub enable_slack_source: bool,
}

impl ProvisioningVars {
    /// Render the tfvars file. Lists use HCL list syntax.
    pub fn render_tfvars(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("org_name = {}\n", hcl_string(&self.org_name)));
        out.push_str(&format!("admin_email = {}\n", hcl_string(&self.admin_email)));
        out.push_str(&format!("invite_users = {}\n", hcl_list(&self.invite_users)));
        out.push_str(&format!("invite_admins = {}\n", hcl_list(&self.invite_admins)));
        if let Some(api_url) = &self.api_url {
            out.push_str(&format!("platform_api_url = {}\n", hcl_string(api_url)));
        }
        out.push_str(&format!("enable_k8s_source = {}\n", self.enable_k8s_source));
        out.push_str(&format!("enable_github_source = {}\n", self.enable_github_source));
        out.push_str(&format!("enable_jenkins_source = {}\n", self.enable_jenkins_source));
        out.push_str(&format!("enable_jira_source = {}\n", self.enable_jira_source));
        out.push_str(&format!("enable_slack_source = {}\n", self.enable_slack_source));
        out
    }
}

/// Quote a string as an HCL literal.
fn hcl_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render a list of strings as an HCL list literal.
fn hcl_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| hcl_string(s)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Outcome of a full onboarding run.
#[derive(Debug, Clone)]
pub struct OnboardOutcome {
    /// The platform API token minted for the new organization.
    pub token: String,

    /// Whether the source-registration pass ran.
    pub sources_provisioned: bool,
}

/// Drives the Terraform CLI for the onboarding sequence.
#[derive(Debug)]
pub struct TerraformRunner {
    bin: String,
    workdir: PathBuf,
    api_key: String,
}

impl TerraformRunner {
    /// Create a runner with explicit settings.
    pub fn new(bin: String, workdir: PathBuf, api_key: String) -> Self {
        Self {
            bin,
            workdir,
            api_key,
        }
    }

    /// Build a runner from configuration. Fails fast when the platform API
    /// key is absent, before any file or subprocess work.
    pub fn from_config(config: &OnboardingConfig) -> Result<Self, OnboardingError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(OnboardingError::MissingConfig(API_KEY_ENV_VAR))?;

        let workdir = config
            .workdir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("platform-onboarding"));

        Ok(Self::new(config.terraform_bin.clone(), workdir, api_key))
    }

    /// The working directory provisioning runs in.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Write the embedded configuration files into the working directory.
    fn materialize(&self) -> Result<(), OnboardingError> {
        for (rel, content) in assets::provisioning_files() {
            let dest = self.workdir.join(rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, content)?;
        }
        debug!(workdir = %self.workdir.display(), "provisioning files materialized");
        Ok(())
    }

    /// Run one Terraform step, capturing stdout/stderr. The inbound API key
    /// is always present in the child environment; the minted token only
    /// when the caller passes it.
    fn run(
        &self,
        step: &'static str,
        args: &[&str],
        token: Option<&str>,
    ) -> Result<Output, OnboardingError> {
        debug!(step, ?args, "running terraform");

        let mut cmd = Command::new(&self.bin);
        cmd.args(args)
            .current_dir(&self.workdir)
            .env(API_KEY_ENV_VAR, &self.api_key);
        if let Some(token) = token {
            cmd.env(TOKEN_ENV_VAR, token);
        }

        let output = cmd.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!(step, %stderr, "terraform step failed");
            return Err(OnboardingError::CommandFailed { step, stderr });
        }
        Ok(output)
    }

    fn init(&self) -> Result<(), OnboardingError> {
        self.run("init", &["init"], None).map(|_| ())
    }

    fn apply(&self, target: Option<&str>, token: Option<&str>) -> Result<(), OnboardingError> {
        let mut args = vec!["apply", "-auto-approve"];
        let target_arg;
        if let Some(target) = target {
            target_arg = format!("-target={}", target);
            args.push(&target_arg);
        }
        self.run("apply", &args, token).map(|_| ())
    }

    fn output_json(&self, token: Option<&str>) -> Result<String, OnboardingError> {
        let output = self.run("output", &["output", "-json"], token)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Read the token artifact left behind by the onboarding resource.
    /// The file starts life holding "placeholder" until the onboarding call
    /// overwrites it.
    fn read_token_artifact(&self) -> Option<String> {
        let raw = fs::read_to_string(self.workdir.join(TOKEN_ARTIFACT)).ok()?;
        let token = raw.trim();
        if token.is_empty() || token == "null" || token == "placeholder" {
            return None;
        }
        Some(token.to_string())
    }

    /// Run the full onboarding sequence.
    pub fn onboard(
        &self,
        vars: &ProvisioningVars,
        provision_sources: bool,
    ) -> Result<OnboardOutcome, OnboardingError> {
        self.materialize()?;
        fs::write(self.workdir.join("terraform.tfvars"), vars.render_tfvars())?;

        self.init()?;

        // First pass: the onboarding call only.
        self.apply(Some(ONBOARD_TARGET), None)?;

        let artifact_token = self.read_token_artifact();

        // Second pass registers the integration sources, authenticated with
        // the token the first pass minted.
        let mut sources_provisioned = false;
        if provision_sources {
            if let Some(token) = artifact_token.as_deref() {
                self.apply(None, Some(token))?;
                sources_provisioned = true;
            } else {
                warn!("token artifact missing - skipping source registration pass");
            }
        }

        let output_json = self.output_json(artifact_token.as_deref())?;
        let token = artifact_token
            .or_else(|| extract_token(&output_json))
            .ok_or(OnboardingError::TokenMissing)?;

        info!(org_name = %vars.org_name, sources_provisioned, "onboarding completed");
        Ok(OnboardOutcome {
            token,
            sources_provisioned,
        })
    }
}
