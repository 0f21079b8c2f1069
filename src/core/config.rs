//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables or defaults. Credentials for the
//! platform control plane and PagerDuty are read from the environment the
//! host injects into the server process.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Onboarding tool configuration (Terraform + platform credentials).
    pub onboarding: OnboardingConfig,

    /// PagerDuty paging tool configuration.
    pub pagerduty: PagerDutyConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for the onboarding tool.
#[derive(Clone, Serialize, Deserialize)]
pub struct OnboardingConfig {
    /// Platform API key used by the onboarding call (`PLATFORM_API_KEY`).
    pub api_key: Option<String>,

    /// Override for the platform control-plane base URL (`PLATFORM_API_URL`).
    /// When unset, the default baked into the provisioning configuration is used.
    pub api_url: Option<String>,

    /// Terraform binary to invoke (`MCP_TERRAFORM_BIN`, default "terraform").
    pub terraform_bin: String,

    /// Working directory for provisioning runs (`MCP_TERRAFORM_WORKDIR`).
    /// When unset, a directory under the system temp dir is used.
    pub workdir: Option<PathBuf>,
}

/// Custom Debug implementation to redact the API key from logs.
impl std::fmt::Debug for OnboardingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnboardingConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("terraform_bin", &self.terraform_bin)
            .field("workdir", &self.workdir)
            .finish()
    }
}

/// Configuration for the PagerDuty paging tool.
#[derive(Clone, Serialize, Deserialize)]
pub struct PagerDutyConfig {
    /// PagerDuty REST API key (`PD_API_KEY`).
    pub api_key: Option<String>,

    /// Target service identifier (`PD_SERVICE_ID`).
    pub service_id: Option<String>,

    /// Escalation policy identifier (`PD_ESCALATION_POLICY_ID`).
    pub escalation_policy_id: Option<String>,

    /// Email address reported in the `From` header (`PD_FROM_EMAIL`).
    pub from_email: Option<String>,

    /// Account subdomain used to format incident URLs (`PD_SUBDOMAIN`).
    pub subdomain: String,

    /// Base URL of the PagerDuty REST API (`PD_API_BASE`).
    pub api_base: String,
}

/// Custom Debug implementation to redact the API key from logs.
impl std::fmt::Debug for PagerDutyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerDutyConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("service_id", &self.service_id)
            .field("escalation_policy_id", &self.escalation_policy_id)
            .field("from_email", &self.from_email)
            .field("subdomain", &self.subdomain)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            terraform_bin: "terraform".to_string(),
            workdir: None,
        }
    }
}

impl Default for PagerDutyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            service_id: None,
            escalation_policy_id: None,
            from_email: None,
            subdomain: "ops".to_string(),
            api_base: "https://api.pagerduty.com".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "ops-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            onboarding: OnboardingConfig::default(),
            pagerduty: PagerDutyConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        // Onboarding credentials and Terraform settings
        if let Ok(api_key) = std::env::var("PLATFORM_API_KEY") {
            config.onboarding.api_key = Some(api_key);
            info!("Platform API key loaded from environment");
        } else {
            warn!("PLATFORM_API_KEY not set - the onboarding tool will refuse to run");
        }

        if let Ok(api_url) = std::env::var("PLATFORM_API_URL") {
            config.onboarding.api_url = Some(api_url);
        }

        if let Ok(bin) = std::env::var("MCP_TERRAFORM_BIN") {
            config.onboarding.terraform_bin = bin;
        }

        if let Ok(workdir) = std::env::var("MCP_TERRAFORM_WORKDIR") {
            config.onboarding.workdir = Some(PathBuf::from(workdir));
        }

        // PagerDuty credentials
        if let Ok(api_key) = std::env::var("PD_API_KEY") {
            config.pagerduty.api_key = Some(api_key);
        } else {
            warn!("PD_API_KEY not set - the paging tool will refuse to run");
        }

        if let Ok(service_id) = std::env::var("PD_SERVICE_ID") {
            config.pagerduty.service_id = Some(service_id);
        }

        if let Ok(policy_id) = std::env::var("PD_ESCALATION_POLICY_ID") {
            config.pagerduty.escalation_policy_id = Some(policy_id);
        }

        if let Ok(email) = std::env::var("PD_FROM_EMAIL") {
            config.pagerduty.from_email = Some(email);
        }

        if let Ok(subdomain) = std::env::var("PD_SUBDOMAIN") {
            config.pagerduty.subdomain = subdomain;
        }

        if let Ok(api_base) = std::env::var("PD_API_BASE") {
            config.pagerduty.api_base = api_base;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_onboarding_credentials_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("PLATFORM_API_KEY", "uk-test-12345");
            std::env::set_var("MCP_TERRAFORM_BIN", "/usr/local/bin/terraform");
        }
        let config = Config::from_env();
        assert_eq!(config.onboarding.api_key.as_deref(), Some("uk-test-12345"));
        assert_eq!(config.onboarding.terraform_bin, "/usr/local/bin/terraform");
        unsafe {
            std::env::remove_var("PLATFORM_API_KEY");
            std::env::remove_var("MCP_TERRAFORM_BIN");
        }
    }

    #[test]
    fn test_pagerduty_credentials_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("PD_API_KEY", "pd-key");
            std::env::set_var("PD_SERVICE_ID", "SVC1");
            std::env::set_var("PD_ESCALATION_POLICY_ID", "EP1");
            std::env::set_var("PD_FROM_EMAIL", "oncall@example.com");
            std::env::set_var("PD_SUBDOMAIN", "acme");
        }
        let config = Config::from_env();
        assert_eq!(config.pagerduty.api_key.as_deref(), Some("pd-key"));
        assert_eq!(config.pagerduty.service_id.as_deref(), Some("SVC1"));
        assert_eq!(config.pagerduty.escalation_policy_id.as_deref(), Some("EP1"));
        assert_eq!(config.pagerduty.from_email.as_deref(), Some("oncall@example.com"));
        assert_eq!(config.pagerduty.subdomain, "acme");
        unsafe {
            std::env::remove_var("PD_API_KEY");
            std::env::remove_var("PD_SERVICE_ID");
            std::env::remove_var("PD_ESCALATION_POLICY_ID");
            std::env::remove_var("PD_FROM_EMAIL");
            std::env::remove_var("PD_SUBDOMAIN");
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.onboarding.terraform_bin, "terraform");
        assert!(config.onboarding.api_key.is_none());
        assert_eq!(config.pagerduty.api_base, "https://api.pagerduty.com");
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let config = Config {
            onboarding: OnboardingConfig {
                api_key: Some("super_secret_key".to_string()),
                ..OnboardingConfig::default()
            },
            pagerduty: PagerDutyConfig {
                api_key: Some("another_secret".to_string()),
                ..PagerDutyConfig::default()
            },
            ..Config::default()
        };
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
        assert!(!debug_str.contains("another_secret"));
    }
}
