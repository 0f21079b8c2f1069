//! PagerDuty REST client.
//!
//! One authenticated POST to create an incident. No retries, no rate-limit
//! handling, no idempotency key: re-running the tool may create a duplicate
//! incident.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::config::PagerDutyConfig;

/// Fixed prefix for incident titles; the free-text description follows it.
const INCIDENT_TITLE_PREFIX: &str = "Assistance requested via the on-call assistant";

/// Request timeout for the incident call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when creating an incident.
#[derive(Debug, Error)]
pub enum PagerDutyError {
    /// Required configuration is absent; raised before any network call.
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// The endpoint answered with a non-2xx status.
    #[error("Failed to create incident: HTTP {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The response was 2xx but carried no `incident.id`.
    #[error("Failed to fetch incident id from the response")]
    MissingIncidentId,

    /// The request itself failed (connection, timeout, ...).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for the PagerDuty incidents endpoint.
#[derive(Debug)]
pub struct PagerDutyClient {
    api_base: String,
    api_key: String,
    service_id: String,
    escalation_policy_id: String,
    from_email: String,
    subdomain: String,
}

impl PagerDutyClient {
    /// Build a client from configuration. All four required credentials are
    /// checked here, before any network call.
    pub fn from_config(config: &PagerDutyConfig) -> Result<Self, PagerDutyError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(PagerDutyError::MissingConfig("PD_API_KEY"))?;
        let service_id = config
            .service_id
            .clone()
            .ok_or(PagerDutyError::MissingConfig("PD_SERVICE_ID"))?;
        let escalation_policy_id = config
            .escalation_policy_id
            .clone()
            .ok_or(PagerDutyError::MissingConfig("PD_ESCALATION_POLICY_ID"))?;
        let from_email = config
            .from_email
            .clone()
            .ok_or(PagerDutyError::MissingConfig("PD_FROM_EMAIL"))?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            service_id,
            escalation_policy_id,
            from_email,
            subdomain: config.subdomain.clone(),
        })
    }

    /// Create an incident and return its identifier.
    pub fn create_incident(&self, description: &str) -> Result<String, PagerDutyError> {
        let url = format!("{}/incidents", self.api_base);
        let payload = json!({
            "incident": {
                "type": "incident",
                "title": format!("{} - {}", INCIDENT_TITLE_PREFIX, description),
                "service": {
                    "id": self.service_id,
                    "type": "service_reference",
                },
                "escalation_policy": {
                    "id": self.escalation_policy_id,
                    "type": "escalation_policy_reference",
                },
                "body": {
                    "type": "incident_body",
                    "details": description,
                },
            }
        });

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let response = client
            .post(&url)
            .header("Authorization", format!("Token token={}", self.api_key))
            .header("From", &self.from_email)
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), %detail, "incident creation rejected");
            return Err(PagerDutyError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        // A 2xx body that cannot be parsed or lacks incident.id is the same
        // failure: we could not fetch the incident id.
        let body: Value = response
            .json()
            .map_err(|_| PagerDutyError::MissingIncidentId)?;
        let incident_id = body
            .get("incident")
            .and_then(|i| i.get("id"))
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or(PagerDutyError::MissingIncidentId)?;

        info!(incident_id = %incident_id, "incident created");
        Ok(incident_id)
    }

    /// Format the user-facing incident URL for an identifier.
    pub fn incident_url(&self, incident_id: &str) -> String {
        format!(
            "https://{}.pagerduty.com/incidents/{}",
            self.subdomain, incident_id
        )
    }
}
