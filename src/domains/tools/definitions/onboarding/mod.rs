//! Organization onboarding tool.
//!
//! Drives Terraform against the embedded provisioning configuration to
//! onboard a new organization, extracts the platform API token minted by the
//! control plane, and registers integration sources with it.

pub mod assets;
mod onboard;
pub mod terraform;
mod token;

pub use onboard::{OnboardOrgParams, OnboardOrgTool};
pub use terraform::{OnboardOutcome, OnboardingError, ProvisioningVars, TerraformRunner};
pub use token::extract_token;
