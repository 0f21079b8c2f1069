//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod onboarding;
pub mod pagerduty;

pub use onboarding::{OnboardOrgParams, OnboardOrgTool};
pub use pagerduty::{PageOncallParams, PageOncallTool};
