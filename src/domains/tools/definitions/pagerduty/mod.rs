//! On-call paging tool.
//!
//! Creates a PagerDuty incident through the REST API and hands the reporter
//! the incident URL.

mod client;
mod page_oncall;

pub use client::{PagerDutyClient, PagerDutyError};
pub use page_oncall::{PageOncallParams, PageOncallTool};
