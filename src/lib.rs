//! Platform Ops MCP Server
//!
//! An MCP (Model Context Protocol) server exposing operational tools for an
//! internal automation platform:
//!
//! - **`onboard_organization`**: drives Terraform against an embedded
//!   provisioning configuration to onboard a new organization, extracts the
//!   freshly minted platform API token, and registers integration sources
//!   with it.
//! - **`page_oncall_engineer`**: creates a PagerDuty incident and returns
//!   the incident URL for the reporter.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server handler, and
//!   the STDIO transport
//! - **domains::tools**: tool definitions (one file per tool), the tool
//!   router, and the process-wide tool registry
//!
//! # Example
//!
//! ```rust,no_run
//! use ops_mcp_server::{core::Config, core::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config);
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
