//! Transport layer for the MCP server.
//!
//! The tools here are invoked by the host platform over standard
//! input/output, so STDIO is the only transport. The transport owns the
//! connection lifecycle and delegates message handling to [`McpServer`].

use rmcp::ServiceExt;
use thiserror::Error;
use tracing::info;

use super::server::McpServer;

/// A specialized Result type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Errors that can occur in the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to initialize the transport.
    #[error("Transport initialization failed: {0}")]
    Init(String),

    /// The underlying MCP service failed while running.
    #[error("Service error: {0}")]
    Service(String),
}

impl TransportError {
    /// Create a new initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }
}

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the server over stdin/stdout until the client disconnects.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let service = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        service
            .waiting()
            .await
            .map_err(|e| TransportError::Service(e.to_string()))?;

        info!("STDIO transport finished");
        Ok(())
    }
}
