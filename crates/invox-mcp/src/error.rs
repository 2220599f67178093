//! Error types for the MCP client

use thiserror::Error;

/// Errors that can occur while talking to the tool-execution session
#[derive(Error, Debug)]
pub enum McpError {
    /// I/O error on the child process pipes
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// JSON-RPC error response from the server
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i32,
        /// JSON-RPC error message
        message: String,
    },

    /// The server closed its stdout before answering
    #[error("Session closed by server")]
    SessionClosed,

    /// The server broke the protocol contract
    #[error("Protocol error: {0}")]
    Protocol(String),
}
