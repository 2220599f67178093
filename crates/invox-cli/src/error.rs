//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistent storage could not be opened or read
    #[error("Store error: {0}")]
    Store(#[from] invox_store::StoreError),

    /// Tool-execution session could not be acquired or used
    #[error("Tool session error: {0}")]
    Mcp(#[from] invox_mcp::McpError),

    /// Tool-mediated document listing failed or was unparseable
    #[error("Tool session error: {0}")]
    ToolSession(String),

    /// Document source failure outside per-document processing
    #[error("Document source error: {0}")]
    Source(#[from] invox_source::SourceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Per-document failures: logged with the document identity, then the
/// batch moves on. Never fatal.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Source or text extractor could not produce usable content
    #[error("fetch failure: {0}")]
    Fetch(#[from] invox_source::SourceError),

    /// Model call, normalization, or field validation failed
    #[error("extraction failure: {0}")]
    Extraction(#[from] invox_extractor::ExtractError),

    /// Storage failed for this document
    #[error("persistence failure: {0}")]
    Persistence(#[from] invox_store::StoreError),
}
