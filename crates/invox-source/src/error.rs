//! Error types for document sourcing

use thiserror::Error;

/// Errors that can occur while listing, downloading, or reading documents
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Unexpected payload from the storage API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document bytes could not be read as a PDF at all
    #[error("Unreadable document: {0}")]
    Unreadable(String),
}
