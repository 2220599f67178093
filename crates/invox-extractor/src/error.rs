//! Error types for the extraction engine

use invox_domain::FieldError;
use thiserror::Error;

/// Errors that can occur during extraction
///
/// Every per-document failure mode surfaces here; the engine never panics
/// past its boundary, and the caller decides whether to skip or abort.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Model call failed
    #[error("Model error: {0}")]
    Model(String),

    /// The model requested a tool call but no session is attached
    #[error("Model requested a tool call but tool calling is not available")]
    ToolCallUnsupported,

    /// The model requested a second tool call; the relay is single-shot
    #[error("Model requested a second tool call; only one relay round is supported")]
    RepeatedToolCall,

    /// Forwarding the call to the tool-execution session failed
    #[error("Tool relay error: {0}")]
    ToolRelay(String),

    /// The tool relay yielded zero content fragments
    #[error("Tool relay yielded no content")]
    NoToolFragments,

    /// No candidate text could be interpreted as a field mapping
    #[error("Response could not be normalized to a field mapping: {0:?}")]
    Normalization(String),

    /// A field value failed type validation
    #[error(transparent)]
    Validation(#[from] FieldError),
}
