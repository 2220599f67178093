//! Request types for extraction

/// How the document content reaches the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// Full document text already pulled into the process.
    Text(String),
    /// Opaque remote file id, resolved by the model through a tool call.
    Handle(String),
}

/// Request to extract invoice fields from one document
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Document identity; becomes the record key.
    pub file: String,

    /// Document content or remote handle.
    pub input: DocumentInput,
}
