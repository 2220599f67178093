//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Implementations live in other crates; tests substitute
//! fakes without touching the environment.

use crate::invoice::InvoiceRecord;
use crate::tool::{ContentFragment, GenerateOptions, ModelReply, ToolCapability};
use async_trait::async_trait;
use serde_json::Value;

/// Trait for persisting invoice records
///
/// Implemented by the infrastructure layer (invox-store)
pub trait InvoiceStore {
    /// Error type for store operations
    type Error;

    /// Insert the record, or replace the non-key fields of the existing
    /// row with the same `file`. Exactly one row per `file` afterwards.
    fn upsert(&mut self, record: &InvoiceRecord) -> Result<(), Self::Error>;

    /// Whether a record already exists for this document identity.
    fn exists(&self, file: &str) -> Result<bool, Self::Error>;

    /// All persisted records, in a stable order.
    fn all_records(&self) -> Result<Vec<InvoiceRecord>, Self::Error>;
}

/// Trait for generative model providers
///
/// Implemented by the infrastructure layer (invox-llm)
#[async_trait]
pub trait LlmProvider {
    /// Error type for model operations
    type Error;

    /// Invoke the model once with the given prompt and settings.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<ModelReply, Self::Error>;
}

/// Trait for the external tool-execution session
///
/// Implemented by the infrastructure layer (invox-mcp)
#[async_trait]
pub trait ToolSession {
    /// Error type for session operations
    type Error;

    /// Tools the session advertises.
    async fn list_tools(&mut self) -> Result<Vec<ToolCapability>, Self::Error>;

    /// Execute a named tool with the given arguments, returning the
    /// result content fragments.
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Vec<ContentFragment>, Self::Error>;
}

/// A named document available from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Source-assigned identity, usable with [`DocumentSource::fetch`].
    pub id: String,
    /// File name; doubles as the document identity in the store.
    pub name: String,
}

/// Trait for enumerating and fetching documents from remote storage
///
/// Implemented by the infrastructure layer (invox-source)
#[async_trait]
pub trait DocumentSource {
    /// Error type for source operations
    type Error;

    /// List the documents in the configured folder. May be empty.
    async fn list(&self) -> Result<Vec<DocumentRef>, Self::Error>;

    /// Fetch the byte content of one document.
    async fn fetch(&self, id: &str) -> Result<Vec<u8>, Self::Error>;
}
