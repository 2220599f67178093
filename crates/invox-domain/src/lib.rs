//! Invox Domain Layer
//!
//! Core types and trait interfaces for the invoice extraction pipeline.
//! Infrastructure implementations (SQLite store, Gemini provider, MCP
//! session, Box source) live in other crates and depend on this one.
//!
//! ## Key Concepts
//!
//! - **InvoiceRecord**: The persisted unit - one row per source document
//! - **InvoiceFields**: The validated three-field mapping produced from a
//!   model response, before a document identity is attached
//! - **AggregateReport**: Derived counts and sums, recomputed on demand
//! - **ModelReply / ToolCapability**: The two-way contract with a
//!   generative model that may answer directly or request a tool call

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod invoice;
pub mod report;
pub mod tool;
pub mod traits;

// Re-exports for convenience
pub use invoice::{FieldError, InvoiceFields, InvoiceRecord};
pub use report::{aggregate, AggregateReport, ClientGroup};
pub use tool::{ContentFragment, GenerateOptions, ModelReply, ToolCapability};
pub use traits::{DocumentRef, DocumentSource, InvoiceStore, LlmProvider, ToolSession};
