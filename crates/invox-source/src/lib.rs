//! Invox Document Source Layer
//!
//! Thin I/O plumbing around the core pipeline: enumerating and downloading
//! invoice documents from a Box folder, and best-effort text extraction
//! from PDF bytes. Both sit behind narrow contracts so the pipeline can be
//! tested without network access or real documents.

#![warn(missing_docs)]

mod box_client;
mod error;
mod text;

pub use box_client::BoxSource;
pub use error::SourceError;
pub use text::pdf_text;
