//! Invox Extractor
//!
//! Converts one invoice document into a validated [`InvoiceRecord`] using a
//! generative model, optionally relayed through an external tool session.
//!
//! # Architecture
//!
//! ```text
//! Document text/handle → Prompt → Model ─┬→ Text ────────→ Normalizer → InvoiceRecord
//!                                        └→ Tool call → Session → Fragments ↗
//! ```
//!
//! The relay is deliberately single-shot: the model gets exactly one call
//! per document, and a tool result is final - there is no loop back to the
//! model. See [`engine`] for the state machine that enforces this.
//!
//! # Example Usage
//!
//! ```no_run
//! use invox_extractor::{DocumentInput, ExtractionEngine, ExtractionRequest};
//! use invox_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"client_name": "Acme Corp", "invoice_amount": 120.0, "product_name": "Widget"}"#);
//! let mut engine = ExtractionEngine::new(llm);
//!
//! let record = engine
//!     .extract(ExtractionRequest {
//!         file: "doc1.pdf".to_string(),
//!         input: DocumentInput::Text("Client: Acme Corp ...".to_string()),
//!     })
//!     .await?;
//!
//! assert_eq!(record.client.as_deref(), Some("Acme Corp"));
//! # Ok(())
//! # }
//! ```
//!
//! [`InvoiceRecord`]: invox_domain::InvoiceRecord

#![warn(missing_docs)]

mod capabilities;
mod engine;
mod error;
mod normalizer;
mod prompt;
mod types;


pub use capabilities::filter_capabilities;
pub use engine::{ExtractionEngine, NoToolSession};
pub use error::ExtractError;
pub use normalizer::{normalize, Normalized};
pub use prompt::PromptBuilder;
pub use types::{DocumentInput, ExtractionRequest};
