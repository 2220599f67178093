//! Batch processing: ingest, extract-all, persist.
//!
//! Two caller-level policies for already-processed documents: skip them
//! entirely (default) or always re-extract and upsert (`reprocess`). Both
//! ride the same upsert contract; neither can duplicate a row.

use crate::config::Settings;
use crate::error::{CliError, DocumentError, Result};
use invox_domain::traits::{DocumentRef, InvoiceStore, LlmProvider, ToolSession};
use invox_extractor::{filter_capabilities, DocumentInput, ExtractionEngine, ExtractionRequest};
use invox_llm::GeminiProvider;
use invox_mcp::McpSession;
use invox_source::{pdf_text, BoxSource, SourceError};
use invox_store::SqliteStore;
use serde_json::{json, Value};
use std::fmt::Display;
use std::path::Path;
use tracing::{error, info, warn};

/// Tool used to enumerate the remote folder in tooling mode.
const LIST_TOOL: &str = "box_list_folder_content_by_folder_id";

/// Outcome counts for one batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents extracted and persisted.
    pub processed: usize,
    /// Documents skipped because a record already existed.
    pub skipped: usize,
    /// Documents that failed; logged, never fatal.
    pub failed: usize,
}

/// Inline pipeline: download from Box when configured, extract from local
/// PDF text.
pub async fn run_inline(settings: &Settings, store: &mut SqliteStore) -> Result<BatchSummary> {
    if let (Some(token), Some(folder_id)) = (&settings.box_token, &settings.box_folder_id) {
        let source = BoxSource::new(token, folder_id);
        // Ingest is best-effort: whatever is already local still gets
        // processed when the folder cannot be reached.
        if let Err(e) = source.sync_to(&settings.invoice_dir).await {
            warn!("Could not sync invoices from Box: {}", e);
        }
    }

    let provider = GeminiProvider::new(&settings.gemini_api_key, &settings.model);
    let mut engine = ExtractionEngine::new(provider);
    process_local_batch(&mut engine, store, &settings.invoice_dir, settings.reprocess).await
}

/// Tooling pipeline: acquire the MCP session for the whole batch, hand the
/// model remote handles, relay its tool calls.
pub async fn run_tooling(settings: &Settings, store: &mut SqliteStore) -> Result<BatchSummary> {
    let command = settings.mcp.command.as_deref().ok_or_else(|| {
        CliError::Config("mcp.command is required in tooling mode".to_string())
    })?;
    let folder_id = settings.box_folder_id.as_deref().ok_or_else(|| {
        CliError::Config("box_folder_id is required in tooling mode".to_string())
    })?;

    // Session acquisition is setup: failure here aborts the run.
    let mut session = McpSession::spawn(command, &settings.mcp.args).await?;
    let advertised = session.list_tools().await?;
    let capabilities = filter_capabilities(advertised, &settings.mcp.allowed_tools);
    info!("Offering {} tool(s) to the model", capabilities.len());

    let documents = list_documents(&mut session, folder_id).await?;
    info!("Found {} invoices", documents.len());

    let provider = GeminiProvider::new(&settings.gemini_api_key, &settings.model);
    let mut engine = ExtractionEngine::with_session(provider, session, capabilities);

    let summary =
        process_remote_batch(&mut engine, store, &documents, settings.reprocess).await?;

    // Teardown regardless of per-document outcomes.
    if let Some(session) = engine.into_session() {
        if let Err(e) = session.shutdown().await {
            warn!("Tool session shutdown: {}", e);
        }
    }

    Ok(summary)
}

/// Process every `.pdf` in the invoice folder, one at a time, in name
/// order.
pub async fn process_local_batch<L, S>(
    engine: &mut ExtractionEngine<L, S>,
    store: &mut SqliteStore,
    invoice_dir: &Path,
    reprocess: bool,
) -> Result<BatchSummary>
where
    L: LlmProvider,
    S: ToolSession,
    L::Error: Display,
    S::Error: Display,
{
    let mut names: Vec<String> = match std::fs::read_dir(invoice_dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.to_ascii_lowercase().ends_with(".pdf"))
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Invoice folder {} does not exist", invoice_dir.display());
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };
    names.sort();

    let mut summary = BatchSummary::default();
    for name in &names {
        if !reprocess && record_exists(store, name, &mut summary) {
            continue;
        }

        info!("Processing {}...", name);
        let outcome = process_local_document(engine, store, invoice_dir, name).await;
        tally(&mut summary, name, outcome);
    }

    info!(
        "Batch complete: {} processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );
    Ok(summary)
}

/// Process remote documents through the tool-mediated engine.
pub async fn process_remote_batch<L, S>(
    engine: &mut ExtractionEngine<L, S>,
    store: &mut SqliteStore,
    documents: &[DocumentRef],
    reprocess: bool,
) -> Result<BatchSummary>
where
    L: LlmProvider,
    S: ToolSession,
    L::Error: Display,
    S::Error: Display,
{
    let mut summary = BatchSummary::default();
    for document in documents {
        if !reprocess && record_exists(store, &document.name, &mut summary) {
            continue;
        }

        info!("Extracting data from invoice \"{}\"...", document.name);
        let outcome = process_remote_document(engine, store, document).await;
        tally(&mut summary, &document.name, outcome);
    }

    info!(
        "Batch complete: {} processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );
    Ok(summary)
}

fn record_exists(store: &SqliteStore, name: &str, summary: &mut BatchSummary) -> bool {
    match store.exists(name) {
        Ok(true) => {
            info!("{} already exists in the database.", name);
            summary.skipped += 1;
            true
        }
        Ok(false) => false,
        Err(e) => {
            error!("Failed to check {}: {}", name, e);
            summary.failed += 1;
            true
        }
    }
}

fn tally(
    summary: &mut BatchSummary,
    name: &str,
    outcome: std::result::Result<(), DocumentError>,
) {
    match outcome {
        Ok(()) => summary.processed += 1,
        Err(e) => {
            error!("Failed to process {}: {}", name, e);
            summary.failed += 1;
        }
    }
}

async fn process_local_document<L, S>(
    engine: &mut ExtractionEngine<L, S>,
    store: &mut SqliteStore,
    invoice_dir: &Path,
    name: &str,
) -> std::result::Result<(), DocumentError>
where
    L: LlmProvider,
    S: ToolSession,
    L::Error: Display,
    S::Error: Display,
{
    let bytes = std::fs::read(invoice_dir.join(name)).map_err(SourceError::from)?;
    let text = pdf_text(&bytes)?;

    let record = engine
        .extract(ExtractionRequest {
            file: name.to_string(),
            input: DocumentInput::Text(text),
        })
        .await?;

    info!("Updating database with invoice {}...", name);
    store.upsert(&record)?;
    Ok(())
}

async fn process_remote_document<L, S>(
    engine: &mut ExtractionEngine<L, S>,
    store: &mut SqliteStore,
    document: &DocumentRef,
) -> std::result::Result<(), DocumentError>
where
    L: LlmProvider,
    S: ToolSession,
    L::Error: Display,
    S::Error: Display,
{
    let record = engine
        .extract(ExtractionRequest {
            file: document.name.clone(),
            input: DocumentInput::Handle(document.id.clone()),
        })
        .await?;

    info!("Updating database with invoice {}...", document.name);
    store.upsert(&record)?;
    Ok(())
}

/// Enumerate the remote folder through the tool session.
async fn list_documents<S>(session: &mut S, folder_id: &str) -> Result<Vec<DocumentRef>>
where
    S: ToolSession,
    S::Error: Display,
{
    let fragments = session
        .call_tool(LIST_TOOL, json!({ "folder_id": folder_id }))
        .await
        .map_err(|e| CliError::ToolSession(e.to_string()))?;

    parse_document_listing(fragments.iter().map(|f| f.text.as_str()))
        .ok_or_else(|| CliError::ToolSession("Unparseable folder listing".to_string()))
}

/// Parse a folder listing out of tool result text: either a JSON array of
/// entries or an object wrapping one under `entries`.
fn parse_document_listing<'a>(
    mut fragments: impl Iterator<Item = &'a str>,
) -> Option<Vec<DocumentRef>> {
    let first = fragments.next()?;
    let value: Value = serde_json::from_str(first.trim()).ok()?;

    let entries = match &value {
        Value::Array(entries) => entries.clone(),
        Value::Object(map) => map.get("entries")?.as_array()?.clone(),
        _ => return None,
    };

    let mut documents = Vec::new();
    for entry in &entries {
        let map = entry.as_object()?;
        if let Some(kind) = map.get("type").and_then(Value::as_str) {
            if kind != "file" {
                continue;
            }
        }
        let id = match map.get("id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let name = map.get("name")?.as_str()?.to_string();
        documents.push(DocumentRef { id, name });
    }
    Some(documents)
}
