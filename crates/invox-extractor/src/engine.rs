//! Extraction engine and the single-shot tool relay

use crate::error::ExtractError;
use crate::normalizer::{normalize, Normalized};
use crate::prompt::PromptBuilder;
use crate::types::{DocumentInput, ExtractionRequest};
use async_trait::async_trait;
use invox_domain::invoice::{KEY_CLIENT_NAME, KEY_INVOICE_AMOUNT, KEY_PRODUCT_NAME};
use invox_domain::traits::{LlmProvider, ToolSession};
use invox_domain::{
    ContentFragment, GenerateOptions, InvoiceFields, InvoiceRecord, ModelReply, ToolCapability,
};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt::Display;
use tracing::{debug, info};

/// Relay protocol state. The relay is single-shot: one model turn,
/// at most one tool round, no loop back to the model.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RelayState {
    /// Waiting for the model's one reply.
    AwaitingModel,
    /// The model requested a tool call; waiting for the session.
    AwaitingToolResult {
        name: String,
        arguments: Value,
    },
    /// Terminal: candidate texts ready for normalization.
    Done(Vec<String>),
    /// Terminal: the relay cannot produce a result.
    Failed(RelayFailure),
}

/// Why the relay failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelayFailure {
    /// Tool call requested with no session attached.
    ToolCallWithoutSession,
    /// A model turn arrived after the single relay round was spent.
    RepeatedToolCall,
    /// The tool call returned zero fragments.
    NoFragments,
}

impl RelayState {
    /// Consume the model's reply.
    pub(crate) fn on_model_reply(self, reply: ModelReply, session_attached: bool) -> RelayState {
        match self {
            RelayState::AwaitingModel => match reply {
                ModelReply::Text(text) => RelayState::Done(vec![text]),
                ModelReply::ToolCall { name, arguments } if session_attached => {
                    RelayState::AwaitingToolResult { name, arguments }
                }
                ModelReply::ToolCall { .. } => {
                    RelayState::Failed(RelayFailure::ToolCallWithoutSession)
                }
            },
            // One model turn per document; anything further is unsupported.
            _ => RelayState::Failed(RelayFailure::RepeatedToolCall),
        }
    }

    /// Consume the tool-execution result.
    pub(crate) fn on_tool_result(self, fragments: Vec<ContentFragment>) -> RelayState {
        match self {
            RelayState::AwaitingToolResult { .. } => {
                if fragments.is_empty() {
                    RelayState::Failed(RelayFailure::NoFragments)
                } else {
                    RelayState::Done(fragments.into_iter().map(|f| f.text).collect())
                }
            }
            other => other,
        }
    }
}

impl From<RelayFailure> for ExtractError {
    fn from(failure: RelayFailure) -> Self {
        match failure {
            RelayFailure::ToolCallWithoutSession => ExtractError::ToolCallUnsupported,
            RelayFailure::RepeatedToolCall => ExtractError::RepeatedToolCall,
            RelayFailure::NoFragments => ExtractError::NoToolFragments,
        }
    }
}

/// Placeholder session type for engines running without tool calling.
pub struct NoToolSession;

#[async_trait]
impl ToolSession for NoToolSession {
    type Error = Infallible;

    async fn list_tools(&mut self) -> Result<Vec<ToolCapability>, Self::Error> {
        Ok(Vec::new())
    }

    async fn call_tool(
        &mut self,
        _name: &str,
        _arguments: Value,
    ) -> Result<Vec<ContentFragment>, Self::Error> {
        Ok(Vec::new())
    }
}

/// The extraction engine: one model call per document, optionally relayed
/// through an external tool-execution session.
pub struct ExtractionEngine<L, S = NoToolSession> {
    llm: L,
    session: Option<S>,
    capabilities: Vec<ToolCapability>,
}

impl<L> ExtractionEngine<L>
where
    L: LlmProvider,
{
    /// Engine for inline-text extraction, no tool calling.
    pub fn new(llm: L) -> Self {
        Self {
            llm,
            session: None,
            capabilities: Vec::new(),
        }
    }
}

impl<L, S> ExtractionEngine<L, S>
where
    L: LlmProvider,
    S: ToolSession,
    L::Error: Display,
    S::Error: Display,
{
    /// Engine for tool-mediated extraction.
    ///
    /// `capabilities` must already be allow-list filtered (see
    /// [`crate::filter_capabilities`]); the engine offers exactly this set
    /// to the model on every call.
    pub fn with_session(llm: L, session: S, capabilities: Vec<ToolCapability>) -> Self {
        Self {
            llm,
            session: Some(session),
            capabilities,
        }
    }

    /// The capabilities offered to the model.
    pub fn capabilities(&self) -> &[ToolCapability] {
        &self.capabilities
    }

    /// Release the attached tool session, if any.
    pub fn into_session(self) -> Option<S> {
        self.session
    }

    /// Extract invoice fields from one document.
    ///
    /// Invokes the model exactly once. With capabilities attached the
    /// temperature is pinned to 0; otherwise provider defaults apply. The
    /// document identity is attached by the engine, never by the model.
    pub async fn extract(
        &mut self,
        request: ExtractionRequest,
    ) -> Result<InvoiceRecord, ExtractError> {
        let prompt = match &request.input {
            DocumentInput::Text(text) => PromptBuilder::inline(text.as_str()).build(),
            DocumentInput::Handle(id) => PromptBuilder::handle(id.as_str()).build(),
        };
        debug!("Prompt for '{}': {} chars", request.file, prompt.len());

        let options = if self.capabilities.is_empty() {
            GenerateOptions::default()
        } else {
            GenerateOptions::with_tools(self.capabilities.clone())
        };

        let reply = self
            .llm
            .generate(&prompt, &options)
            .await
            .map_err(|e| ExtractError::Model(e.to_string()))?;

        let state = match RelayState::AwaitingModel.on_model_reply(reply, self.session.is_some())
        {
            RelayState::AwaitingToolResult { name, arguments } => {
                info!("Relaying tool call \"{}\" for '{}'", name, request.file);
                let session = self
                    .session
                    .as_mut()
                    .ok_or(ExtractError::ToolCallUnsupported)?;
                let fragments = session
                    .call_tool(&name, arguments.clone())
                    .await
                    .map_err(|e| ExtractError::ToolRelay(e.to_string()))?;
                RelayState::AwaitingToolResult { name, arguments }.on_tool_result(fragments)
            }
            other => other,
        };

        match state {
            RelayState::Done(candidates) => record_from_candidates(&request.file, candidates),
            RelayState::Failed(failure) => Err(failure.into()),
            RelayState::AwaitingModel | RelayState::AwaitingToolResult { .. } => unreachable!(),
        }
    }
}

/// Normalize candidate texts in order; the first mapping wins.
fn record_from_candidates(
    file: &str,
    candidates: Vec<String>,
) -> Result<InvoiceRecord, ExtractError> {
    for candidate in &candidates {
        if let Normalized::Mapping(map) = normalize(candidate) {
            let map = unwrap_answer(map);
            let fields = InvoiceFields::from_map(&map)?;
            return Ok(fields.into_record(file));
        }
    }
    Err(ExtractError::Normalization(
        candidates.into_iter().next().unwrap_or_default(),
    ))
}

// Extraction tools may wrap their payload as {"answer": "<json string>"};
// unwrap it when the expected keys are absent from the outer mapping.
fn unwrap_answer(map: Map<String, Value>) -> Map<String, Value> {
    let has_expected = map.contains_key(KEY_CLIENT_NAME)
        || map.contains_key(KEY_INVOICE_AMOUNT)
        || map.contains_key(KEY_PRODUCT_NAME);
    if has_expected {
        return map;
    }
    if let Some(Value::String(inner)) = map.get("answer") {
        if let Normalized::Mapping(inner_map) = normalize(inner) {
            return inner_map;
        }
    }
    map
}

#[cfg(test)]
mod relay_tests {
    use super::*;
    use serde_json::json;

    fn tool_call() -> ModelReply {
        ModelReply::ToolCall {
            name: "box_ai_extract_tool".to_string(),
            arguments: json!({"file_id": "42"}),
        }
    }

    #[test]
    fn test_text_reply_is_terminal() {
        let state = RelayState::AwaitingModel
            .on_model_reply(ModelReply::Text("{}".to_string()), true);
        assert_eq!(state, RelayState::Done(vec!["{}".to_string()]));
    }

    #[test]
    fn test_tool_call_transitions_to_awaiting_result() {
        let state = RelayState::AwaitingModel.on_model_reply(tool_call(), true);
        assert!(matches!(state, RelayState::AwaitingToolResult { .. }));
    }

    #[test]
    fn test_tool_call_without_session_fails() {
        let state = RelayState::AwaitingModel.on_model_reply(tool_call(), false);
        assert_eq!(
            state,
            RelayState::Failed(RelayFailure::ToolCallWithoutSession)
        );
    }

    #[test]
    fn test_second_tool_call_is_a_terminal_failure() {
        // The relay is single-shot by design: a model turn after the first
        // relay round is not supported.
        let state = RelayState::AwaitingModel.on_model_reply(tool_call(), true);
        let state = state.on_model_reply(tool_call(), true);
        assert_eq!(state, RelayState::Failed(RelayFailure::RepeatedToolCall));
    }

    #[test]
    fn test_empty_fragments_fail() {
        let state = RelayState::AwaitingModel.on_model_reply(tool_call(), true);
        let state = state.on_tool_result(Vec::new());
        assert_eq!(state, RelayState::Failed(RelayFailure::NoFragments));
    }

    #[test]
    fn test_fragments_become_candidates() {
        let state = RelayState::AwaitingModel.on_model_reply(tool_call(), true);
        let state = state.on_tool_result(vec![
            ContentFragment::new("first"),
            ContentFragment::new("second"),
        ]);
        assert_eq!(
            state,
            RelayState::Done(vec!["first".to_string(), "second".to_string()])
        );
    }

    #[test]
    fn test_tool_result_after_terminal_state_is_ignored() {
        let done = RelayState::Done(vec!["x".to_string()]);
        let state = done.clone().on_tool_result(vec![ContentFragment::new("y")]);
        assert_eq!(state, done);
    }
}
