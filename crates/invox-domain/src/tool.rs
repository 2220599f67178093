//! Model and tool-call value types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An externally implemented function the model may elect to invoke,
/// described by name, description, and argument schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCapability {
    /// Tool name, unique within a session.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema of the tool arguments.
    pub input_schema: Value,
}

/// One unit of a tool-call result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFragment {
    /// Text payload of the fragment.
    pub text: String,
}

impl ContentFragment {
    /// Build a fragment from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Outcome of a single model invocation: the model either answers in
/// free-form text or requests a named tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Free-form text answer.
    Text(String),
    /// Request to execute an external tool.
    ToolCall {
        /// Name of the requested tool.
        name: String,
        /// Arguments to forward verbatim.
        arguments: Value,
    },
}

/// Per-call generation settings.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Sampling temperature; `None` keeps the provider default.
    pub temperature: Option<f32>,
    /// Tool capabilities offered to the model for this call.
    pub tools: Vec<ToolCapability>,
}

impl GenerateOptions {
    /// Options for a tool-capable call: temperature pinned to the most
    /// deterministic setting, the given capabilities offered.
    pub fn with_tools(tools: Vec<ToolCapability>) -> Self {
        Self {
            temperature: Some(0.0),
            tools,
        }
    }
}
