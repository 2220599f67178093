//! Invox LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `invox-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Gemini `generateContent` API integration
//!
//! # Examples
//!
//! ```
//! use invox_llm::MockProvider;
//! use invox_domain::traits::LlmProvider;
//! use invox_domain::{GenerateOptions, ModelReply};
//!
//! # async fn example() {
//! let provider = MockProvider::new("Hello from the model!");
//! let reply = provider.generate("test prompt", &GenerateOptions::default()).await.unwrap();
//! assert_eq!(reply, ModelReply::Text("Hello from the model!".to_string()));
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;

use async_trait::async_trait;
use invox_domain::traits::LlmProvider as LlmProviderTrait;
use invox_domain::{GenerateOptions, ModelReply};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the model
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

enum Scripted {
    Reply(ModelReply),
    Error,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured replies without making any network calls, and
/// records the options each call was made with so tests can assert on the
/// offered tools and temperature.
///
/// # Examples
///
/// ```
/// use invox_llm::MockProvider;
/// use invox_domain::traits::LlmProvider;
/// use invox_domain::{GenerateOptions, ModelReply};
///
/// # async fn example() {
/// let mut provider = MockProvider::new("default");
/// provider.add_reply("prompt1", ModelReply::Text("response1".to_string()));
///
/// let reply = provider.generate("prompt1", &GenerateOptions::default()).await.unwrap();
/// assert_eq!(reply, ModelReply::Text("response1".to_string()));
/// # }
/// ```
#[derive(Clone)]
pub struct MockProvider {
    default_reply: ModelReply,
    scripted: Arc<Mutex<HashMap<String, Scripted>>>,
    calls: Arc<Mutex<Vec<GenerateOptions>>>,
}

impl MockProvider {
    /// Create a provider answering every prompt with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_default_reply(ModelReply::Text(text.into()))
    }

    /// Create a provider answering every prompt with the given reply.
    pub fn with_default_reply(reply: ModelReply) -> Self {
        Self {
            default_reply: reply,
            scripted: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script a reply for one specific prompt.
    pub fn add_reply(&mut self, prompt: impl Into<String>, reply: ModelReply) {
        self.scripted
            .lock()
            .unwrap()
            .insert(prompt.into(), Scripted::Reply(reply));
    }

    /// Script an error for one specific prompt.
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .insert(prompt.into(), Scripted::Error);
    }

    /// Number of times `generate` was called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Options recorded from every call, in call order.
    pub fn recorded_options(&self) -> Vec<GenerateOptions> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<ModelReply, Self::Error> {
        self.calls.lock().unwrap().push(options.clone());

        let scripted = self.scripted.lock().unwrap();
        match scripted.get(prompt) {
            Some(Scripted::Error) => Err(LlmError::Other("Mock error".to_string())),
            Some(Scripted::Reply(reply)) => Ok(reply.clone()),
            None => Ok(self.default_reply.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let reply = provider
            .generate("any prompt", &GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, ModelReply::Text("Test response".to_string()));
    }

    #[tokio::test]
    async fn test_mock_provider_scripted_replies() {
        let mut provider = MockProvider::default();
        provider.add_reply("hello", ModelReply::Text("world".to_string()));
        provider.add_reply(
            "call",
            ModelReply::ToolCall {
                name: "box_ai_extract_tool".to_string(),
                arguments: json!({"file_id": "123"}),
            },
        );

        assert_eq!(
            provider
                .generate("hello", &GenerateOptions::default())
                .await
                .unwrap(),
            ModelReply::Text("world".to_string())
        );
        assert!(matches!(
            provider
                .generate("call", &GenerateOptions::default())
                .await
                .unwrap(),
            ModelReply::ToolCall { .. }
        ));
    }

    #[tokio::test]
    async fn test_mock_provider_records_options() {
        let provider = MockProvider::new("x");
        let options = GenerateOptions {
            temperature: Some(0.0),
            tools: Vec::new(),
        };
        provider.generate("p", &options).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.recorded_options()[0].temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider
            .generate("bad prompt", &GenerateOptions::default())
            .await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }
}
