//! Gemini Provider Implementation
//!
//! Integration with the Google Gemini `generateContent` API.
//!
//! # Features
//!
//! - Async HTTP communication via reqwest
//! - Function-declaration tools and pinned temperature per call
//! - Retry logic with exponential backoff
//! - Timeout handling

use crate::LlmError;
use async_trait::async_trait;
use invox_domain::traits::LlmProvider as LlmProviderTrait;
use invox_domain::{GenerateOptions, ModelReply, ToolCapability};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default timeout for model requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Gemini API provider
///
/// Holds an API key issued out-of-band; no interactive auth flow.
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
}

#[derive(Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Parameters
    ///
    /// - `api_key`: Gemini API key
    /// - `model`: Model to use (e.g., "gemini-2.5-flash")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("reqwest client with static configuration");

        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override the API endpoint (useful for proxies and tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn build_request(prompt: &str, options: &GenerateOptions) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    function_call: None,
                }],
            }],
            generation_config: options
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
            tools: if options.tools.is_empty() {
                None
            } else {
                Some(vec![Tool {
                    function_declarations: options
                        .tools
                        .iter()
                        .map(declaration_from_capability)
                        .collect(),
                }])
            },
        }
    }

    /// Invoke the model once
    ///
    /// # Errors
    ///
    /// Returns error if the network call fails after retries, the model is
    /// unknown, or the response carries neither text nor a function call.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<ModelReply, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint, self.model
        );
        let request_body = Self::build_request(prompt, options);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(response) => {
                    if response.status().is_success() {
                        return match response.json::<GenerateContentResponse>().await {
                            Ok(body) => reply_from_response(body),
                            Err(e) => Err(LlmError::InvalidResponse(format!(
                                "Failed to parse response: {}",
                                e
                            ))),
                        };
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

fn declaration_from_capability(capability: &ToolCapability) -> FunctionDeclaration {
    FunctionDeclaration {
        name: capability.name.clone(),
        description: capability.description.clone(),
        parameters: capability.input_schema.clone(),
    }
}

// The first part of the first candidate decides the reply shape.
fn reply_from_response(response: GenerateContentResponse) -> Result<ModelReply, LlmError> {
    let part = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .ok_or_else(|| LlmError::InvalidResponse("Response carries no content".to_string()))?;

    if let Some(call) = part.function_call {
        return Ok(ModelReply::ToolCall {
            name: call.name,
            arguments: call.args,
        });
    }
    if let Some(text) = part.text {
        return Ok(ModelReply::Text(text));
    }
    Err(LlmError::InvalidResponse(
        "Response part carries neither text nor a function call".to_string(),
    ))
}

#[async_trait]
impl LlmProviderTrait for GeminiProvider {
    type Error = LlmError;

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<ModelReply, Self::Error> {
        GeminiProvider::generate(self, prompt, options).await
    }
}
