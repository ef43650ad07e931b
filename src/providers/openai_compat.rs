//! Wire types for OpenAI-style chat completion APIs.
//!
//! Mistral, OpenRouter and the Hugging Face router all accept this request shape, so
//! their adapters only differ in endpoint, defaults and error mapping.

use std::collections::HashMap;

use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::errors::AdapterError;
use crate::providers::adapter::truncate;
use crate::providers::types::{LlmRequest, ProviderType};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for a chat completion call
#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ChatCompletionRequest {
    /// Build a single-turn user request
    ///
    /// `default_max_tokens` applies only when the caller did not set one.
    pub fn from_request(model: &str, request: &LlmRequest, default_max_tokens: Option<u32>) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens.or(default_max_tokens),
            extra: request.params.clone(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's text out of a success body
///
/// A body that does not parse or carries no choices is treated as transient: the same
/// request may well succeed on the next attempt.
pub fn extract_text(provider: ProviderType, body: &str) -> Result<String, AdapterError> {
    let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        AdapterError::transient(format!(
            "Failed to parse {} JSON response: {}. Response body: {}",
            provider, e, truncate(body, 200)
        ))
    })?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| AdapterError::transient(format!("No choices returned from {}", provider)))
}
