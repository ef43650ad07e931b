use serde::{Serialize, Deserialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Mistral,
    OpenRouter,
    #[serde(alias = "hf")]
    HuggingFace,
    #[serde(alias = "google")]
    Gemini,
}

impl ProviderType {
    /// Every supported provider, in a stable order
    pub const ALL: [ProviderType; 4] = [
        ProviderType::Mistral,
        ProviderType::OpenRouter,
        ProviderType::HuggingFace,
        ProviderType::Gemini,
    ];

    /// Lowercase wire name used in requests, responses and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Mistral => "mistral",
            ProviderType::OpenRouter => "openrouter",
            ProviderType::HuggingFace => "huggingface",
            ProviderType::Gemini => "gemini",
        }
    }
}

impl FromStr for ProviderType {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mistral" => Ok(ProviderType::Mistral),
            "openrouter" => Ok(ProviderType::OpenRouter),
            "huggingface" | "hf" => Ok(ProviderType::HuggingFace),
            "gemini" | "google" => Ok(ProviderType::Gemini),
            _ => Err(LlmError::UnknownProvider(s.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider-agnostic generation request
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub provider: ProviderType,
    /// Falls back to the adapter's default model when absent
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Extra provider-specific generation parameters
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

impl LlmRequest {
    pub fn new(provider: ProviderType, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            provider,
            model: None,
            temperature: None,
            top_p: None,
            max_tokens: None,
            params: HashMap::new(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Adds or overrides an extra parameter for this request.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Normalized response returned to callers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LlmResponse {
    pub provider: ProviderType,
    pub response: String,
}
