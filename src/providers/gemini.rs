use crate::dispatch::Credential;
use crate::providers::adapter::{truncate, BaseAdapter, ProviderAdapter};
use crate::providers::types::{LlmRequest, ProviderType};
use crate::errors::{AdapterError, LlmResult};
use crate::constants;

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::header;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use log::debug;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Adapter for Google's Gemini `generateContent` API
///
/// Error mapping:
/// - 429 `RESOURCE_EXHAUSTED` → `RateLimited`
/// - 400 `INVALID_ARGUMENT` whose message says the API key is not valid → `AuthFailed`;
///   Gemini reports bad keys this way rather than with 401
/// - 403 `PERMISSION_DENIED` → `AuthFailed`
/// - 500, 503 `UNAVAILABLE`, 504, timeouts → `Transient`
/// - any other 400 (unknown model, bad config) → `Invalid`
/// - a response blocked by safety filters (no candidates) → `Invalid`
pub struct GeminiAdapter {
    base: BaseAdapter,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiAdapter {
    /// Creates a new Gemini adapter
    ///
    /// # Parameters
    /// * `endpoint` - Custom API prefix, defaults to `.../v1beta`
    /// * `default_model` - Model used when a request names none
    /// * `timeout` - Per-call HTTP timeout
    pub fn new(endpoint: Option<String>, default_model: Option<String>, timeout: Duration) -> LlmResult<Self> {
        let base = BaseAdapter::new(
            ProviderType::Gemini,
            endpoint.unwrap_or_else(|| constants::GEMINI_API_ENDPOINT_PREFIX.to_string()),
            default_model.unwrap_or_else(|| constants::GEMINI_DEFAULT_MODEL.to_string()),
            timeout,
        )?;
        Ok(Self { base })
    }

    fn build_request(request: &LlmRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: request.prompt.clone() }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                top_k: constants::GEMINI_DEFAULT_TOP_K,
                max_output_tokens: request.max_tokens.unwrap_or(constants::GEMINI_DEFAULT_MAX_OUTPUT_TOKENS),
                response_mime_type: "text/plain",
                extra: request.params.clone(),
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting { category, threshold: "BLOCK_NONE" })
                .collect(),
        }
    }

    fn parse_response(body: &str) -> Result<String, AdapterError> {
        let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
            AdapterError::transient(format!(
                "Failed to parse Gemini JSON response: {}. Response body: {}",
                e, truncate(body, 200)
            ))
        })?;

        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "unspecified".to_string());
            return Err(AdapterError::invalid(format!(
                "No candidates returned from Gemini, block reason: {}", reason
            )));
        };

        let text = candidate
            .content
            .map(|content| content.parts.into_iter().map(|part| part.text).collect::<Vec<_>>().join(""))
            .unwrap_or_default();
        Ok(text)
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    async fn call(&self, credential: &Credential, model: &str, request: &LlmRequest) -> Result<String, AdapterError> {
        let url = format!("{}/models/{}:generateContent", self.base.endpoint(), model);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "x-goog-api-key",
            header::HeaderValue::from_str(credential.secret())
                .map_err(|e| AdapterError::auth_failed(format!("Invalid API key format: {}", e)))?,
        );

        let builder = self.base.client()
            .post(&url)
            .headers(headers)
            .json(&Self::build_request(request));

        let response_body = self.base.send(builder, AdapterError::from_api_response).await?;
        let text = Self::parse_response(&response_body)?;
        debug!("Gemini returned {} characters for model {}", text.len(), model);
        Ok(text)
    }

    fn provider(&self) -> ProviderType {
        self.base.provider()
    }

    fn default_model(&self) -> &str {
        self.base.default_model()
    }
}
