use crate::dispatch::Credential;
use crate::providers::types::{LlmRequest, ProviderType};
use crate::providers::gemini::GeminiAdapter;
use crate::providers::huggingface::HuggingFaceAdapter;
use crate::providers::mistral::MistralAdapter;
use crate::providers::openrouter::OpenRouterAdapter;
use crate::constants;
use crate::errors::{AdapterError, LlmError, LlmResult};
use std::sync::Arc;

use async_trait::async_trait;
use std::time::Duration;
use reqwest::{header, Client, RequestBuilder, StatusCode};

/// Common interface for all provider adapters
///
/// An adapter turns a normalized request into one provider call made with the given
/// credential and maps every failure onto an [`AdapterError`] kind. The dispatcher
/// only ever talks to this trait.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Perform one call and return the generated text
    async fn call(&self, credential: &Credential, model: &str, request: &LlmRequest) -> Result<String, AdapterError>;
    /// Provider this adapter talks to
    fn provider(&self) -> ProviderType;
    /// Model used when the request does not name one
    fn default_model(&self) -> &str;
}

/// Signature shared by the per-provider status classifiers
pub type Classifier = fn(StatusCode, String) -> AdapterError;

/// Base adapter implementation with common functionality
///
/// Handles the properties shared across all adapters:
/// - HTTP client with timeout
/// - Endpoint (default or custom)
/// - Default model
pub struct BaseAdapter {
    provider: ProviderType,
    client: Client,
    endpoint: String,
    default_model: String,
}

impl BaseAdapter {
    /// Create a new BaseAdapter
    ///
    /// # Parameters
    /// * `provider` - Provider identity
    /// * `endpoint` - API endpoint (or endpoint prefix for Gemini)
    /// * `default_model` - Model used when a request names none
    /// * `timeout` - Timeout applied by the HTTP client to every call
    pub fn new(provider: ProviderType, endpoint: String, default_model: String, timeout: Duration) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { provider, client, endpoint, default_model })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn provider(&self) -> ProviderType {
        self.provider
    }

    /// Build a bearer authorization header for the credential
    pub fn bearer_headers(&self, credential: &Credential) -> Result<header::HeaderMap, AdapterError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", credential.secret()))
                .map_err(|e| AdapterError::auth_failed(format!("Invalid API key format: {}", e)))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    /// Send the request and return the raw success body
    ///
    /// Non-success statuses go through `classify`; a `Retry-After` header given in
    /// seconds is attached to the resulting error.
    pub async fn send(&self, builder: RequestBuilder, classify: Classifier) -> Result<String, AdapterError> {
        let response = builder.send().await?;
        let status = response.status();
        let retry_after = retry_after_from_headers(response.headers());
        let body = response.text().await?;

        if !status.is_success() {
            let message = format!("{} API error ({}): {}", self.provider, status, truncate(&body, 500));
            return Err(classify(status, message).with_retry_after(retry_after));
        }

        Ok(body)
    }
}

fn retry_after_from_headers(headers: &header::HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.min(constants::MAX_COOLDOWN_SECS)))
}

/// Shorten a response body for error messages
pub fn truncate(body: &str, max_chars: usize) -> String {
    if body.chars().count() > max_chars {
        format!("{}... (truncated)", body.chars().take(max_chars).collect::<String>())
    } else {
        body.to_string()
    }
}

/// Factory function to create an adapter based on provider type
///
/// # Parameters
/// * `provider` - Which adapter to create
/// * `endpoint` - Optional custom endpoint replacing the provider default
/// * `default_model` - Optional default model replacing the provider default
/// * `timeout` - Per-call HTTP timeout
///
/// # Returns
/// * Arc-wrapped trait object implementing ProviderAdapter
pub fn create_adapter(
    provider: ProviderType,
    endpoint: Option<String>,
    default_model: Option<String>,
    timeout: Duration,
) -> LlmResult<Arc<dyn ProviderAdapter>> {
    let adapter: Arc<dyn ProviderAdapter> = match provider {
        ProviderType::Mistral => Arc::new(MistralAdapter::new(endpoint, default_model, timeout)?),
        ProviderType::OpenRouter => Arc::new(OpenRouterAdapter::new(endpoint, default_model, timeout)?),
        ProviderType::HuggingFace => Arc::new(HuggingFaceAdapter::new(endpoint, default_model, timeout)?),
        ProviderType::Gemini => Arc::new(GeminiAdapter::new(endpoint, default_model, timeout)?),
    };
    Ok(adapter)
}
