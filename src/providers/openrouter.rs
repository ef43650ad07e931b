use crate::dispatch::Credential;
use crate::providers::adapter::{BaseAdapter, ProviderAdapter};
use crate::providers::openai_compat::{self, ChatCompletionRequest};
use crate::providers::types::{LlmRequest, ProviderType};
use crate::errors::{AdapterError, LlmResult};
use crate::constants;

use std::time::Duration;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Adapter for OpenRouter's OpenAI-compatible API
///
/// Error mapping:
/// - 429 → `RateLimited` (free-tier models limit per key per minute and per day)
/// - 401 → `AuthFailed`
/// - 402 (insufficient credits) → `AuthFailed`; the key will not recover by waiting
/// - 408, 5xx, timeouts → `Transient`
/// - other 4xx → `Invalid`
pub struct OpenRouterAdapter {
    base: BaseAdapter,
}

impl OpenRouterAdapter {
    pub fn new(endpoint: Option<String>, default_model: Option<String>, timeout: Duration) -> LlmResult<Self> {
        let base = BaseAdapter::new(
            ProviderType::OpenRouter,
            endpoint.unwrap_or_else(|| constants::OPENROUTER_API_ENDPOINT.to_string()),
            default_model.unwrap_or_else(|| constants::OPENROUTER_DEFAULT_MODEL.to_string()),
            timeout,
        )?;
        Ok(Self { base })
    }

    fn classify(status: StatusCode, message: String) -> AdapterError {
        if status == StatusCode::PAYMENT_REQUIRED {
            return AdapterError::auth_failed(message);
        }
        AdapterError::from_api_response(status, message)
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterAdapter {
    async fn call(&self, credential: &Credential, model: &str, request: &LlmRequest) -> Result<String, AdapterError> {
        let headers = self.base.bearer_headers(credential)?;
        let body = ChatCompletionRequest::from_request(model, request, None);

        let builder = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&body);

        let response_body = self.base.send(builder, Self::classify).await?;
        openai_compat::extract_text(ProviderType::OpenRouter, &response_body)
    }

    fn provider(&self) -> ProviderType {
        self.base.provider()
    }

    fn default_model(&self) -> &str {
        self.base.default_model()
    }
}
