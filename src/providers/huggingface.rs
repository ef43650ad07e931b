use crate::dispatch::Credential;
use crate::providers::adapter::{BaseAdapter, ProviderAdapter};
use crate::providers::openai_compat::{self, ChatCompletionRequest};
use crate::providers::types::{LlmRequest, ProviderType};
use crate::errors::{AdapterError, LlmResult};
use crate::constants;

use std::time::Duration;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Adapter for the Hugging Face inference router (chat completions)
///
/// Error mapping:
/// - 429 → `RateLimited`
/// - 402 (monthly inference credits used up) → `RateLimited`; the quota refills
/// - 401, 403 → `AuthFailed`
/// - 503 "model is loading", other 5xx, timeouts → `Transient`
/// - other 4xx → `Invalid`
///
/// Requests without `max_tokens` are capped at 2048 tokens.
pub struct HuggingFaceAdapter {
    base: BaseAdapter,
}

impl HuggingFaceAdapter {
    pub fn new(endpoint: Option<String>, default_model: Option<String>, timeout: Duration) -> LlmResult<Self> {
        let base = BaseAdapter::new(
            ProviderType::HuggingFace,
            endpoint.unwrap_or_else(|| constants::HUGGINGFACE_API_ENDPOINT.to_string()),
            default_model.unwrap_or_else(|| constants::HUGGINGFACE_DEFAULT_MODEL.to_string()),
            timeout,
        )?;
        Ok(Self { base })
    }

    fn classify(status: StatusCode, message: String) -> AdapterError {
        if status == StatusCode::PAYMENT_REQUIRED {
            return AdapterError::rate_limited(message);
        }
        AdapterError::from_api_response(status, message)
    }
}

#[async_trait]
impl ProviderAdapter for HuggingFaceAdapter {
    async fn call(&self, credential: &Credential, model: &str, request: &LlmRequest) -> Result<String, AdapterError> {
        let headers = self.base.bearer_headers(credential)?;
        let body = ChatCompletionRequest::from_request(
            model,
            request,
            Some(constants::HUGGINGFACE_DEFAULT_MAX_TOKENS),
        );

        let builder = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&body);

        let response_body = self.base.send(builder, Self::classify).await?;
        openai_compat::extract_text(ProviderType::HuggingFace, &response_body)
    }

    fn provider(&self) -> ProviderType {
        self.base.provider()
    }

    fn default_model(&self) -> &str {
        self.base.default_model()
    }
}
