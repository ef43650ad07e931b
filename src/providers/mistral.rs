use crate::dispatch::Credential;
use crate::providers::adapter::{BaseAdapter, ProviderAdapter};
use crate::providers::openai_compat::{self, ChatCompletionRequest};
use crate::providers::types::{LlmRequest, ProviderType};
use crate::errors::{AdapterError, LlmResult};
use crate::constants;

use std::time::Duration;
use async_trait::async_trait;

/// Adapter for Mistral AI's chat completion API
///
/// Error mapping:
/// - 429 → `RateLimited` (Mistral sends this for both per-minute and monthly limits)
/// - 401 → `AuthFailed`
/// - 5xx, timeouts → `Transient`
/// - 400/422 (unknown model, bad parameters) → `Invalid`
pub struct MistralAdapter {
    base: BaseAdapter,
}

impl MistralAdapter {
    /// Creates a new Mistral adapter
    ///
    /// # Parameters
    /// * `endpoint` - Custom endpoint, defaults to the public chat completions URL
    /// * `default_model` - Model used when a request names none
    /// * `timeout` - Per-call HTTP timeout
    pub fn new(endpoint: Option<String>, default_model: Option<String>, timeout: Duration) -> LlmResult<Self> {
        let base = BaseAdapter::new(
            ProviderType::Mistral,
            endpoint.unwrap_or_else(|| constants::MISTRAL_API_ENDPOINT.to_string()),
            default_model.unwrap_or_else(|| constants::MISTRAL_DEFAULT_MODEL.to_string()),
            timeout,
        )?;
        Ok(Self { base })
    }
}

#[async_trait]
impl ProviderAdapter for MistralAdapter {
    async fn call(&self, credential: &Credential, model: &str, request: &LlmRequest) -> Result<String, AdapterError> {
        let headers = self.base.bearer_headers(credential)?;
        let body = ChatCompletionRequest::from_request(model, request, None);

        let builder = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&body);

        let response_body = self.base.send(builder, AdapterError::from_api_response).await?;
        openai_compat::extract_text(ProviderType::Mistral, &response_body)
    }

    fn provider(&self) -> ProviderType {
        self.base.provider()
    }

    fn default_model(&self) -> &str {
        self.base.default_model()
    }
}
