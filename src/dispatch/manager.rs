use crate::config::{self, Config};
use crate::dispatch::builder::DispatchManagerBuilder;
use crate::dispatch::key_pool::{CredentialStats, FailureReason, KeyPool};
use crate::dispatch::rate_gate::RateGate;
use crate::errors::{AdapterError, LlmError, LlmResult};
use crate::providers::{LlmRequest, LlmResponse, ProviderAdapter, ProviderType};
use futures::future::join_all;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One configured provider: its adapter, its keys and the gate it paces through
///
/// With global pacing every route holds the same gate.
pub(crate) struct ProviderRoute {
    pub(crate) adapter: Arc<dyn ProviderAdapter>,
    pub(crate) pool: Arc<KeyPool>,
    pub(crate) gate: Arc<RateGate>,
}

/// Dispatches normalized requests to providers
///
/// Per request: pace through the rate gate, pick a key from the provider's pool,
/// call the adapter outside every lock, and on a key-related failure mark the key and
/// retry with the next one, at most `max_attempts` calls in total.
pub struct DispatchManager {
    pub(crate) routes: HashMap<ProviderType, ProviderRoute>,
    pub(crate) max_attempts: usize,
    pub(crate) request_timeout: Duration,
}

impl DispatchManager {
    /// Creates a builder for configuring a DispatchManager.
    pub fn builder() -> DispatchManagerBuilder {
        DispatchManagerBuilder::new()
    }

    /// Create a DispatchManager from a TOML configuration file.
    ///
    /// # Example
    /// ```no_run
    /// use keyrelay::DispatchManager;
    ///
    /// let manager = DispatchManager::from_config_file("keyrelay.toml").unwrap();
    /// ```
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> LlmResult<Self> {
        let config = config::load_config(path)?;
        Self::from_config(&config)
    }

    /// Create a DispatchManager from a TOML configuration string.
    pub fn from_config_str(content: &str) -> LlmResult<Self> {
        let config = config::parse_config(content)?;
        Self::from_config(&config)
    }

    /// Create a DispatchManager from the process environment.
    ///
    /// Every provider is registered; see [`config::config_from_env`] for the variables read.
    pub fn from_env() -> LlmResult<Self> {
        let config = config::config_from_env()?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> LlmResult<Self> {
        DispatchManagerBuilder::from_config(config)?.build()
    }

    /// Send a request and return the normalized response or one terminal error
    pub async fn request(&self, request: LlmRequest) -> LlmResult<LlmResponse> {
        if request.prompt.trim().is_empty() {
            return Err(LlmError::ValidationError("prompt is required".to_string()));
        }

        let provider = request.provider;
        let route = self
            .routes
            .get(&provider)
            .ok_or_else(|| LlmError::UnknownProvider(provider.to_string()))?;

        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| route.adapter.default_model())
            .to_string();

        let start_time = Instant::now();
        route.gate.wait().await;

        let result = self.dispatch(provider, route, &model, &request).await;

        #[cfg(feature = "metrics")]
        match &result {
            Ok((_, attempts)) => crate::metrics::record_request_success(provider, *attempts, start_time.elapsed()),
            Err(e) => crate::metrics::record_request_failure(provider, e, start_time.elapsed()),
        }

        match result {
            Ok((text, attempts)) => {
                debug!(
                    "Request to {} ({}) succeeded after {} attempt(s) in {:?}",
                    provider, model, attempts, start_time.elapsed()
                );
                Ok(LlmResponse { provider, response: text })
            }
            Err(e) => {
                warn!("Request to {} ({}) failed: {}", provider, model, e);
                Err(e)
            }
        }
    }

    /// Selecting / Calling / Rotating loop; returns the text and the attempt count
    async fn dispatch(
        &self,
        provider: ProviderType,
        route: &ProviderRoute,
        model: &str,
        request: &LlmRequest,
    ) -> LlmResult<(String, usize)> {
        let mut last_error = AdapterError::transient("no attempt was made");

        for attempt in 1..=self.max_attempts {
            let credential = route.pool.next().await?;
            debug!(
                "Attempt {}/{} for {} with key #{}",
                attempt, self.max_attempts, provider, credential.index()
            );

            let outcome = match tokio::time::timeout(
                self.request_timeout,
                route.adapter.call(&credential, model, request),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(AdapterError::transient(format!(
                    "{} call timed out after {:?}",
                    provider, self.request_timeout
                ))),
            };

            let err = match outcome {
                Ok(text) => {
                    route.pool.mark_success(&credential).await;
                    return Ok((text, attempt));
                }
                Err(err) => err,
            };

            let Some(reason) = FailureReason::from_adapter_error(&err) else {
                return Err(LlmError::InvalidRequest { provider, message: err.message });
            };

            info!(
                "{} key #{} failed ({}), rotating: {}",
                provider, credential.index(), err.kind, err.message
            );
            route.pool.mark_failure(&credential, reason).await;

            #[cfg(feature = "metrics")]
            crate::metrics::record_rotation(provider, &reason);

            last_error = err;
        }

        Err(LlmError::RetriesExhausted {
            provider,
            attempts: self.max_attempts,
            last: last_error,
        })
    }

    /// Convenience entry point taking the provider by name
    ///
    /// # Parameters
    /// * `prompt` - Text sent to the model
    /// * `provider` - Provider name, e.g. `"mistral"`
    /// * `model` - Model identifier, or `None` for the provider default
    /// * `temperature` / `top_p` - Optional sampling parameters
    pub async fn generate(
        &self,
        prompt: &str,
        provider: &str,
        model: Option<&str>,
        temperature: Option<f32>,
        top_p: Option<f32>,
    ) -> LlmResult<LlmResponse> {
        if provider.trim().is_empty() {
            return Err(LlmError::ValidationError("provider is required".to_string()));
        }
        let provider: ProviderType = provider.parse()?;

        let mut request = LlmRequest::new(provider, prompt);
        request.model = model.map(str::to_string);
        request.temperature = temperature;
        request.top_p = top_p;
        self.request(request).await
    }

    /// Run many requests concurrently; results keep the input order
    pub async fn request_batch(&self, requests: Vec<LlmRequest>) -> Vec<LlmResult<LlmResponse>> {
        debug!("Dispatching batch of {} request(s)", requests.len());
        join_all(requests.into_iter().map(|request| self.request(request))).await
    }

    /// Replace the keys for a provider without rebuilding the manager
    pub async fn reload_credentials(&self, provider: ProviderType, keys: Vec<String>) -> LlmResult<()> {
        let route = self
            .routes
            .get(&provider)
            .ok_or_else(|| LlmError::UnknownProvider(provider.to_string()))?;
        route.pool.rebuild(keys).await;
        Ok(())
    }

    /// Upper bound on adapter calls per request
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn rate_gate(&self, provider: ProviderType) -> Option<&Arc<RateGate>> {
        self.routes.get(&provider).map(|route| &route.gate)
    }

    /// Configured providers
    pub fn providers(&self) -> Vec<ProviderType> {
        ProviderType::ALL
            .into_iter()
            .filter(|p| self.routes.contains_key(p))
            .collect()
    }

    pub fn get_provider_count(&self) -> usize {
        self.routes.len()
    }

    pub fn key_pool(&self, provider: ProviderType) -> Option<&Arc<KeyPool>> {
        self.routes.get(&provider).map(|route| &route.pool)
    }

    /// Per-key statistics for a provider, `None` if it is not configured
    pub async fn credential_stats(&self, provider: ProviderType) -> Option<Vec<CredentialStats>> {
        match self.routes.get(&provider) {
            Some(route) => Some(route.pool.stats().await),
            None => None,
        }
    }
}
