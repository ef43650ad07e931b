use crate::config::Config;
use crate::constants;
use crate::dispatch::key_pool::KeyPool;
use crate::dispatch::manager::{DispatchManager, ProviderRoute};
use crate::dispatch::rate_gate::{PacingScope, RateGate};
use crate::errors::{LlmError, LlmResult};
use crate::providers::{create_adapter, ProviderAdapter, ProviderType};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Internal helper struct for Builder
struct ProviderSetup {
    provider: ProviderType,
    keys: Vec<String>,
    endpoint: Option<String>,
    default_model: Option<String>,
    cooldown: Duration,
    exhaust_after: u32,
    adapter: Option<Arc<dyn ProviderAdapter>>,
}

/// DispatchManager Builder
pub struct DispatchManagerBuilder {
    providers_to_build: Vec<ProviderSetup>,
    min_interval: Duration,
    pacing: PacingScope,
    max_attempts: usize,
    request_timeout: Duration,
    misuse: Option<String>,
}

impl Default for DispatchManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchManagerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        DispatchManagerBuilder {
            providers_to_build: Vec::new(),
            min_interval: Duration::from_millis(constants::DEFAULT_MIN_INTERVAL_MS),
            pacing: PacingScope::Global,
            max_attempts: constants::DEFAULT_MAX_ATTEMPTS,
            request_timeout: Duration::from_secs(constants::DEFAULT_REQUEST_TIMEOUT_SECS),
            misuse: None,
        }
    }

    /// Builder pre-filled from a parsed configuration
    pub fn from_config(config: &Config) -> LlmResult<Self> {
        let settings = &config.settings;
        let pacing = PacingScope::parse(&settings.pacing).ok_or_else(|| {
            LlmError::ConfigError(format!("Unknown pacing scope '{}'", settings.pacing))
        })?;

        let mut builder = Self::new()
            .min_interval(Duration::from_millis(settings.min_interval_ms))
            .pacing(pacing)
            .max_attempts(settings.max_attempts)
            .request_timeout(Duration::from_secs(settings.request_timeout_secs));

        for provider_config in config.providers.iter().filter(|p| p.enabled) {
            let provider: ProviderType = provider_config.provider_type.parse()?;
            builder = builder
                .add_provider(provider)
                .keys(provider_config.api_keys.iter().cloned())
                .cooldown(Duration::from_secs(provider_config.cooldown_secs))
                .exhaust_after(provider_config.exhaust_after);
            if let Some(endpoint) = &provider_config.endpoint {
                builder = builder.endpoint(endpoint.clone());
            }
            if let Some(model) = &provider_config.default_model {
                builder = builder.default_model(model.clone());
            }
        }

        Ok(builder)
    }

    /// Sets the minimum interval between dispatch starts; zero disables pacing.
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Chooses one gate for every provider or one gate per provider.
    pub fn pacing(mut self, scope: PacingScope) -> Self {
        self.pacing = scope;
        self
    }

    /// Sets the maximum number of adapter calls per request (at least 1).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the timeout applied to every individual adapter call.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Begins configuring a provider.
    /// Subsequent calls like `.key()`, `.endpoint()`, `.adapter()` apply to this provider.
    pub fn add_provider(mut self, provider: ProviderType) -> Self {
        self.providers_to_build.push(ProviderSetup {
            provider,
            keys: Vec::new(),
            endpoint: None,
            default_model: None,
            cooldown: Duration::from_secs(constants::DEFAULT_COOLDOWN_SECS),
            exhaust_after: constants::DEFAULT_EXHAUST_AFTER,
            adapter: None,
        });
        self
    }

    /// Adds one API key to the *last added* provider.
    pub fn key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.with_last("key", |setup| setup.keys.push(key))
    }

    /// Adds several API keys to the *last added* provider, in rotation order.
    pub fn keys<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.with_last("keys", |setup| setup.keys.extend(keys))
    }

    /// Sets a custom endpoint for the *last added* provider.
    pub fn endpoint(self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.with_last("endpoint", |setup| setup.endpoint = Some(endpoint))
    }

    /// Sets the default model for the *last added* provider.
    pub fn default_model(self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.with_last("default_model", |setup| setup.default_model = Some(model))
    }

    /// Sets how long a rate-limited key of the *last added* provider rests.
    pub fn cooldown(self, cooldown: Duration) -> Self {
        self.with_last("cooldown", |setup| setup.cooldown = cooldown)
    }

    /// Sets how many consecutive failures retire a key of the *last added* provider.
    /// Zero keeps keys in rotation no matter how often they fail.
    pub fn exhaust_after(self, failures: u32) -> Self {
        self.with_last("exhaust_after", |setup| setup.exhaust_after = failures)
    }

    /// Replaces the built-in adapter of the *last added* provider.
    pub fn adapter(self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.with_last("adapter", |setup| setup.adapter = Some(adapter))
    }

    fn with_last(mut self, method: &str, apply: impl FnOnce(&mut ProviderSetup)) -> Self {
        match self.providers_to_build.last_mut() {
            Some(setup) => apply(setup),
            None => {
                if self.misuse.is_none() {
                    self.misuse = Some(format!("'.{}()' called before '.add_provider()'", method));
                }
            }
        }
        self
    }

    /// Consumes the builder and constructs the `DispatchManager`.
    /// Returns an error on builder misuse or when a provider is added twice.
    pub fn build(self) -> LlmResult<DispatchManager> {
        if let Some(misuse) = self.misuse {
            return Err(LlmError::ConfigError(format!("Build failed: {}", misuse)));
        }

        let global_gate = Arc::new(RateGate::new(self.min_interval));
        let mut routes = HashMap::new();

        for setup in self.providers_to_build {
            if routes.contains_key(&setup.provider) {
                return Err(LlmError::ConfigError(format!(
                    "Build failed: provider '{}' configured more than once",
                    setup.provider
                )));
            }

            let adapter = match setup.adapter {
                Some(adapter) => adapter,
                None => create_adapter(setup.provider, setup.endpoint, setup.default_model, self.request_timeout)?,
            };

            if setup.keys.is_empty() {
                warn!("Provider {} configured without any API key.", setup.provider);
            }

            let gate = match self.pacing {
                PacingScope::Global => global_gate.clone(),
                PacingScope::PerProvider => Arc::new(RateGate::new(self.min_interval)),
            };

            debug!("Built provider {} with {} key(s)", setup.provider, setup.keys.len());
            let pool = Arc::new(KeyPool::new(setup.provider, setup.keys, setup.cooldown, setup.exhaust_after));
            routes.insert(setup.provider, ProviderRoute { adapter, pool, gate });
        }

        if routes.is_empty() {
            warn!("DispatchManager built with no providers.");
        }

        Ok(DispatchManager {
            routes,
            max_attempts: self.max_attempts,
            request_timeout: self.request_timeout,
        })
    }
}
