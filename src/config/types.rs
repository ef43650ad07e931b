//! Configuration types for TOML-based configuration.
//!
//! These types map directly to the TOML configuration file structure.

use serde::Deserialize;

use crate::constants;

/// Root configuration structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Global settings for the DispatchManager.
    #[serde(default)]
    pub settings: Settings,

    /// Provider configurations, one per provider type.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// Global settings for the DispatchManager.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Minimum milliseconds between dispatch starts; 0 disables pacing.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Maximum adapter calls per request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Timeout for one adapter call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pacing scope: "global" or "per_provider".
    #[serde(default = "default_pacing")]
    pub pacing: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_attempts: default_max_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
            pacing: default_pacing(),
        }
    }
}

fn default_min_interval_ms() -> u64 {
    constants::DEFAULT_MIN_INTERVAL_MS
}

fn default_max_attempts() -> usize {
    constants::DEFAULT_MAX_ATTEMPTS
}

fn default_request_timeout_secs() -> u64 {
    constants::DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_pacing() -> String {
    "global".to_string()
}

/// Provider configuration.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "mistral", "openrouter", "huggingface" or "gemini".
    #[serde(rename = "type")]
    pub provider_type: String,

    /// API keys in rotation order (each supports "${VAR_NAME}").
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Seconds a rate-limited key rests when the provider gives no hint.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Consecutive failures that retire a key (0 = never).
    #[serde(default = "default_exhaust_after")]
    pub exhaust_after: u32,

    /// Custom endpoint URL.
    pub endpoint: Option<String>,

    /// Model used when a request names none.
    pub default_model: Option<String>,

    /// Whether this provider is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderConfig {
    /// Configuration with defaults for everything but the keys
    pub fn new(provider_type: impl Into<String>, api_keys: Vec<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            api_keys,
            cooldown_secs: default_cooldown_secs(),
            exhaust_after: default_exhaust_after(),
            endpoint: None,
            default_model: None,
            enabled: true,
        }
    }
}

fn default_cooldown_secs() -> u64 {
    constants::DEFAULT_COOLDOWN_SECS
}

fn default_exhaust_after() -> u32 {
    constants::DEFAULT_EXHAUST_AFTER
}

fn default_true() -> bool {
    true
}
