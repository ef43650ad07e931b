//! Configuration from environment variables.
//!
//! Keys are read per provider as `PREFIX1`, `PREFIX2`, ... until the first gap. If
//! no numbered key exists the bare `PREFIX` is used. `LLM_RATE_LIMIT` holds the
//! pacing interval in (fractional) seconds.

use std::env;

use log::debug;

use crate::constants;
use crate::errors::{LlmError, LlmResult};
use crate::providers::ProviderType;
use super::loader::validate_config;
use super::types::{Config, ProviderConfig, Settings};

/// Environment prefix holding a provider's keys
pub fn env_prefix(provider: ProviderType) -> &'static str {
    match provider {
        ProviderType::Mistral => constants::ENV_MISTRAL_KEY,
        ProviderType::OpenRouter => constants::ENV_OPENROUTER_KEY,
        ProviderType::HuggingFace => constants::ENV_HUGGINGFACE_KEY,
        ProviderType::Gemini => constants::ENV_GEMINI_KEY,
    }
}

/// Build a configuration from the process environment.
///
/// Every provider is included, with however many keys were found (possibly none).
pub fn config_from_env() -> LlmResult<Config> {
    config_from_lookup(|name| env::var(name).ok())
}

/// Build a configuration from an arbitrary variable lookup.
pub fn config_from_lookup<F>(lookup: F) -> LlmResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();
    if let Some(raw) = lookup(constants::ENV_RATE_LIMIT) {
        settings.min_interval_ms = parse_rate_limit(&raw)?;
    }

    let providers = ProviderType::ALL
        .into_iter()
        .map(|provider| {
            let keys = keys_from_lookup(env_prefix(provider), &lookup);
            debug!("Found {} key(s) for {} in the environment", keys.len(), provider);
            ProviderConfig::new(provider.as_str(), keys)
        })
        .collect();

    let config = Config { settings, providers };
    validate_config(&config)?;
    Ok(config)
}

/// Collect `PREFIX1..PREFIXn`, falling back to `PREFIX`
pub fn keys_from_lookup<F>(prefix: &str, lookup: &F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut keys = Vec::new();
    let mut index = 1;
    while let Some(key) = lookup(&format!("{}{}", prefix, index)) {
        keys.push(key);
        index += 1;
    }

    if keys.is_empty() {
        if let Some(key) = lookup(prefix) {
            keys.push(key);
        }
    }

    keys.retain(|k| !k.trim().is_empty());
    keys
}

fn parse_rate_limit(raw: &str) -> LlmResult<u64> {
    let seconds: f64 = raw.trim().parse().map_err(|_| {
        LlmError::ConfigError(format!(
            "{} must be a number of seconds, got '{}'",
            constants::ENV_RATE_LIMIT, raw
        ))
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(LlmError::ConfigError(format!(
            "{} must be a non-negative number of seconds, got '{}'",
            constants::ENV_RATE_LIMIT, raw
        )));
    }
    Ok((seconds * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_numbered_keys_stop_at_gap() {
        let lookup = lookup_from(&[("MISTRAL_KEY1", "a"), ("MISTRAL_KEY2", "b"), ("MISTRAL_KEY4", "d")]);
        assert_eq!(keys_from_lookup("MISTRAL_KEY", &lookup), vec!["a", "b"]);
    }

    #[test]
    fn test_bare_key_fallback() {
        let lookup = lookup_from(&[("HF_KEY", "solo")]);
        assert_eq!(keys_from_lookup("HF_KEY", &lookup), vec!["solo"]);
    }

    #[test]
    fn test_bare_key_ignored_when_numbered_exist() {
        let lookup = lookup_from(&[("HF_KEY", "solo"), ("HF_KEY1", "first")]);
        assert_eq!(keys_from_lookup("HF_KEY", &lookup), vec!["first"]);
    }

    #[test]
    fn test_config_registers_every_provider() {
        let lookup = lookup_from(&[("GEMINI_API_KEY1", "g1"), ("LLM_RATE_LIMIT", "1.5")]);
        let config = config_from_lookup(lookup).unwrap();

        assert_eq!(config.settings.min_interval_ms, 1500);
        assert_eq!(config.providers.len(), 4);
        let gemini = config.providers.iter().find(|p| p.provider_type == "gemini").unwrap();
        assert_eq!(gemini.api_keys, vec!["g1"]);
        let mistral = config.providers.iter().find(|p| p.provider_type == "mistral").unwrap();
        assert!(mistral.api_keys.is_empty());
    }

    #[test]
    fn test_default_rate_limit() {
        let config = config_from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.settings.min_interval_ms, constants::DEFAULT_MIN_INTERVAL_MS);
    }

    #[test]
    fn test_bad_rate_limit() {
        assert!(config_from_lookup(lookup_from(&[("LLM_RATE_LIMIT", "fast")])).is_err());
        assert!(config_from_lookup(lookup_from(&[("LLM_RATE_LIMIT", "-1")])).is_err());
    }
}
