//! TOML loading with `${VAR}` substitution.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use regex::{Captures, Regex};
use url::Url;

use crate::dispatch::PacingScope;
use crate::errors::{LlmError, LlmResult};
use crate::providers::ProviderType;
use super::types::Config;

/// Read, substitute and validate a configuration file.
///
/// # Example
/// ```no_run
/// use keyrelay::config::load_config;
///
/// let config = load_config("keyrelay.toml").unwrap();
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> LlmResult<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        LlmError::ConfigError(format!("Failed to read config file '{}': {}", path.display(), e))
    })?;
    parse_config(&content)
}

/// Same as [`load_config`] for configuration already in memory.
pub fn parse_config(content: &str) -> LlmResult<Config> {
    let mut config: Config = toml::from_str(content)
        .map_err(|e| LlmError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

    substitute_env(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

fn env_var_pattern() -> LlmResult<Regex> {
    Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| LlmError::ConfigError(format!("Invalid environment pattern: {}", e)))
}

/// Expand `${VAR}` in keys, endpoints and default models
fn substitute_env(config: &mut Config) -> LlmResult<()> {
    let pattern = env_var_pattern()?;

    for (idx, provider) in config.providers.iter_mut().enumerate() {
        for (key_idx, key) in provider.api_keys.iter_mut().enumerate() {
            expand(key, &pattern, || format!("providers[{}].api_keys[{}]", idx, key_idx))?;
        }
        if let Some(endpoint) = provider.endpoint.as_mut() {
            expand(endpoint, &pattern, || format!("providers[{}].endpoint", idx))?;
        }
        if let Some(model) = provider.default_model.as_mut() {
            expand(model, &pattern, || format!("providers[{}].default_model", idx))?;
        }
    }

    Ok(())
}

fn expand(value: &mut String, pattern: &Regex, location: impl Fn() -> String) -> LlmResult<()> {
    let mut missing = None;
    let expanded = pattern.replace_all(value, |caps: &Captures| {
        let name = &caps[1];
        env::var(name).unwrap_or_else(|_| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });

    if let Some(name) = missing {
        return Err(LlmError::ConfigError(format!(
            "Environment variable '{}' is not set\n  \
             → Referenced in {}\n  \
             → Export it before starting: export {}=...",
            name,
            location(),
            name
        )));
    }

    let expanded = expanded.into_owned();
    *value = expanded;
    Ok(())
}

/// Validate the configuration for consistency.
pub fn validate_config(config: &Config) -> LlmResult<()> {
    let valid_providers: Vec<&str> = ProviderType::ALL.iter().map(|p| p.as_str()).collect();
    let mut seen = HashSet::new();

    for (idx, provider) in config.providers.iter().enumerate() {
        let provider_type: ProviderType = provider.provider_type.parse().map_err(|_| {
            LlmError::ConfigError(format!(
                "Unknown provider type '{}' in providers[{}]\n  \
                 → Valid types: {}",
                provider.provider_type,
                idx,
                valid_providers.join(", ")
            ))
        })?;

        if !seen.insert(provider_type) {
            return Err(LlmError::ConfigError(format!(
                "Provider '{}' is configured more than once\n  \
                 → List all of its keys in a single [[providers]] entry",
                provider_type
            )));
        }

        if let Some(endpoint) = &provider.endpoint {
            let parsed = Url::parse(endpoint).map_err(|e| {
                LlmError::ConfigError(format!(
                    "Invalid endpoint '{}' in providers[{}]: {}",
                    endpoint, idx, e
                ))
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(LlmError::ConfigError(format!(
                    "Endpoint '{}' in providers[{}] must use http or https",
                    endpoint, idx
                )));
            }
        }

        if provider.api_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(LlmError::ConfigError(format!(
                "Empty API key in providers[{}] ({})",
                idx, provider_type
            )));
        }
    }

    if PacingScope::parse(&config.settings.pacing).is_none() {
        return Err(LlmError::ConfigError(format!(
            "Unknown pacing scope '{}'\n  \
             → Valid scopes: global, per_provider",
            config.settings.pacing
        )));
    }

    if config.settings.max_attempts == 0 {
        return Err(LlmError::ConfigError(
            "settings.max_attempts must be at least 1".to_string(),
        ));
    }

    Ok(())
}
