//! Configuration module for the DispatchManager.
//!
//! Configuration comes either from a TOML file or from the process environment.
//!
//! # Example Configuration File
//!
//! ```toml
//! [settings]
//! min_interval_ms = 500
//! max_attempts = 3
//! pacing = "per_provider"
//!
//! [[providers]]
//! type = "mistral"
//! api_keys = ["${MISTRAL_KEY1}", "${MISTRAL_KEY2}"]
//! cooldown_secs = 30
//!
//! [[providers]]
//! type = "gemini"
//! api_keys = ["${GEMINI_API_KEY}"]
//! default_model = "gemini-1.5-pro"
//! ```
//!
//! # Environment Variables
//!
//! Values can reference environment variables using the `${VAR_NAME}` syntax. These
//! are resolved at load time. Without a file, [`config_from_env`] reads numbered keys
//! such as `MISTRAL_KEY1`, `MISTRAL_KEY2`, ...

mod types;
mod loader;
mod env;

pub use types::{Config, Settings, ProviderConfig};
pub use loader::{load_config, parse_config, validate_config};
pub use env::{config_from_env, config_from_lookup, env_prefix, keys_from_lookup};
