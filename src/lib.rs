//! KeyRelay is a Rust library that puts one request interface in front of several
//! remote Large Language Model providers.
//!
//! Each provider keeps a pool of API keys. Requests rotate through the pool, keys that
//! hit rate limits cool down, keys that fail authentication are retired, and a rate
//! gate spaces out outbound calls so a single key is not hammered.
//!
//! # Features
//!
//! - **Multi-provider support**: Mistral, OpenRouter, Hugging Face and Gemini behind
//!   one `{provider, response}` result shape
//! - **Key rotation**: round-robin over every configured key, skipping cooled-down and
//!   exhausted ones
//! - **Request pacing**: a minimum interval between call starts, global or per provider
//! - **Bounded retries**: rate-limited, transient and auth failures move on to the next
//!   key, up to a configurable number of attempts
//! - **HTTP front door**: optional `POST /generate` endpoint (feature `server`)
//! - **Metrics**: optional counters and histograms (feature `metrics`)
//!
//! # Example
//!
//! ```no_run
//! use keyrelay::{DispatchManager, LlmRequest, ProviderType};
//!
//! async fn example() {
//!     let manager = DispatchManager::builder()
//!         .add_provider(ProviderType::Mistral)
//!         .keys(["first-key", "second-key"])
//!         .build()
//!         .expect("Failed to build manager");
//!
//!     let request = LlmRequest::new(ProviderType::Mistral, "Explain Rust in one paragraph")
//!         .model("mistral-small-latest")
//!         .temperature(0.7);
//!
//!     let response = manager.request(request).await.expect("request failed");
//!     println!("{}: {}", response.provider, response.response);
//! }
//! ```

pub mod providers;
pub mod errors;
pub mod constants;
pub mod dispatch;
pub mod config;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "server")]
pub mod server;

pub use providers::{
    ProviderType,
    LlmRequest,
    LlmResponse,
    ProviderAdapter,
    create_adapter,
    MistralAdapter,
    OpenRouterAdapter,
    HuggingFaceAdapter,
    GeminiAdapter,
};

pub use errors::{AdapterError, AdapterErrorKind, LlmError, LlmResult};

pub use dispatch::{
    Credential,
    CredentialState,
    CredentialStats,
    DispatchManager,
    DispatchManagerBuilder,
    FailureReason,
    KeyPool,
    PacingScope,
    RateGate,
};

#[cfg(feature = "metrics")]
pub use metrics::describe_metrics;

/// Initialize the logging system
///
/// This should be called at the start of your application in case
/// you want to activate the library's debug and info logging.
pub fn use_logging() {
    env_logger::init();
}
