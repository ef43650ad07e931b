use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::providers::ProviderType;

/// How an adapter failure should be handled by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterErrorKind {
    /// The key hit a rate limit; rotate and retry
    RateLimited,
    /// The key was rejected; retire it and retry with another
    AuthFailed,
    /// Network failure, timeout or upstream hiccup; retry
    Transient,
    /// The provider rejected the request itself; never retried
    Invalid,
}

impl fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterErrorKind::RateLimited => write!(f, "rate limited"),
            AdapterErrorKind::AuthFailed => write!(f, "authentication failed"),
            AdapterErrorKind::Transient => write!(f, "transient failure"),
            AdapterErrorKind::Invalid => write!(f, "invalid request"),
        }
    }
}

/// Error returned by a single provider call
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub message: String,
    /// Cooldown hint supplied by the provider (e.g. a `Retry-After` header)
    pub retry_after: Option<Duration>,
}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), retry_after: None }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::RateLimited, message)
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::AuthFailed, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Transient, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Invalid, message)
    }

    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Whether another attempt (possibly with another key) can succeed
    pub fn is_retryable(&self) -> bool {
        self.kind != AdapterErrorKind::Invalid
    }

    /// Classify a non-success API response
    ///
    /// The status code decides first; for codes that providers overload (mostly 400)
    /// the body is searched for rate limit and credential wording.
    pub fn from_api_response(status: reqwest::StatusCode, error_message: String) -> Self {
        let msg_lower = error_message.to_lowercase();

        match status.as_u16() {
            429 => AdapterError::rate_limited(error_message),
            401 | 403 => AdapterError::auth_failed(error_message),
            408 | 500..=599 => {
                if mentions_rate_limit(&msg_lower) {
                    AdapterError::rate_limited(error_message)
                } else {
                    AdapterError::transient(error_message)
                }
            }
            _ if mentions_rate_limit(&msg_lower) => AdapterError::rate_limited(error_message),
            _ if mentions_bad_credential(&msg_lower) => AdapterError::auth_failed(error_message),
            _ => AdapterError::invalid(error_message),
        }
    }
}

fn mentions_rate_limit(msg_lower: &str) -> bool {
    msg_lower.contains("rate limit")
        || msg_lower.contains("rate_limit")
        || msg_lower.contains("too many requests")
        || msg_lower.contains("quota exceeded")
        || msg_lower.contains("resource_exhausted")
        || msg_lower.contains("throttl")
}

fn mentions_bad_credential(msg_lower: &str) -> bool {
    msg_lower.contains("api key not valid")
        || msg_lower.contains("api_key_invalid")
        || msg_lower.contains("invalid api key")
        || msg_lower.contains("unauthorized")
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error for AdapterError {}

/// Convert reqwest errors to AdapterError
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return AdapterError::invalid(format!("Failed to build request: {}", err));
        }
        if let Some(status) = err.status() {
            return AdapterError::from_api_response(status, err.to_string());
        }
        if err.is_timeout() {
            return AdapterError::transient(format!("Request timed out: {}", err));
        }
        AdapterError::transient(format!("Request error: {}", err))
    }
}

/// Terminal error types returned by the dispatcher
#[derive(Debug)]
pub enum LlmError {
    /// Missing or malformed input
    ValidationError(String),
    /// Provider name is not known or not configured
    UnknownProvider(String),
    /// The provider rejected the request; retrying cannot fix it
    InvalidRequest {
        provider: ProviderType,
        message: String,
    },
    /// Every key for the provider is cooling down or exhausted
    NoUsableCredential(ProviderType),
    /// The attempt budget ran out; `last` is the final adapter error
    RetriesExhausted {
        provider: ProviderType,
        attempts: usize,
        last: AdapterError,
    },
    /// Configuration error
    ConfigError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            LlmError::UnknownProvider(name) => write!(f, "Unknown provider: '{}'", name),
            LlmError::InvalidRequest { provider, message } => {
                write!(f, "Invalid request to {}: {}", provider, message)
            }
            LlmError::NoUsableCredential(provider) => {
                write!(f, "No usable API key available for {}", provider)
            }
            LlmError::RetriesExhausted { provider, attempts, last } => write!(
                f,
                "Request to {} failed after {} attempt(s), last error: {}",
                provider, attempts, last
            ),
            LlmError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for LlmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LlmError::RetriesExhausted { last, .. } => Some(last),
            _ => None,
        }
    }
}

impl LlmError {
    /// HTTP status the front door reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            LlmError::ValidationError(_) | LlmError::UnknownProvider(_) => 400,
            LlmError::InvalidRequest { .. } => 422,
            LlmError::RetriesExhausted { .. } => 502,
            LlmError::NoUsableCredential(_) => 503,
            LlmError::ConfigError(_) => 500,
        }
    }
}

/// Convert serde_json errors to LlmError
impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::ValidationError(format!("Malformed JSON: {}", err))
    }
}

/// Convert std::io::Error to LlmError
impl From<std::io::Error> for LlmError {
    fn from(err: std::io::Error) -> Self {
        LlmError::ConfigError(err.to_string())
    }
}

/// Convert toml parsing errors to LlmError
impl From<toml::de::Error> for LlmError {
    fn from(err: toml::de::Error) -> Self {
        LlmError::ConfigError(err.to_string())
    }
}

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
