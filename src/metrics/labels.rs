//! Label helpers for consistent metric labeling

use crate::dispatch::FailureReason;
use crate::errors::LlmError;
use crate::ProviderType;

/// Standard label keys
pub mod keys {
    /// Provider name label key
    pub const PROVIDER: &str = "provider";
    /// Outcome label key
    pub const OUTCOME: &str = "outcome";
    /// Error kind label key
    pub const ERROR_KIND: &str = "error_kind";
    /// Rotation reason label key
    pub const REASON: &str = "reason";
}

/// Convert ProviderType to label value string
pub fn provider_label(provider: ProviderType) -> &'static str {
    provider.as_str()
}

/// Convert LlmError to error kind label string
pub fn error_kind_label(error: &LlmError) -> &'static str {
    match error {
        LlmError::ValidationError(_) => "validation",
        LlmError::UnknownProvider(_) => "unknown_provider",
        LlmError::InvalidRequest { .. } => "invalid",
        LlmError::NoUsableCredential(_) => "no_usable_credential",
        LlmError::RetriesExhausted { .. } => "retries_exhausted",
        LlmError::ConfigError(_) => "config_error",
    }
}

/// Convert FailureReason to rotation reason label string
pub fn failure_reason_label(reason: &FailureReason) -> &'static str {
    match reason {
        FailureReason::RateLimited { .. } => "rate_limited",
        FailureReason::AuthFailed => "auth_failed",
        FailureReason::Transient => "transient",
    }
}
