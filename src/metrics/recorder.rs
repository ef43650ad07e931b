//! Metric recording functions

use std::time::Duration;

use crate::dispatch::FailureReason;
use crate::errors::LlmError;
use crate::ProviderType;

use super::{labels, names};

/// Record a successful request
pub fn record_request_success(provider: ProviderType, attempts: usize, duration: Duration) {
    let provider = labels::provider_label(provider);

    metrics::counter!(
        names::REQUESTS_TOTAL,
        labels::keys::PROVIDER => provider,
        labels::keys::OUTCOME => "success"
    )
    .increment(1);

    metrics::histogram!(
        names::REQUEST_DURATION,
        labels::keys::PROVIDER => provider
    )
    .record(duration.as_secs_f64());

    metrics::histogram!(
        names::ATTEMPTS,
        labels::keys::PROVIDER => provider
    )
    .record(attempts as f64);
}

/// Record a request that ended in a terminal error
pub fn record_request_failure(provider: ProviderType, error: &LlmError, duration: Duration) {
    let provider = labels::provider_label(provider);

    // Failures still count as requests
    metrics::counter!(
        names::REQUESTS_TOTAL,
        labels::keys::PROVIDER => provider,
        labels::keys::OUTCOME => "failure"
    )
    .increment(1);

    metrics::histogram!(
        names::REQUEST_DURATION,
        labels::keys::PROVIDER => provider
    )
    .record(duration.as_secs_f64());

    metrics::counter!(
        names::ERRORS_TOTAL,
        labels::keys::PROVIDER => provider,
        labels::keys::ERROR_KIND => labels::error_kind_label(error)
    )
    .increment(1);
}

/// Record a key rotation after a failed call
pub fn record_rotation(provider: ProviderType, reason: &FailureReason) {
    let provider = labels::provider_label(provider);

    metrics::counter!(
        names::ROTATIONS_TOTAL,
        labels::keys::PROVIDER => provider,
        labels::keys::REASON => labels::failure_reason_label(reason)
    )
    .increment(1);

    if matches!(reason, FailureReason::RateLimited { .. }) {
        metrics::counter!(
            names::RATE_LIMITS_TOTAL,
            labels::keys::PROVIDER => provider
        )
        .increment(1);
    }
}

/// Record a key leaving rotation for good
pub fn record_credential_exhausted(provider: ProviderType) {
    metrics::counter!(
        names::CREDENTIALS_EXHAUSTED_TOTAL,
        labels::keys::PROVIDER => labels::provider_label(provider)
    )
    .increment(1);
}
