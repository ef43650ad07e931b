//! Metrics module for KeyRelay
//!
//! This module provides optional metrics emission for monitoring dispatch.
//! Enable with the `metrics` feature flag; install any `metrics` exporter to collect them.

pub mod labels;
mod recorder;

pub use recorder::*;

/// Metric name constants
pub mod names {
    /// Total number of dispatched requests
    pub const REQUESTS_TOTAL: &str = "keyrelay_requests_total";
    /// Request duration in seconds, pacing included
    pub const REQUEST_DURATION: &str = "keyrelay_request_duration_seconds";
    /// Adapter calls needed per successful request
    pub const ATTEMPTS: &str = "keyrelay_attempts_per_request";
    /// Total number of terminal errors by kind
    pub const ERRORS_TOTAL: &str = "keyrelay_errors_total";
    /// Total number of key rotations by reason
    pub const ROTATIONS_TOTAL: &str = "keyrelay_rotations_total";
    /// Total number of rate limit responses
    pub const RATE_LIMITS_TOTAL: &str = "keyrelay_rate_limits_total";
    /// Total number of keys retired from rotation
    pub const CREDENTIALS_EXHAUSTED_TOTAL: &str = "keyrelay_credentials_exhausted_total";
}

/// Describe all metrics with their units and descriptions.
/// Call this after setting up your metrics exporter for better discovery.
pub fn describe_metrics() {
    use metrics::{describe_counter, describe_histogram, Unit};

    describe_counter!(
        names::REQUESTS_TOTAL,
        Unit::Count,
        "Total number of dispatched requests"
    );
    describe_histogram!(
        names::REQUEST_DURATION,
        Unit::Seconds,
        "Request duration in seconds"
    );
    describe_histogram!(
        names::ATTEMPTS,
        Unit::Count,
        "Adapter calls needed per successful request"
    );
    describe_counter!(
        names::ERRORS_TOTAL,
        Unit::Count,
        "Total number of terminal errors by kind"
    );
    describe_counter!(
        names::ROTATIONS_TOTAL,
        Unit::Count,
        "Total number of key rotations by reason"
    );
    describe_counter!(
        names::RATE_LIMITS_TOTAL,
        Unit::Count,
        "Total number of rate limit responses"
    );
    describe_counter!(
        names::CREDENTIALS_EXHAUSTED_TOTAL,
        Unit::Count,
        "Total number of keys retired from rotation"
    );
}
