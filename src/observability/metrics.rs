//! Metrics collection.
//!
//! # Metrics
//! - `xregion_cache_lookups_total` (counter): cache lookups by cache name and outcome
//! - `xregion_requests_total` (counter): dispatched requests by method and outcome
//! - `xregion_request_duration_seconds` (histogram): dispatch latency, resolution included
//! - `xregion_origin_resolutions_total` (counter): origin resolutions by activity status
//!
//! Updates go through the `metrics` facade; without an installed recorder they are no-ops.

use std::time::Instant;

/// Outcome of a single cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Live entry returned without calling the producer.
    Hit,
    /// No entry; this caller became the producer.
    Miss,
    /// Entry present but expired; this caller became the producer.
    Expired,
    /// Another caller is producing; this caller awaits the same result.
    Joined,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Expired => "expired",
            CacheOutcome::Joined => "joined",
        }
    }
}

pub fn record_cache_lookup(cache: &'static str, outcome: CacheOutcome) {
    metrics::counter!(
        "xregion_cache_lookups_total",
        "cache" => cache,
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// 2xx response.
    Success,
    /// Any other response status.
    Failure,
    /// The transport call itself failed.
    TransportError,
    /// The regional origin could not be resolved; nothing was sent.
    ResolutionError,
    /// The JSON body could not be serialized; nothing was sent.
    InvalidBody,
}

impl RequestOutcome {
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            RequestOutcome::Success
        } else {
            RequestOutcome::Failure
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOutcome::Success => "success",
            RequestOutcome::Failure => "failure",
            RequestOutcome::TransportError => "transport_error",
            RequestOutcome::ResolutionError => "resolution_error",
            RequestOutcome::InvalidBody => "invalid_body",
        }
    }
}

/// Record a finished dispatch, including ones that never reached the transport.
pub fn record_request(method: &str, outcome: RequestOutcome, start: Instant) {
    metrics::counter!(
        "xregion_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    metrics::histogram!(
        "xregion_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_origin_resolution(status: &'static str, cross_region: bool) {
    metrics::counter!(
        "xregion_origin_resolutions_total",
        "status" => status,
        "cross_region" => if cross_region { "true" } else { "false" }
    )
    .increment(1);
}
