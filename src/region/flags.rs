//! Feature flag lookup.

use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;

use crate::http::error::HttpResult;
use crate::http::request::query_string;
use crate::http::transport::{fetch_json, Transport};

/// A remotely configured flag value; any JSON.
pub type FlagValue = Value;

/// Fetches `GET {base}/{name}?{params}` and extracts its `value` field.
#[derive(Clone)]
pub struct FeatureFlagFetcher {
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
    base_path: String,
}

impl FeatureFlagFetcher {
    pub fn new(transport: Arc<dyn Transport>, headers: HeaderMap, base_path: &str) -> Self {
        Self {
            transport,
            headers,
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for<K, V>(&self, name: &str, params: &[(K, V)]) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        format!("{}/{}{}", self.base_path, name, query_string(params))
    }

    /// `Ok(None)` when the body has no `value` (or it is `null`); callers
    /// treat that as "flag not set" rather than a failure.
    // TODO: surface a missing `value` as its own error once the flag service
    // guarantees the field; every caller currently relies on the lenient read.
    pub async fn fetch<K, V>(
        &self,
        name: &str,
        params: &[(K, V)],
    ) -> HttpResult<Option<FlagValue>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = fetch_json(
            self.transport.as_ref(),
            self.url_for(name, params),
            self.headers.clone(),
        )
        .await?;

        let value = body
            .and_then(|mut body| body.get_mut("value").map(Value::take))
            .filter(|value| !value.is_null());

        if value.is_none() {
            tracing::debug!(flag = name, "feature flag has no value");
        }
        Ok(value)
    }
}

/// Interpret a flag value as an origin URL; falsy values mean same-origin.
pub fn flag_as_origin(value: Option<FlagValue>) -> String {
    match value {
        Some(Value::String(origin)) => origin,
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(other) => {
            tracing::warn!(value = %other, "flag value is not a string, using same origin");
            String::new()
        }
    }
}
