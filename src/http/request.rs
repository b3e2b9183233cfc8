//! Per-call request options and query serialization.
//!
//! # Responsibilities
//! - Describe a call: method, ordered query, optional JSON body, headers
//! - Carry the cross-region target (domain + activity status) when set
//! - Carry the credential and CORS modes handed to the transport
//! - Serialize queries in caller order, URL-encoded

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::region::ActiveStatus;

/// When cookies and HTTP auth accompany a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialsMode {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

/// Whether the request may leave the configured origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorsMode {
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

/// Which cluster of a domain a request should be routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTarget {
    pub domain: String,
    pub status: ActiveStatus,
}

/// Options for a single dispatched call. Built per call, never persisted.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Query parameters in the order they will be serialized.
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Route to a regional origin instead of the configured one.
    pub region: Option<RegionTarget>,
    pub credentials: CredentialsMode,
    pub mode: CorsMode,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            region: None,
            credentials: CredentialsMode::default(),
            mode: CorsMode::default(),
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Append a query parameter after those already set.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Resolve the origin of `domain`'s active or passive cluster before sending.
    pub fn active_status(mut self, domain: impl Into<String>, status: ActiveStatus) -> Self {
        self.region = Some(RegionTarget {
            domain: domain.into(),
            status,
        });
        self
    }

    pub fn credentials(mut self, credentials: CredentialsMode) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn mode(mut self, mode: CorsMode) -> Self {
        self.mode = mode;
        self
    }
}

/// What the transport receives: a fully assembled URL plus fetch-style options.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute when a regional origin was resolved, otherwise a path.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub credentials: CredentialsMode,
    pub mode: CorsMode,
}

impl TransportRequest {
    /// A GET with default credentials and the given headers.
    pub fn get(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers,
            body: None,
            credentials: CredentialsMode::default(),
            mode: CorsMode::default(),
        }
    }
}

/// Build a header map from configured name → value pairs, skipping invalid ones.
pub fn header_map(headers: &BTreeMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "ignoring invalid default header"),
        }
    }
    map
}

/// Serialize `params` as `?k=v&...` in the given order.
///
/// Pairs with an empty value are dropped; nothing remaining yields `""`.
pub fn query_string<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        if value.as_ref().is_empty() {
            continue;
        }
        serializer.append_pair(key.as_ref(), value.as_ref());
        any = true;
    }

    if any {
        format!("?{}", serializer.finish())
    } else {
        String::new()
    }
}
