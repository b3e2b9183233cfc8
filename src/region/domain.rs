//! Domain configuration lookup.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::http::error::HttpResult;
use crate::http::transport::{fetch_json, Transport};
use crate::region::ActiveStatus;

/// Cluster topology of a domain as returned by the domains endpoint.
///
/// Only the cluster names are interpreted; every other field is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainConfig(Value);

impl DomainConfig {
    pub fn from_json(value: Value) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// `activeCluster`, else `replicationConfiguration.activeClusterName`.
    pub fn active_cluster(&self) -> Option<&str> {
        self.str_field("activeCluster").or_else(|| {
            self.0
                .pointer("/replicationConfiguration/activeClusterName")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
    }

    /// `passiveCluster`, else the first replication cluster that is not active.
    pub fn passive_cluster(&self) -> Option<&str> {
        if let Some(passive) = self.str_field("passiveCluster") {
            return Some(passive);
        }

        let active = self.active_cluster();
        self.0
            .pointer("/replicationConfiguration/clusters")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(|c| c.get("clusterName").and_then(Value::as_str))
            .find(|name| !name.is_empty() && Some(*name) != active)
    }

    pub fn cluster_for(&self, status: ActiveStatus) -> Option<&str> {
        match status {
            ActiveStatus::Active => self.active_cluster(),
            ActiveStatus::Passive => self.passive_cluster(),
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Fetches `GET {base}/{domain}`. Uncached; see [`RegionalOriginResolver`](crate::region::RegionalOriginResolver).
#[derive(Clone)]
pub struct DomainConfigFetcher {
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
    base_path: String,
}

impl DomainConfigFetcher {
    pub fn new(transport: Arc<dyn Transport>, headers: HeaderMap, base_path: &str) -> Self {
        Self {
            transport,
            headers,
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, domain: &str) -> String {
        format!("{}/{}", self.base_path, domain)
    }

    /// A 2xx response whose body is not JSON yields an empty config.
    pub async fn fetch(&self, domain: &str) -> HttpResult<DomainConfig> {
        let json = fetch_json(
            self.transport.as_ref(),
            self.url_for(domain),
            self.headers.clone(),
        )
        .await?;

        tracing::debug!(domain, "domain config fetched");
        Ok(DomainConfig::from_json(json.unwrap_or(Value::Null)))
    }
}
