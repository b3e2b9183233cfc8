//! Regional origin resolution.

use std::time::Duration;

use crate::cache::TtlCache;
use crate::http::error::{HttpError, HttpResult};
use crate::observability::metrics;
use crate::region::domain::{DomainConfig, DomainConfigFetcher};
use crate::region::flags::{flag_as_origin, FeatureFlagFetcher};
use crate::region::ActiveStatus;

/// Turns a domain and an activity status into the origin of that cluster.
///
/// Domain configurations are cached for the configured TTL; flag lookups are
/// not cached.
#[derive(Clone)]
pub struct RegionalOriginResolver {
    domains: DomainConfigFetcher,
    flags: FeatureFlagFetcher,
    cache: TtlCache<String, DomainConfig, HttpError>,
    flag_name: String,
}

impl RegionalOriginResolver {
    pub fn new(
        domains: DomainConfigFetcher,
        flags: FeatureFlagFetcher,
        ttl: Duration,
        flag_name: String,
    ) -> Self {
        Self {
            domains,
            flags,
            cache: TtlCache::new("domain_config", ttl),
            flag_name,
        }
    }

    pub fn flags(&self) -> &FeatureFlagFetcher {
        &self.flags
    }

    pub fn cache(&self) -> &TtlCache<String, DomainConfig, HttpError> {
        &self.cache
    }

    pub async fn domain_config(&self, domain: &str) -> HttpResult<DomainConfig> {
        let fetcher = self.domains.clone();
        let owned = domain.to_string();
        self.cache
            .get(domain.to_string(), move || async move {
                fetcher.fetch(&owned).await
            })
            .await
    }

    /// Origin of `domain`'s active or passive cluster.
    ///
    /// An empty string means same-origin and is not an error.
    pub async fn resolve_origin(&self, domain: &str, status: ActiveStatus) -> HttpResult<String> {
        let config = self.domain_config(domain).await?;
        let cluster = config.cluster_for(status).unwrap_or_default();

        let value = self
            .flags
            .fetch(&self.flag_name, &[("cluster", cluster)])
            .await?;
        let origin = flag_as_origin(value);

        metrics::record_origin_resolution(status.as_str(), !origin.is_empty());
        tracing::debug!(
            domain,
            status = status.as_str(),
            cluster,
            origin = %origin,
            "regional origin resolved"
        );

        Ok(origin)
    }
}
