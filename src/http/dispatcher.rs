//! Request dispatch.
//!
//! # Responsibilities
//! - Assemble the final URL: regional origin + path + query
//! - Switch to `credentials: include` / `mode: cors` for cross-region calls
//! - Merge default headers, caller headers and the JSON content type
//! - Issue the transport call and classify the response
//!
//! # Data Flow
//! ```text
//! HttpService::request(path, options)
//!     → query_string(options.query)
//!     → [options.region set] RegionalOriginResolver::resolve_origin
//!     → Transport::send(TransportRequest)
//!     → classify(RawResponse) → Ok(Option<json>) | Err(HttpError)
//! ```

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::http::error::{HttpResult, TransportError};
use crate::http::request::{
    header_map, query_string, CorsMode, CredentialsMode, RequestOptions, TransportRequest,
};
use crate::http::response::classify;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::observability::metrics::{self, RequestOutcome};
use crate::region::{
    ActiveStatus, DomainConfig, DomainConfigFetcher, FeatureFlagFetcher, FlagValue,
    RegionalOriginResolver,
};

/// Client-side HTTP access layer.
///
/// Owns the transport and the domain configuration cache. Cloning shares both.
#[derive(Clone)]
pub struct HttpService {
    transport: Arc<dyn Transport>,
    resolver: RegionalOriginResolver,
    default_headers: HeaderMap,
}

impl HttpService {
    /// Build a service over an explicitly supplied transport.
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let default_headers = header_map(&config.headers.0);

        let domains = DomainConfigFetcher::new(
            transport.clone(),
            default_headers.clone(),
            &config.endpoints.domains_path,
        );
        let flags = FeatureFlagFetcher::new(
            transport.clone(),
            default_headers.clone(),
            &config.endpoints.feature_flags_path,
        );
        let resolver = RegionalOriginResolver::new(
            domains,
            flags,
            config.cache.domain_config_ttl(),
            config.endpoints.regional_origin_flag.clone(),
        );

        Self {
            transport,
            resolver,
            default_headers,
        }
    }

    /// Build a service over the reqwest transport described by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(&config.transport)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn resolver(&self) -> &RegionalOriginResolver {
        &self.resolver
    }

    /// Domain configuration, served from the cache while it is fresh.
    pub async fn get_domain_config(&self, domain: &str) -> HttpResult<DomainConfig> {
        self.resolver.domain_config(domain).await
    }

    pub async fn get_feature_flag(
        &self,
        name: &str,
        params: &[(&str, &str)],
    ) -> HttpResult<Option<FlagValue>> {
        self.resolver.flags().fetch(name, params).await
    }

    pub async fn get_regional_origin(
        &self,
        domain: &str,
        status: ActiveStatus,
    ) -> HttpResult<String> {
        self.resolver.resolve_origin(domain, status).await
    }

    /// Dispatch one call and classify its response.
    pub async fn request(&self, path: &str, options: RequestOptions) -> HttpResult<Option<Value>> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "dispatch",
            %request_id,
            method = %options.method,
            path
        );
        self.dispatch(path, options).instrument(span).await
    }

    async fn dispatch(&self, path: &str, options: RequestOptions) -> HttpResult<Option<Value>> {
        let start = Instant::now();
        let RequestOptions {
            method,
            query,
            body,
            headers,
            region,
            mut credentials,
            mut mode,
        } = options;

        let pathname = format!("{path}{}", query_string(&query));

        let origin = match &region {
            Some(target) => {
                let origin = match self
                    .resolver
                    .resolve_origin(&target.domain, target.status)
                    .await
                {
                    Ok(origin) => origin,
                    Err(e) => {
                        metrics::record_request(
                            method.as_str(),
                            RequestOutcome::ResolutionError,
                            start,
                        );
                        tracing::warn!(
                            error = %e,
                            domain = %target.domain,
                            "origin resolution failed"
                        );
                        return Err(e);
                    }
                };
                credentials = CredentialsMode::Include;
                mode = CorsMode::Cors;
                origin
            }
            None => String::new(),
        };

        let mut merged = self.default_headers.clone();
        merged.extend(headers);

        let body = match body {
            Some(value) => {
                merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                match serde_json::to_string(&value) {
                    Ok(json) => Some(json),
                    Err(e) => {
                        metrics::record_request(
                            method.as_str(),
                            RequestOutcome::InvalidBody,
                            start,
                        );
                        return Err(e.into());
                    }
                }
            }
            None => None,
        };

        let request = TransportRequest {
            method: method.clone(),
            url: format!("{origin}{pathname}"),
            headers: merged,
            body,
            credentials,
            mode,
        };

        tracing::debug!(
            url = %request.url,
            credentials = ?request.credentials,
            mode = ?request.mode,
            "sending request"
        );

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_request(method.as_str(), RequestOutcome::TransportError, start);
                tracing::warn!(error = %e, "transport failed");
                return Err(e.into());
            }
        };

        metrics::record_request(
            method.as_str(),
            RequestOutcome::from_status(response.status.as_u16()),
            start,
        );
        let outcome = classify(response);
        if let Err(e) = &outcome {
            tracing::debug!(error = %e, "request failed");
        }
        outcome
    }

    /// Serialize `body` as JSON and dispatch it with the JSON content type.
    pub async fn request_with_body<B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> HttpResult<Option<Value>>
    where
        B: Serialize + ?Sized,
    {
        let body = match serde_json::to_value(body) {
            Ok(body) => body,
            Err(e) => {
                metrics::record_request(
                    options.method.as_str(),
                    RequestOutcome::InvalidBody,
                    Instant::now(),
                );
                return Err(e.into());
            }
        };
        self.request(path, options.body(body)).await
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> HttpResult<Option<Value>> {
        self.request(path, options.method(Method::GET)).await
    }

    pub async fn post<B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> HttpResult<Option<Value>>
    where
        B: Serialize + ?Sized,
    {
        self.request_with_body(path, body, options.method(Method::POST))
            .await
    }

    pub async fn put<B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> HttpResult<Option<Value>>
    where
        B: Serialize + ?Sized,
    {
        self.request_with_body(path, body, options.method(Method::PUT))
            .await
    }

    pub async fn delete<B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> HttpResult<Option<Value>>
    where
        B: Serialize + ?Sized,
    {
        self.request_with_body(path, body, options.method(Method::DELETE))
            .await
    }
}
