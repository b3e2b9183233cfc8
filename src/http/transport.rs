//! The network-call capability.
//!
//! # Responsibilities
//! - Define the injectable `Transport` seam used by every outbound call
//! - Adapt plain async closures into transports (tests, embedding)
//! - Provide the production transport on top of `reqwest`
//!
//! # Design Decisions
//! - The transport is chosen at construction and never swapped afterward
//! - `ReqwestTransport` emulates fetch semantics: relative URLs resolve
//!   against the configured origin, cookies follow the credentials mode, and
//!   same-origin mode refuses cross-origin URLs
//! - Redirects are followed here rather than inside `reqwest`, so every hop is
//!   checked against the CORS mode and cookies are scoped to the hop's URL

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{
    HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, LOCATION, ORIGIN, SET_COOKIE,
};
use reqwest::{redirect, Method, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use url::Url;

use crate::config::TransportConfig;
use crate::http::error::{HttpError, TransportError};
use crate::http::request::{CorsMode, CredentialsMode, TransportRequest};
use crate::http::response::{classify, RawResponse};

/// Issues one request and buffers the whole response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError>;
}

/// A [`Transport`] backed by an async closure.
pub struct FnTransport<F> {
    f: F,
}

impl<F> FnTransport<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(TransportRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawResponse, TransportError>> + Send + 'static,
{
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        (self.f)(request).await
    }
}

/// Wrap a closure as a shareable transport.
pub fn transport_fn<F, Fut>(f: F) -> Arc<dyn Transport>
where
    F: Fn(TransportRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawResponse, TransportError>> + Send + 'static,
{
    Arc::new(FnTransport::new(f))
}

/// GET `url` with default credentials and classify the response.
pub(crate) async fn fetch_json(
    transport: &dyn Transport,
    url: String,
    headers: HeaderMap,
) -> Result<Option<Value>, HttpError> {
    let response = transport.send(TransportRequest::get(url, headers)).await?;
    classify(response)
}

/// Redirect hops followed before giving up, as fetch does.
const MAX_REDIRECTS: usize = 20;

/// Production transport over a pooled `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: Url,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let origin = Url::parse(&config.origin).map_err(|e| {
            TransportError::with_source(format!("invalid origin '{}'", config.origin), e)
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::with_source("failed to build HTTP client", e))?;

        tracing::debug!(origin = %origin, "reqwest transport ready");

        Ok(Self {
            client,
            origin,
            jar: Arc::new(Jar::default()),
        })
    }

    /// The cookie store credentials are drawn from and written back to.
    pub fn cookie_jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    fn with_credentials(&self, credentials: CredentialsMode, url: &Url) -> bool {
        match credentials {
            CredentialsMode::Omit => false,
            CredentialsMode::SameOrigin => self.is_same_origin(url),
            CredentialsMode::Include => true,
        }
    }

    /// Issue a single hop, attaching and storing cookies for `url` only.
    async fn send_hop(
        &self,
        request: &TransportRequest,
        url: &Url,
    ) -> Result<reqwest::Response, TransportError> {
        let same_origin = self.is_same_origin(url);
        if !same_origin && request.mode == CorsMode::SameOrigin {
            return Err(TransportError::new(format!(
                "cross-origin request to {url} refused in same-origin mode"
            )));
        }

        let with_credentials = self.with_credentials(request.credentials, url);

        let mut headers = request.headers.clone();
        if with_credentials {
            if let Some(cookie) = self.jar.cookies(url) {
                headers.insert(COOKIE, cookie);
            }
        }
        if !same_origin && request.mode == CorsMode::Cors {
            if let Ok(value) = HeaderValue::from_str(&self.origin.origin().ascii_serialization()) {
                headers.insert(ORIGIN, value);
            }
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::with_source(format!("request to {url} failed"), e))?;

        if with_credentials {
            let mut set_cookies = response.headers().get_all(SET_COOKIE).iter();
            self.jar.set_cookies(&mut set_cookies, url);
        }

        Ok(response)
    }
}

/// Where a redirect response points, if it is one worth following.
fn redirect_target(response: &reqwest::Response, url: &Url) -> Option<Url> {
    if !response.status().is_redirection() {
        return None;
    }
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    url.join(location).ok()
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, mut request: TransportRequest) -> Result<RawResponse, TransportError> {
        let mut url = self.origin.join(&request.url).map_err(|e| {
            TransportError::with_source(format!("invalid request URL '{}'", request.url), e)
        })?;
        let mut hops = 0;

        let response = loop {
            let response = self.send_hop(&request, &url).await?;

            let Some(next) = redirect_target(&response, &url) else {
                break response;
            };
            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(TransportError::new(format!(
                    "too many redirects starting from {}",
                    request.url
                )));
            }

            // 303 always, and 301/302 after a POST, continue as a bodiless GET.
            let status = response.status();
            if (status == StatusCode::SEE_OTHER && request.method != Method::HEAD)
                || (matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND)
                    && request.method == Method::POST)
            {
                request.method = Method::GET;
                request.body = None;
                request.headers.remove(CONTENT_TYPE);
            }

            tracing::trace!(from = %url, to = %next, status = %status, "following redirect");
            url = next;
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            TransportError::with_source(format!("reading response from {url} failed"), e)
        })?;

        tracing::trace!(url = %url, status = %status, bytes = body.len(), "response received");

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
