//! Raw transport responses and their classification.
//!
//! ```text
//! Pending ──status in 200..300──▶ Success(Option<json>)   body that fails to parse → None
//!         └─any other status────▶ Failure(HttpError::Status { response, json })
//! ```
//!
//! There is no retry and no fallback: every response lands in exactly one state.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;

use crate::http::error::HttpError;

/// A fully buffered response as returned by a [`Transport`](crate::http::Transport).
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Shorthand for tests and custom transports answering with a JSON body.
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn parse_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Turn a transport response into the caller-visible outcome.
pub fn classify(response: RawResponse) -> Result<Option<Value>, HttpError> {
    let json = response.parse_json();

    if response.status.is_success() {
        if json.is_none() && !response.body.is_empty() {
            tracing::debug!(
                status = %response.status,
                "success body is not JSON, returning empty payload"
            );
        }
        Ok(json)
    } else {
        Err(HttpError::Status { response, json })
    }
}
