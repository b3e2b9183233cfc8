//! Error types surfaced by fetchers, the resolver and the dispatcher.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

use crate::http::response::RawResponse;

/// The network call itself could not complete (DNS, refused connection,
/// timeout, cross-origin request refused by the transport).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Every failed call resolves to exactly one of these.
///
/// Cloneable so one failed cache producer can be handed to all of its waiters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Transport succeeded with a status outside 200..300. `json` is the
    /// parsed body when it was valid JSON.
    #[error("request failed with status {}", .response.status)]
    Status {
        response: RawResponse,
        json: Option<Value>,
    },

    /// The request body could not be serialized; nothing was sent.
    #[error("request body is not serializable: {0}")]
    Body(#[source] Arc<serde_json::Error>),
}

impl HttpError {
    /// HTTP status for `Status` failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { response, .. } => Some(response.status),
            _ => None,
        }
    }

    /// Parsed JSON body for `Status` failures, if it parsed.
    pub fn json(&self) -> Option<&Value> {
        match self {
            HttpError::Status { json, .. } => json.as_ref(),
            _ => None,
        }
    }

    /// Raw response for `Status` failures.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            HttpError::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Transport(_))
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Body(Arc::new(err))
    }
}

pub type HttpResult<T> = Result<T, HttpError>;
