//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the transport origin is an absolute http(s) URL
//! - Validate value ranges (TTL and timeouts > 0)
//! - Check default headers are valid HTTP tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::config::schema::ClientConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("transport.origin '{0}' is not an absolute http(s) URL")]
    InvalidOrigin(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field} '{value}' must start with '/'")]
    RelativePath { field: &'static str, value: String },

    #[error("endpoints.regional_origin_flag must not be empty")]
    EmptyFlagName,

    #[error("header '{0}' has an invalid name or value")]
    InvalidHeader(String),
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.transport.origin) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidOrigin(
            config.transport.origin.clone(),
        )),
    }

    if config.transport.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("transport.request_timeout_secs"));
    }
    if config.cache.domain_config_ttl_secs == 0 {
        errors.push(ValidationError::Zero("cache.domain_config_ttl_secs"));
    }

    for (field, value) in [
        ("endpoints.domains_path", &config.endpoints.domains_path),
        ("endpoints.feature_flags_path", &config.endpoints.feature_flags_path),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field,
                value: value.clone(),
            });
        }
    }

    if config.endpoints.regional_origin_flag.trim().is_empty() {
        errors.push(ValidationError::EmptyFlagName);
    }

    for (name, value) in &config.headers.0 {
        if HeaderName::from_bytes(name.as_bytes()).is_err()
            || HeaderValue::from_str(value).is_err()
        {
            errors.push(ValidationError::InvalidHeader(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
