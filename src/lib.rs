//! Cross-region HTTP access layer.
//!
//! Fetches per-domain cluster topology, resolves which regional origin a
//! request should target, and issues the request with the matching
//! credential and CORS modes.
//!
//! ```text
//! HttpService ──region set──▶ RegionalOriginResolver ──▶ TtlCache ──miss──▶ DomainConfigFetcher
//!      │                              └──────────────────────────────────▶ FeatureFlagFetcher
//!      └──────────────────────────────▶ Transport ──▶ classify
//! ```

pub mod cache;
pub mod config;
pub mod http;
pub mod observability;
pub mod region;

pub use cache::TtlCache;
pub use config::ClientConfig;
pub use http::{HttpError, HttpService, RequestOptions, Transport};
pub use region::ActiveStatus;
