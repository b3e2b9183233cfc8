//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! cache, resolver and dispatcher produce:
//!     → logging.rs (structured log events, request spans)
//!     → metrics.rs (cache lookup and request outcome counters)
//!
//! Consumers:
//!     → stdout (pretty for terminals, JSON for aggregation)
//!     → whatever `metrics` recorder the embedding application installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
