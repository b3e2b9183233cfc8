//! Regional topology subsystem.
//!
//! # Data Flow
//! ```text
//! RegionalOriginResolver::resolve_origin(domain, status)
//!     → TtlCache (one hour) ─miss→ domain.rs  GET {domains_path}/{domain}
//!     → DomainConfig::cluster_for(status)
//!     → flags.rs  GET {feature_flags_path}/{flag}?cluster={cluster}
//!     → flag value as origin ("" = same origin)
//! ```

pub mod domain;
pub mod flags;
pub mod resolver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use domain::{DomainConfig, DomainConfigFetcher};
pub use flags::{flag_as_origin, FeatureFlagFetcher, FlagValue};
pub use resolver::RegionalOriginResolver;

/// Which of a domain's clusters a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveStatus {
    Active,
    Passive,
}

impl ActiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveStatus::Active => "active",
            ActiveStatus::Passive => "passive",
        }
    }
}

impl fmt::Display for ActiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown activity status '{0}', expected 'active' or 'passive'")]
pub struct ParseActiveStatusError(String);

impl FromStr for ActiveStatus {
    type Err = ParseActiveStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ActiveStatus::Active),
            "passive" => Ok(ActiveStatus::Passive),
            other => Err(ParseActiveStatusError(other.to_string())),
        }
    }
}
