//! Client configuration

use crate::error::{ClientError, Result};
use std::str::FromStr;

pub const ENV_API_URL: &str = "POCKET_BAR_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "POCKET_BAR_TIMEOUT_SECS";
pub const ENV_RENEWAL: &str = "POCKET_BAR_RENEWAL";

/// How concurrent renewals of the same expired credential are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenewalPolicy {
    /// Every operation chain refreshes on its own, concurrent chains may refresh redundantly
    #[default]
    PerCall,
    /// Concurrent renewals of the same expired token share one refresh call
    SingleFlight,
}

impl FromStr for RenewalPolicy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-call" | "percall" => Ok(RenewalPolicy::PerCall),
            "single-flight" | "singleflight" => Ok(RenewalPolicy::SingleFlight),
            other => Err(ClientError::Configuration(format!(
                "unknown renewal policy '{other}', expected 'per-call' or 'single-flight'"
            ))),
        }
    }
}

/// Identity endpoints, relative to the API base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRoutes {
    pub login: String,
    pub register: String,
    pub refresh: String,
}

impl Default for IdentityRoutes {
    fn default() -> Self {
        Self {
            login: "/identity/account/login".to_string(),
            register: "/identity/account/register".to_string(),
            refresh: "/identity/account/refreshtoken".to_string(),
        }
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base, e.g. `https://bar.example/api/v1`
    pub base_url: String,

    /// Whole-request timeout. `None` keeps the transport default.
    pub timeout_secs: Option<u64>,

    pub renewal: RenewalPolicy,

    pub routes: IdentityRoutes,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: None,
            renewal: RenewalPolicy::default(),
            routes: IdentityRoutes::default(),
        }
    }

    /// Read `POCKET_BAR_API_URL` (required), `POCKET_BAR_TIMEOUT_SECS` and `POCKET_BAR_RENEWAL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(ENV_API_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Configuration(format!("{ENV_API_URL} is not set")))?;

        let mut config = Self::new(base_url);

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ClientError::Configuration(format!("{ENV_TIMEOUT_SECS}='{raw}' is not a number: {e}"))
            })?;
            config.timeout_secs = Some(secs);
        }

        if let Some(raw) = lookup(ENV_RENEWAL) {
            config.renewal = raw.parse()?;
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_renewal(mut self, renewal: RenewalPolicy) -> Self {
        self.renewal = renewal;
        self
    }

    pub fn with_routes(mut self, routes: IdentityRoutes) -> Self {
        self.routes = routes;
        self
    }
}
