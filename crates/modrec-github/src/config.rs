//! GitHub client configuration
//!
//! Built explicitly by the caller and handed to [`GitHubClient::new`]; nothing
//! here reads the environment.
//!
//! [`GitHubClient::new`]: crate::GitHubClient::new

use std::time::Duration;

use modrec_core::errors::ExError;
use modrec_core::history::RateLimiter;
use modrec_core_types::Sensitive;

use crate::errors::config_error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Hourly quota GitHub grants anonymous callers
pub const UNAUTHENTICATED_REQUESTS_PER_HOUR: u32 = 60;

/// Hourly quota GitHub grants token holders
pub const AUTHENTICATED_REQUESTS_PER_HOUR: u32 = 5000;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Calls allowed back to back before the hourly rate applies
const BURST: u32 = 10;

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub base_url: String,
    pub token: Option<Sensitive<String>>,
    pub requests_per_hour: u32,
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

impl GitHubConfig {
    /// Defaults for the public API; the quota follows from whether a token is set.
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty()).map(Sensitive::new);
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            requests_per_hour: default_requests_per_hour(token.is_some()),
            token,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_requests_per_hour(mut self, requests_per_hour: u32) -> Self {
        self.requests_per_hour = requests_per_hour;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// # Errors
    ///
    /// `ExErrorKind::Config` for a non-HTTP base URL, a zero quota or a zero
    /// timeout.
    pub fn validate(&self) -> Result<(), ExError> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(config_error(format!(
                "API URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.requests_per_hour == 0 {
            return Err(config_error("requests per hour must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(config_error("timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Limiter enforcing this configuration's quota across a run
    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::per_hour(self.requests_per_hour, BURST.min(self.requests_per_hour))
    }
}

/// GitHub's hourly quota for anonymous or token-authenticated callers
pub fn default_requests_per_hour(authenticated: bool) -> u32 {
    if authenticated {
        AUTHENTICATED_REQUESTS_PER_HOUR
    } else {
        UNAUTHENTICATED_REQUESTS_PER_HOUR
    }
}
