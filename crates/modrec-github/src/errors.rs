//! HTTP outcome classification
//!
//! Maps transport results onto `HostError` so callers never look at status
//! codes.

use modrec_core::errors::{ExError, ExErrorKind, HostError};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// Header carrying the remaining request quota
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Header carrying the quota reset time (seconds since the epoch)
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Classify a response status.
///
/// - 2xx: success
/// - 404 (and 422, unknown commit in a compare): `NotFound`
/// - 429, or 403 with an exhausted quota: `RateLimited`
/// - anything else: `Transport`
///
/// # Errors
///
/// Returns the `HostError` the status maps to.
pub fn classify_status(status: StatusCode, headers: &HeaderMap, what: &str) -> Result<(), HostError> {
    if status.is_success() {
        return Ok(());
    }
    let remaining = header_i64(headers, RATE_LIMIT_REMAINING);
    let reset_at = header_i64(headers, RATE_LIMIT_RESET);
    match status {
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => Err(HostError::NotFound {
            what: what.to_string(),
        }),
        StatusCode::TOO_MANY_REQUESTS => Err(HostError::RateLimited { reset_at }),
        StatusCode::FORBIDDEN if remaining == Some(0) => Err(HostError::RateLimited { reset_at }),
        StatusCode::UNAUTHORIZED => Err(HostError::Transport {
            message: format!("{} for {}: check the access token", status, what),
        }),
        _ => Err(HostError::Transport {
            message: format!("unexpected status {} for {}", status, what),
        }),
    }
}

/// Map a reqwest failure (connect, timeout, body decode) to `Transport`
pub fn from_reqwest(what: &str, err: reqwest::Error) -> HostError {
    let cause = if err.is_timeout() {
        "timed out".to_string()
    } else if err.is_decode() {
        format!("malformed response body: {}", err)
    } else {
        err.to_string()
    };
    HostError::Transport {
        message: format!("{}: {}", what, cause),
    }
}

/// Create a client configuration error
pub fn config_error(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("github_config")
        .with_message(reason)
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
