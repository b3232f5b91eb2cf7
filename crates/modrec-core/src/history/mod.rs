//! Remote history access
//!
//! [`RemoteHistoryClient`] is the seam to the version-control host. The engine
//! never calls a client directly; every call goes through a [`HostGate`],
//! which applies the shared rate limiter and the run's cancellation token.

pub mod offline;
pub mod rate_limit;
pub mod repo;

use crate::errors::{CallError, HostError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub use offline::OfflineHistoryClient;
pub use rate_limit::RateLimiter;
pub use repo::RepoRef;

/// How `head` relates to `base` in the repository history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub identical: bool,
    /// Commits reachable from head but not from base
    pub ahead_by: u32,
    /// Commits reachable from base but not from head
    pub behind_by: u32,
}

impl Comparison {
    pub fn identical() -> Self {
        Self {
            identical: true,
            ahead_by: 0,
            behind_by: 0,
        }
    }

    pub fn diverged(ahead_by: u32, behind_by: u32) -> Self {
        Self {
            identical: false,
            ahead_by,
            behind_by,
        }
    }

    /// `"3 ahead"`, `"2 behind"`, `"3 ahead, 2 behind"` or `"identical"`
    pub fn summary(&self) -> String {
        match (self.identical, self.ahead_by, self.behind_by) {
            (true, _, _) | (false, 0, 0) => "identical".to_string(),
            (false, a, 0) => format!("{} ahead", a),
            (false, 0, b) => format!("{} behind", b),
            (false, a, b) => format!("{} ahead, {} behind", a, b),
        }
    }
}

/// Read access to a version-control host.
///
/// Implementations classify every call into success or one [`HostError`]
/// and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteHistoryClient: Send + Sync {
    /// Resolve a tag name to the commit it points at (annotated tags are
    /// dereferenced).
    ///
    /// # Errors
    ///
    /// `HostError::NotFound` if the repository or tag does not exist.
    async fn resolve_tag(&self, repo: &RepoRef, tag: &str) -> Result<String, HostError>;

    /// Compare two commits; `ahead_by` counts commits in `head` missing from `base`.
    ///
    /// # Errors
    ///
    /// `HostError::NotFound` if the repository or either commit is unknown.
    async fn compare(&self, repo: &RepoRef, base: &str, head: &str)
        -> Result<Comparison, HostError>;
}

/// Rate-limited, cancellable access to a [`RemoteHistoryClient`].
///
/// Cheap to construct; one gate is shared by every worker of a run.
pub struct HostGate<'a> {
    client: &'a dyn RemoteHistoryClient,
    limiter: Option<&'a RateLimiter>,
    cancel: &'a CancellationToken,
}

impl<'a> HostGate<'a> {
    pub fn new(
        client: &'a dyn RemoteHistoryClient,
        limiter: Option<&'a RateLimiter>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            limiter,
            cancel,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for a rate-limit token unless the run is cancelled first
    async fn admit(&self) -> Result<(), CallError> {
        if self.cancel.is_cancelled() {
            return Err(CallError::Cancelled);
        }
        if let Some(limiter) = self.limiter {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(CallError::Cancelled),
                _ = limiter.acquire() => {}
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// `CallError::Cancelled` if the run is cancelled before or during the call.
    pub async fn resolve_tag(&self, repo: &RepoRef, tag: &str) -> Result<String, CallError> {
        self.admit().await?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CallError::Cancelled),
            res = self.client.resolve_tag(repo, tag) => res.map_err(CallError::from),
        }
    }

    /// # Errors
    ///
    /// `CallError::Cancelled` if the run is cancelled before or during the call.
    pub async fn compare(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Comparison, CallError> {
        self.admit().await?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CallError::Cancelled),
            res = self.client.compare(repo, base, head) => res.map_err(CallError::from),
        }
    }
}
