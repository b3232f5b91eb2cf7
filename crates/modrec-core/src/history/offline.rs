use async_trait::async_trait;

use super::{Comparison, RemoteHistoryClient, RepoRef};
use crate::errors::HostError;

/// Client for runs without network access: every host call fails with
/// `HostError::Transport`, so only locally decidable entries classify cleanly.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineHistoryClient;

#[async_trait]
impl RemoteHistoryClient for OfflineHistoryClient {
    async fn resolve_tag(&self, repo: &RepoRef, tag: &str) -> Result<String, HostError> {
        Err(HostError::Transport {
            message: format!("offline mode: cannot resolve {} in {}", tag, repo),
        })
    }

    async fn compare(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Comparison, HostError> {
        Err(HostError::Transport {
            message: format!("offline mode: cannot compare {}...{} in {}", base, head, repo),
        })
    }
}
