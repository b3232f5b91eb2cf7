use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use modrec_core::errors::HostError;
use modrec_core::history::{Comparison, RemoteHistoryClient, RepoRef};

/// Scripted host: tags and comparisons are looked up in tables, anything
/// missing is `NotFound`.
#[derive(Default)]
pub struct StubHistoryClient {
    tags: HashMap<(String, String), String>,
    comparisons: HashMap<(String, String), Comparison>,
    failures: HashMap<String, HostError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    pub seen_tags: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubHistoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, slug: &str, tag: &str, commit: &str) -> Self {
        self.tags
            .insert((slug.to_string(), tag.to_string()), commit.to_string());
        self
    }

    pub fn with_comparison(mut self, base: &str, head: &str, cmp: Comparison) -> Self {
        self.comparisons
            .insert((base.to_string(), head.to_string()), cmp);
        self
    }

    /// Every call for this repository fails with `err`
    pub fn failing_for(mut self, slug: &str, err: HostError) -> Self {
        self.failures.insert(slug.to_string(), err);
        self
    }

    /// Delay every call, so concurrent workers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, repo: &RepoRef) -> Result<(), HostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.get(&repo.slug()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteHistoryClient for StubHistoryClient {
    async fn resolve_tag(&self, repo: &RepoRef, tag: &str) -> Result<String, HostError> {
        self.enter(repo).await?;
        self.seen_tags
            .lock()
            .map(|mut seen| seen.push(tag.to_string()))
            .ok();
        self.tags
            .get(&(repo.slug(), tag.to_string()))
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                what: format!("tag {} in {}", tag, repo),
            })
    }

    async fn compare(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Comparison, HostError> {
        self.enter(repo).await?;
        self.comparisons
            .get(&(base.to_string(), head.to_string()))
            .copied()
            .ok_or_else(|| HostError::NotFound {
                what: format!("comparison {}...{} in {}", base, head, repo),
            })
    }
}
