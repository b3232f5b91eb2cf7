//! reqwest-backed [`RemoteHistoryClient`]

use async_trait::async_trait;
use modrec_core::errors::{ExError, HostError};
use modrec_core::history::{Comparison, RemoteHistoryClient, RepoRef};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::GitHubConfig;
use crate::errors::{classify_status, config_error, from_reqwest};
use crate::wire::{CompareResponse, RefResponse, TagResponse};

/// Annotated tags may point at other tags; give up after this many hops
const MAX_TAG_DEPTH: usize = 5;

const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// HTTP client for the GitHub REST API.
///
/// Every call is a single attempt; rate limiting and retries belong to the
/// caller.
pub struct GitHubClient {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// # Errors
    ///
    /// `ExErrorKind::Config` if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: GitHubConfig) -> Result<Self, ExError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("modrec/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| config_error(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, HostError> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await.map_err(|e| from_reqwest(what, e))?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "github response");
        classify_status(status, response.headers(), what)?;

        response.json().await.map_err(|e| from_reqwest(what, e))
    }
}

#[async_trait]
impl RemoteHistoryClient for GitHubClient {
    async fn resolve_tag(&self, repo: &RepoRef, tag: &str) -> Result<String, HostError> {
        let what = format!("tag {} in {}", tag, repo);
        let tag_ref: RefResponse = self
            .get_json(&format!("/repos/{}/git/ref/tags/{}", repo.slug(), tag), &what)
            .await?;

        let mut object = tag_ref.object;
        for _ in 0..MAX_TAG_DEPTH {
            if !object.is_annotated_tag() {
                return Ok(object.sha);
            }
            let annotated: TagResponse = self
                .get_json(&format!("/repos/{}/git/tags/{}", repo.slug(), object.sha), &what)
                .await?;
            debug!(repo = %repo, tag = %annotated.tag, "dereferenced annotated tag");
            object = annotated.object;
        }

        if object.is_annotated_tag() {
            return Err(HostError::Transport {
                message: format!("{}: annotated tag chain longer than {}", what, MAX_TAG_DEPTH),
            });
        }
        Ok(object.sha)
    }

    async fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> Result<Comparison, HostError> {
        let what = format!("comparison {}...{} in {}", base, head, repo);
        let cmp: CompareResponse = self
            .get_json(&format!("/repos/{}/compare/{}...{}", repo.slug(), base, head), &what)
            .await?;

        if cmp.status == "identical" {
            return Ok(Comparison::identical());
        }
        Ok(Comparison::diverged(cmp.ahead_by, cmp.behind_by))
    }
}
