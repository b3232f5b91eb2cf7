//! Reconciliation command

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use modrec_core::diff::{reconcile, Diff, ReconcileOptions};
use modrec_core::history::{OfflineHistoryClient, RemoteHistoryClient};
use modrec_github::config::DEFAULT_API_URL;
use modrec_github::{GitHubClient, GitHubConfig};
use modrec_manifest::{parse_go_mod_file, parse_vendor_file, ExplainWhy, GoModWhy};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::report::{render_json, render_text, Explanations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Path to the govendor vendor.json
    pub vendor_file: PathBuf,

    /// Path to the go.mod
    #[arg(long, default_value = "go.mod")]
    pub go_mod: PathBuf,

    /// GitHub token; raises the hourly quota
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "MODREC_GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Requirements reconciled concurrently
    #[arg(long, default_value_t = modrec_core::diff::engine::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Hourly request quota (defaults to 60, or 5000 with a token)
    #[arg(long)]
    pub requests_per_hour: Option<u32>,

    /// Per-request timeout
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Never contact GitHub; versions needing a lookup are reported as errored
    #[arg(long)]
    pub offline: bool,

    /// Skip `go mod why` explanations
    #[arg(long)]
    pub no_why: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args))
}

async fn run(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let go_mod = parse_go_mod_file(&args.go_mod)?;
    let vendor = parse_vendor_file(&args.vendor_file)?;
    let requirements = go_mod.requirements();
    let vendor_entries = vendor.entries();

    let cancel = CancellationToken::new();
    let mut options = ReconcileOptions::default()
        .with_concurrency(args.concurrency)
        .with_cancel(cancel.clone());
    options.validate()?;

    let client: Box<dyn RemoteHistoryClient> = if args.offline {
        Box::new(OfflineHistoryClient)
    } else {
        let mut config = GitHubConfig::new(args.token.clone())
            .with_base_url(&args.api_url)
            .with_timeout(Duration::from_secs(args.timeout_secs));
        if let Some(rph) = args.requests_per_hour {
            config = config.with_requests_per_hour(rph);
        }
        config.validate()?;
        if !config.is_authenticated() {
            info!("no GitHub token set; using the unauthenticated quota");
        }
        options = options.with_rate_limiter(Arc::new(config.rate_limiter()));
        Box::new(GitHubClient::new(config)?)
    };

    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted; cancelling outstanding lookups");
                cancel.cancel();
            }
        }
    });

    let diff = reconcile(&requirements, &vendor_entries, client.as_ref(), &options).await;
    ctrl_c.abort();

    match args.format {
        OutputFormat::Json => println!("{}", render_json(&diff, &options.run_id)?),
        OutputFormat::Text => {
            let explanations = if args.no_why || cancel.is_cancelled() {
                Explanations::new()
            } else {
                explain(&diff, &GoModWhy::new(module_root(&args.go_mod))).await
            };
            print!("{}", render_text(&diff, &explanations));
        }
    }
    Ok(())
}

/// Explain every entry needing review, one `go mod why` at a time
async fn explain(diff: &Diff, why: &dyn ExplainWhy) -> Explanations {
    let mut explanations = HashMap::new();
    for entry in diff.review_entries() {
        let result = why.explain(entry.module_path()).await;
        explanations.insert(entry.module_path().to_string(), result);
    }
    explanations
}

fn module_root(go_mod: &Path) -> PathBuf {
    match go_mod.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
