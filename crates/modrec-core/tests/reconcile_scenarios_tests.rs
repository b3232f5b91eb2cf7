#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::StubHistoryClient;
use modrec_core::diff::{reconcile, render_human_summary, DiffStatus, ReconcileOptions};
use modrec_core::errors::{ExErrorKind, HostError};
use modrec_core::history::{Comparison, OfflineHistoryClient, RateLimiter};
use modrec_core::model::{ModuleRequirement, VendorEntry};
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

fn req(path: &str, version: &str) -> ModuleRequirement {
    ModuleRequirement::new(path, version)
}

fn vendored(path: &str, revision: &str) -> VendorEntry {
    VendorEntry::new(path, revision)
}

#[tokio::test]
async fn test_scenario_module_without_vendored_package_is_not_found() {
    let client = StubHistoryClient::new();
    let diff = reconcile(
        &[req("github.com/pkg/errors", "v0.9.1")],
        &[vendored("github.com/sirupsen/logrus", "abcdef0123456789")],
        &client,
        &ReconcileOptions::default(),
    )
    .await;

    assert_eq!(diff.not_found().len(), 1);
    let entry = &diff.not_found()[0];
    assert_eq!(entry.module_path(), "github.com/pkg/errors");
    assert!(entry.legacy_versions().is_empty());
    assert_eq!(client.calls(), 0, "no host call for an unvendored module");
}

#[tokio::test]
async fn test_scenario_pseudo_version_matches_vendored_revision() {
    let client = StubHistoryClient::new();
    let diff = reconcile(
        &[req("github.com/x/y", "v1.0.0-20200101000000-aaaaaaaaaaaa")],
        &[vendored("github.com/x/y", "aaaaaaaaaaaa")],
        &client,
        &ReconcileOptions::default(),
    )
    .await;

    assert_eq!(diff.matched().len(), 1);
    assert_eq!(diff.matched()[0].legacy_versions(), &["aaaaaaaaaaaa".to_string()]);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_scenario_diverged_revision_is_different() {
    let client = StubHistoryClient::new().with_comparison(
        "bbbbbbbbbbbb",
        "aaaaaaaaaaaa",
        Comparison::diverged(3, 0),
    );
    let diff = reconcile(
        &[req("github.com/x/y", "v1.0.0-20200101000000-aaaaaaaaaaaa")],
        &[vendored("github.com/x/y", "bbbbbbbbbbbb")],
        &client,
        &ReconcileOptions::default(),
    )
    .await;

    assert_eq!(diff.different().len(), 1);
    let entry = &diff.different()[0];
    assert_eq!(entry.status(), DiffStatus::Different);
    assert_eq!(entry.detail(), Some("3 ahead"));
}

#[tokio::test]
async fn test_tag_resolved_through_host_matches_full_hash() {
    let client = StubHistoryClient::new().with_tag(
        "hashicorp/consul",
        "api/v1.4.0",
        "0123456789abcdef0123456789abcdef01234567",
    );
    let diff = reconcile(
        &[req("github.com/hashicorp/consul/api", "v1.4.0")],
        &[
            vendored("github.com/hashicorp/consul/api", "0123456789abcdef0123456789abcdef01234567"),
            vendored("github.com/hashicorp/consul/api/watch", "0123456789ab"),
        ],
        &client,
        &ReconcileOptions::default(),
    )
    .await;

    assert_eq!(diff.matched().len(), 1);
    assert_eq!(diff.matched()[0].legacy_versions().len(), 2);
    assert_eq!(
        client.seen_tags.lock().unwrap().as_slice(),
        &["api/v1.4.0".to_string()]
    );
}

#[tokio::test]
async fn test_missing_tag_is_errored_with_raw_legacy_versions() {
    let client = StubHistoryClient::new();
    let diff = reconcile(
        &[req("github.com/pkg/errors", "v0.9.1")],
        &[vendored("github.com/pkg/errors", "645ef00459ed84a119197bfb8d8205042c6df63d")],
        &client,
        &ReconcileOptions::default(),
    )
    .await;

    assert_eq!(diff.errored().len(), 1);
    let entry = &diff.errored()[0];
    assert_eq!(
        entry.legacy_versions(),
        &["645ef00459ed84a119197bfb8d8205042c6df63d".to_string()]
    );
    let err = entry.err().unwrap();
    assert_eq!(err.kind(), ExErrorKind::TagNotFound);
    assert_eq!(err.module_path(), Some("github.com/pkg/errors"));
}

#[tokio::test]
async fn test_failure_is_isolated_to_one_entry() {
    let client = StubHistoryClient::new()
        .failing_for(
            "broken/repo",
            HostError::Transport {
                message: "connection reset".into(),
            },
        )
        .with_tag("pkg/errors", "v0.9.1", "645ef00459ed84a119197bfb8d8205042c6df63d");
    let diff = reconcile(
        &[
            req("github.com/broken/repo", "v1.0.0"),
            req("github.com/pkg/errors", "v0.9.1"),
        ],
        &[
            vendored("github.com/broken/repo", "aaaaaaaaaaaa"),
            vendored("github.com/pkg/errors", "645ef00459ed"),
        ],
        &client,
        &ReconcileOptions::default(),
    )
    .await;

    assert_eq!(diff.errored().len(), 1);
    assert_eq!(diff.errored()[0].module_path(), "github.com/broken/repo");
    assert_eq!(
        diff.errored()[0].err().unwrap().kind(),
        ExErrorKind::HostUnavailable
    );
    assert_eq!(diff.matched().len(), 1);
}

#[tokio::test]
async fn test_buckets_keep_manifest_order_under_concurrency() {
    let client = StubHistoryClient::new().with_delay(Duration::from_millis(5));
    let requirements: Vec<ModuleRequirement> = (0..20)
        .map(|i| req(&format!("github.com/org/m{:02}", i), "v1.0.0"))
        .collect();
    let vendor: Vec<VendorEntry> = (0..20)
        .map(|i| vendored(&format!("github.com/org/m{:02}", i), "abcdef0"))
        .collect();

    let diff = reconcile(
        &requirements,
        &vendor,
        &client,
        &ReconcileOptions::default().with_concurrency(8),
    )
    .await;

    // Every tag is missing, so everything lands in one bucket.
    let order: Vec<&str> = diff.errored().iter().map(|e| e.module_path()).collect();
    let expected: Vec<String> = requirements.iter().map(|r| r.path.clone()).collect();
    assert_eq!(order, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_cancelled_run_marks_host_bound_entries_cancelled() {
    let client = StubHistoryClient::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let diff = reconcile(
        &[
            req("github.com/a/b", "v1.0.0"),
            req("github.com/x/y", "v1.0.0-20200101000000-aaaaaaaaaaaa"),
            req("github.com/not/vendored", "v1.0.0"),
        ],
        &[
            vendored("github.com/a/b", "abcdef0"),
            vendored("github.com/x/y", "aaaaaaaaaaaa"),
        ],
        &client,
        &ReconcileOptions::default().with_cancel(cancel),
    )
    .await;

    assert_eq!(diff.len(), 3);
    assert_eq!(diff.errored().len(), 1);
    assert_eq!(
        diff.errored()[0].err().unwrap().kind(),
        ExErrorKind::Cancelled
    );
    // Entries needing no host call still complete.
    assert_eq!(diff.matched().len(), 1);
    assert_eq!(diff.not_found().len(), 1);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_cancel_during_host_calls_stops_in_flight_lookups() {
    let client = StubHistoryClient::new()
        .with_tag("a/b", "v1.0.0", "1111111111111111111111111111111111111111")
        .with_tag("c/d", "v2.0.0", "2222222222222222222222222222222222222222")
        .with_delay(Duration::from_secs(30));
    let cancel = CancellationToken::new();
    let options = ReconcileOptions::default().with_cancel(cancel.clone());
    let started = std::time::Instant::now();

    let requires = [
        req("github.com/a/b", "v1.0.0"),
        req("github.com/c/d", "v2.0.0"),
    ];
    let vendor = [
        vendored("github.com/a/b", "abcdef0"),
        vendored("github.com/c/d", "1234567"),
    ];
    let (diff, ()) = tokio::join!(
        reconcile(
            &requires,
            &vendor,
            &client,
            &options,
        ),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        }
    );

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(client.calls(), 2, "both lookups were in flight");
    assert_eq!(diff.errored().len(), 2);
    for entry in diff.errored() {
        assert_eq!(entry.err().unwrap().kind(), ExErrorKind::Cancelled);
    }
}

#[tokio::test]
async fn test_offline_client_resolves_local_versions_only() {
    let diff = reconcile(
        &[
            req("github.com/x/y", "v1.0.0-20200101000000-aaaaaaaaaaaa"),
            req("github.com/a/b", "v1.2.0"),
        ],
        &[
            vendored("github.com/x/y", "aaaaaaaaaaaa"),
            vendored("github.com/a/b", "abcdef0"),
        ],
        &OfflineHistoryClient,
        &ReconcileOptions::default(),
    )
    .await;

    assert_eq!(diff.matched().len(), 1);
    assert_eq!(diff.errored().len(), 1);
    assert_eq!(
        diff.errored()[0].err().unwrap().kind(),
        ExErrorKind::HostUnavailable
    );
}

#[tokio::test]
async fn test_shared_rate_limiter_admits_all_calls() {
    let client = StubHistoryClient::new()
        .with_tag("a/b", "v1.0.0", "abcdef0123456789")
        .with_tag("c/d", "v1.0.0", "0123456789abcdef");
    let limiter = Arc::new(RateLimiter::new(10, 1000.0));

    let diff = reconcile(
        &[req("github.com/a/b", "v1.0.0"), req("github.com/c/d", "v1.0.0")],
        &[
            vendored("github.com/a/b", "abcdef0"),
            vendored("github.com/c/d", "0123456"),
        ],
        &client,
        &ReconcileOptions::default().with_rate_limiter(limiter),
    )
    .await;

    assert_eq!(diff.matched().len(), 2);
    assert_eq!(
        render_human_summary(&diff),
        "Matched package revisions: 2 of 2.\n0 to check (0 not found and 0 different revs, 0 errored)."
    );
}

fn requirement_set() -> impl Strategy<Value = (Vec<ModuleRequirement>, Vec<VendorEntry>)> {
    prop::collection::vec((0u8..3, any::<bool>()), 0..16).prop_map(|shapes| {
        let mut requirements = Vec::new();
        let mut vendor = Vec::new();
        for (i, (shape, vendor_it)) in shapes.into_iter().enumerate() {
            let path = format!("github.com/org/mod{}", i);
            let version = match shape {
                0 => "v1.0.0-20200101000000-aaaaaaaaaaaa".to_string(),
                1 => "v1.0.0".to_string(),
                _ => "not a version".to_string(),
            };
            if vendor_it {
                vendor.push(VendorEntry::new(format!("{}/pkg", path), "aaaaaaaaaaaa"));
            }
            requirements.push(ModuleRequirement::new(path, version));
        }
        (requirements, vendor)
    })
}

proptest! {
    #[test]
    fn prop_every_requirement_lands_in_exactly_one_bucket((requirements, vendor) in requirement_set()) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let client = StubHistoryClient::new();
        let diff = rt.block_on(reconcile(&requirements, &vendor, &client, &ReconcileOptions::default()));

        prop_assert_eq!(diff.len(), requirements.len());

        let all: Vec<_> = diff
            .matched()
            .iter()
            .chain(diff.different())
            .chain(diff.not_found())
            .chain(diff.errored())
            .collect();
        let paths: HashSet<&str> = all.iter().map(|e| e.module_path()).collect();
        let expected: HashSet<&str> = requirements.iter().map(|r| r.path.as_str()).collect();
        prop_assert_eq!(paths, expected);

        for entry in all {
            prop_assert_eq!(
                entry.status() == DiffStatus::NotFound,
                entry.legacy_versions().is_empty()
            );
        }
    }
}
