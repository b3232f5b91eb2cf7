//! Reconciliation engine.
//!
//! The entry point is [`reconcile`]. Requirements are independent, so they
//! are reconciled concurrently by a bounded pool of futures; results are
//! buffered by original position before being partitioned.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use modrec_core_types::RunId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

use crate::diff::model::{Diff, DiffEntry, DiffStatus};
use crate::errors::{ExError, ExErrorKind};
use crate::history::{HostGate, RateLimiter, RemoteHistoryClient, RepoRef};
use crate::matcher::match_entries;
use crate::model::{CanonicalVersion, ModuleRequirement, VendorEntry};
use crate::version::VersionResolver;
use crate::{log_op_end, log_op_start};

/// Default number of requirements reconciled concurrently
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound on the worker pool; the host's rate limit makes more pointless
pub const MAX_CONCURRENCY: usize = 64;

/// Knobs for one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Requirements in flight at once
    pub concurrency: usize,
    /// Shared limiter gating every host call
    pub rate_limiter: Option<Arc<RateLimiter>>,
    /// Stops new host calls and aborts in-flight ones
    pub cancel: CancellationToken,
    pub run_id: RunId,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            rate_limiter: None,
            cancel: CancellationToken::new(),
            run_id: RunId::new(),
        }
    }
}

impl ReconcileOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// # Errors
    ///
    /// `ExErrorKind::Config` if `concurrency` is outside `1..=MAX_CONCURRENCY`.
    pub fn validate(&self) -> Result<(), ExError> {
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ExError::new(ExErrorKind::Config)
                .with_op("reconcile_options")
                .with_message(format!(
                    "concurrency must be between 1 and {}, got {}",
                    MAX_CONCURRENCY, self.concurrency
                )));
        }
        Ok(())
    }
}

/// Reconcile every requirement against the vendored entries.
///
/// Never fails as a whole: per-requirement failures (including cancellation)
/// are recorded as `Errored` entries. An out-of-range `concurrency` is
/// clamped; call [`ReconcileOptions::validate`] first to reject it instead.
pub async fn reconcile(
    requirements: &[ModuleRequirement],
    vendor_entries: &[VendorEntry],
    client: &dyn RemoteHistoryClient,
    options: &ReconcileOptions,
) -> Diff {
    let span = tracing::info_span!("reconcile", run_id = %options.run_id);
    async {
        let started = Instant::now();
        log_op_start!(
            "reconcile",
            requirements_len = requirements.len(),
            vendor_len = vendor_entries.len()
        );

        let gate = HostGate::new(client, options.rate_limiter.as_deref(), &options.cancel);
        let width = options.concurrency.clamp(1, MAX_CONCURRENCY);

        let mut slots: Vec<Option<DiffEntry>> = (0..requirements.len()).map(|_| None).collect();
        let gate_ref = &gate;
        let mut results = stream::iter(requirements.iter().enumerate())
            .map(|(idx, req)| async move {
                (idx, reconcile_requirement(req, vendor_entries, gate_ref).await)
            })
            .buffer_unordered(width);

        while let Some((idx, entry)) = results.next().await {
            slots[idx] = Some(entry);
        }

        let diff = Diff::from_entries(slots.into_iter().flatten());
        log_op_end!(
            "reconcile",
            duration_ms = started.elapsed().as_millis() as u64,
            matched = diff.matched().len(),
            different = diff.different().len(),
            not_found = diff.not_found().len(),
            errored = diff.errored().len()
        );
        diff
    }
    .instrument(span)
    .await
}

/// Reconcile a single requirement.
///
/// 1. no vendored package under the module path -> `NotFound`
/// 2. module version unresolvable -> `Errored`
/// 3. any vendored revision unresolvable -> `Errored`
/// 4. some vendored revision names the module's commit -> `Matched`
/// 5. otherwise ask the host how the module commit relates to the first
///    vendored revision -> `Different`, or `Errored` if the host fails
pub async fn reconcile_requirement(
    req: &ModuleRequirement,
    vendor_entries: &[VendorEntry],
    gate: &HostGate<'_>,
) -> DiffEntry {
    let candidates = match_entries(&req.path, vendor_entries);
    if candidates.is_empty() {
        return finish(DiffEntry::not_found(req));
    }
    let legacy_versions: Vec<String> = candidates.iter().map(|e| e.revision.clone()).collect();
    let resolver = VersionResolver::new(gate);

    let module_version = match resolver.resolve(&req.path, &req.version).await {
        Ok(v) => v,
        Err(e) => {
            let err = ExError::from(e).with_module(&req.path);
            return finish(DiffEntry::errored(req, legacy_versions, err));
        }
    };

    // Identical pins of sibling packages are resolved once.
    let mut distinct: Vec<String> = Vec::new();
    for rev in &legacy_versions {
        if !distinct.contains(rev) {
            distinct.push(rev.clone());
        }
    }

    let mut vendored: Vec<CanonicalVersion> = Vec::with_capacity(distinct.len());
    for rev in &distinct {
        match resolver.resolve(&req.path, rev).await {
            Ok(v) => vendored.push(v),
            Err(e) => {
                let err = ExError::from(e).with_module(&req.path);
                let message = format!("vendored revision {}: {}", rev, err.message());
                let err = err.with_message(message);
                return finish(DiffEntry::errored(req, legacy_versions, err));
            }
        }
    }

    if vendored.iter().any(|v| v.same_commit(&module_version)) {
        return finish(DiffEntry::matched(req, legacy_versions, None));
    }

    let primary = &vendored[0];
    let repo = match RepoRef::for_module(&req.path) {
        Ok(repo) => repo,
        Err(e) => {
            let err = ExError::from(e).with_module(&req.path);
            return finish(DiffEntry::errored(req, legacy_versions, err));
        }
    };

    match gate
        .compare(&repo, primary.commit(), module_version.commit())
        .await
    {
        Ok(cmp) => {
            let mut detail = cmp.summary();
            if distinct.len() > 1 {
                detail.push_str(&format!(
                    " ({} distinct vendored revisions, compared against {})",
                    distinct.len(),
                    distinct[0]
                ));
            }
            finish(DiffEntry::different(req, legacy_versions, detail))
        }
        Err(e) => {
            let err = e.into_ex("compare").with_module(&req.path);
            finish(DiffEntry::errored(req, legacy_versions, err))
        }
    }
}

fn finish(entry: DiffEntry) -> DiffEntry {
    match (entry.status(), entry.err()) {
        (DiffStatus::Errored, Some(err)) => debug!(
            module_path = entry.module_path(),
            status = entry.status().as_str(),
            err_code = err.code(),
            "requirement reconciled"
        ),
        _ => debug!(
            module_path = entry.module_path(),
            status = entry.status().as_str(),
            "requirement reconciled"
        ),
    }
    entry
}
