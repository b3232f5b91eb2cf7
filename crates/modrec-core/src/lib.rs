//! modrec core - reconciliation of Go module requirements against a legacy
//! vendor manifest
//!
//! This crate holds the host-independent parts of modrec:
//! - Path matching between module paths and vendored package paths
//! - Version classification and resolution to canonical commits
//! - The remote history seam, with rate limiting and cancellation
//! - The concurrent reconciliation engine and its partitioned [`Diff`]
//! - The canonical error and logging facilities shared by every crate

pub mod diff;
pub mod errors;
pub mod history;
pub mod logging_facility;
pub mod matcher;
pub mod model;
pub mod version;

// Used by the logging macros
pub use modrec_core_types;

pub use diff::{reconcile, render_human_summary, Diff, DiffEntry, DiffStatus, ReconcileOptions};
pub use errors::{ExError, ExErrorKind, Result};
pub use history::{Comparison, HostGate, RateLimiter, RemoteHistoryClient, RepoRef};
pub use model::{CanonicalVersion, ModuleRequirement, VendorEntry, VersionSource};
