//! Reconciliation of a module manifest against a legacy vendor manifest.
//!
//! ## Entry point
//!
//! ```ignore
//! use modrec_core::diff::{reconcile, ReconcileOptions};
//!
//! let diff = reconcile(&requirements, &vendor_entries, &client, &ReconcileOptions::default()).await;
//! println!("{}", modrec_core::diff::render_human_summary(&diff));
//! ```
//!
//! ## Guarantees
//!
//! - **Partition**: every requirement lands in exactly one of the four buckets.
//! - **Order**: each bucket keeps the module manifest's order, whatever order
//!   the concurrent workers finish in.
//! - **Isolation**: a failure while reconciling one requirement is recorded on
//!   that entry only.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{reconcile, reconcile_requirement, ReconcileOptions};
pub use human_summary::{render_human_summary, Summary};
pub use model::{Diff, DiffEntry, DiffStatus};
