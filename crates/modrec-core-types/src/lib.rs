//! Core types shared across modrec crates
//!
//! - **Correlation**: `RunId` tags every event emitted by one reconciliation pass
//! - **Sensitive data**: `Sensitive<T>` keeps host credentials out of logs
//! - **Schema constants**: canonical field keys and event names for tracing

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RunId;
pub use sensitive::Sensitive;
