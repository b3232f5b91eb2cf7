//! GitHub REST v3 implementation of the remote history seam
//!
//! [`GitHubClient`] answers the two questions reconciliation asks of a host:
//! which commit a tag names, and how two commits relate.

pub mod client;
pub mod config;
pub mod errors;
pub mod wire;

pub use client::GitHubClient;
pub use config::GitHubConfig;
