//! Version identifiers and their resolution to commits

pub mod resolver;
pub mod shape;

pub use resolver::VersionResolver;
pub use shape::{classify, is_commit_hash, PseudoVersion, VersionShape};
