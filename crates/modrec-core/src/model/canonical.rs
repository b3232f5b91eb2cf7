//! Canonical commit form used for equality and divergence checks

use serde::{Deserialize, Serialize};

/// Which identifier shape a canonical version was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionSource {
    /// Semver tag resolved through the host
    Tag,
    /// Commit prefix embedded in a pseudo-version
    PseudoVersion,
    /// Commit hash taken verbatim
    RawCommit,
}

/// A commit identifier, full or abbreviated, plus where it came from.
///
/// The commit is stored lower-cased. Derived `PartialEq` is structural; use
/// [`CanonicalVersion::same_commit`] to decide whether two versions name the
/// same revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalVersion {
    commit: String,
    source: VersionSource,
}

impl CanonicalVersion {
    pub fn new(commit: impl Into<String>, source: VersionSource) -> Self {
        Self {
            commit: commit.into().to_ascii_lowercase(),
            source,
        }
    }

    pub fn commit(&self) -> &str {
        &self.commit
    }

    pub fn source(&self) -> VersionSource {
        self.source
    }

    /// Two versions name the same commit when the shorter commit is a prefix
    /// of the longer one. Equal-length commits therefore need a full match.
    /// An empty commit never matches.
    pub fn same_commit(&self, other: &CanonicalVersion) -> bool {
        let n = self.commit.len().min(other.commit.len());
        n > 0 && self.commit.as_bytes()[..n] == other.commit.as_bytes()[..n]
    }
}

impl std::fmt::Display for CanonicalVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.commit)
    }
}
