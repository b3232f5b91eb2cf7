//! Recognising the three accepted identifier shapes
//!
//! ```text
//! abcdef0123456789                          raw commit (7..=40 hex)
//! v0.0.0-20230101000000-abcdef012345        pseudo-version
//! v1.2.4-0.20230101000000-abcdef012345      pseudo-version after a release
//! v1.2.3-pre.0.20230101000000-abcdef012345  pseudo-version after a pre-release
//! v1.2.3, v2.0.0+incompatible, v1.0.0-rc.1  semver tag
//! ```

use chrono::NaiveDateTime;

use crate::errors::ResolutionError;

const PSEUDO_REV_LEN: usize = 12;
const PSEUDO_TS_LEN: usize = 14;

/// A classified version identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionShape {
    RawCommit(String),
    Pseudo(PseudoVersion),
    /// Tag name as it exists in the repository (build metadata stripped)
    Tag(String),
}

/// Decoded pseudo-version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoVersion {
    /// Version prefix before the timestamp, e.g. `v0.0.0` or `v1.2.4-0`
    pub base: String,
    pub timestamp: NaiveDateTime,
    /// 12-hex commit prefix
    pub revision: String,
}

impl PseudoVersion {
    /// Decode `version` as a pseudo-version, or `None` if it is not one
    pub fn parse(version: &str) -> Option<Self> {
        let version = strip_build_metadata(version);
        if !version.starts_with('v') {
            return None;
        }
        let (rest, revision) = version.rsplit_once('-')?;
        if revision.len() != PSEUDO_REV_LEN || !is_hex(revision) {
            return None;
        }
        if rest.len() < PSEUDO_TS_LEN + 1 {
            return None;
        }
        let split = rest.len() - PSEUDO_TS_LEN;
        let (head, ts) = (rest.get(..split)?, rest.get(split..)?);
        if !ts.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let base = head.strip_suffix('-').or_else(|| head.strip_suffix('.'))?;
        if !looks_like_semver_core(base) {
            return None;
        }
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y%m%d%H%M%S").ok()?;
        Some(Self {
            base: base.to_string(),
            timestamp,
            revision: revision.to_ascii_lowercase(),
        })
    }
}

/// 7 to 40 hexadecimal characters
pub fn is_commit_hash(s: &str) -> bool {
    (7..=40).contains(&s.len()) && is_hex(s)
}

/// Classify `version`, trying raw commit, pseudo-version, then tag.
///
/// # Errors
///
/// `ResolutionError::InvalidVersion` when none of the shapes apply.
pub fn classify(version: &str) -> Result<VersionShape, ResolutionError> {
    let version = version.trim();
    if is_commit_hash(version) {
        return Ok(VersionShape::RawCommit(version.to_ascii_lowercase()));
    }
    if let Some(pseudo) = PseudoVersion::parse(version) {
        return Ok(VersionShape::Pseudo(pseudo));
    }
    let tag = strip_build_metadata(version);
    if looks_like_semver_core(tag) {
        return Ok(VersionShape::Tag(tag.to_string()));
    }
    Err(ResolutionError::InvalidVersion {
        version: version.to_string(),
    })
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `v2.0.0+incompatible` -> `v2.0.0`
fn strip_build_metadata(version: &str) -> &str {
    version.split_once('+').map_or(version, |(v, _)| v)
}

/// `vMAJOR.MINOR.PATCH` optionally followed by `-prerelease`
fn looks_like_semver_core(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('v') else {
        return false;
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };
    let parts: Vec<&str> = core.split('.').collect();
    let numeric = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    numeric && pre.map_or(true, |p| !p.is_empty())
}
