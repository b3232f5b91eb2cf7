//! Version identifier -> canonical commit

use tracing::debug;

use crate::errors::{CallError, HostError, ResolutionError};
use crate::history::{HostGate, RepoRef};
use crate::model::{CanonicalVersion, VersionSource};
use crate::version::shape::{classify, VersionShape};

/// Canonical form of a raw commit or pseudo-version, or the tag still to be
/// looked up on the host
fn local_or_tag(shape: VersionShape) -> Result<CanonicalVersion, String> {
    match shape {
        VersionShape::RawCommit(commit) => {
            Ok(CanonicalVersion::new(commit, VersionSource::RawCommit))
        }
        VersionShape::Pseudo(pseudo) => Ok(CanonicalVersion::new(
            pseudo.revision,
            VersionSource::PseudoVersion,
        )),
        VersionShape::Tag(tag) => Err(tag),
    }
}

/// Turns any accepted identifier into a [`CanonicalVersion`], asking the host
/// only for tags.
pub struct VersionResolver<'g> {
    gate: &'g HostGate<'g>,
}

impl<'g> VersionResolver<'g> {
    pub fn new(gate: &'g HostGate<'g>) -> Self {
        Self { gate }
    }

    /// Resolve `version` of the module at `module_path`.
    ///
    /// # Errors
    ///
    /// - `InvalidVersion` for unrecognised identifiers
    /// - `UnsupportedRepository` for a tag of a module off the supported host
    /// - `TagNotFound` when the host has no such tag
    /// - `HostUnavailable` for any other host failure
    /// - `Cancelled` when the run is cancelled during the lookup
    pub async fn resolve(
        &self,
        module_path: &str,
        version: &str,
    ) -> Result<CanonicalVersion, ResolutionError> {
        let tag = match local_or_tag(classify(version)?) {
            Ok(local) => return Ok(local),
            Err(tag) => tag,
        };

        let repo = RepoRef::for_module(module_path)?;
        let tag_name = repo.tag_for(&tag);
        debug!(module_path, repo = %repo, tag = %tag_name, "resolving tag");

        match self.gate.resolve_tag(&repo, &tag_name).await {
            Ok(commit) => Ok(CanonicalVersion::new(commit, VersionSource::Tag)),
            Err(CallError::Cancelled) => Err(ResolutionError::Cancelled { tag: tag_name }),
            Err(CallError::Host(HostError::NotFound { .. })) => {
                Err(ResolutionError::TagNotFound {
                    repo: repo.slug(),
                    tag: tag_name,
                })
            }
            Err(CallError::Host(cause)) => Err(ResolutionError::HostUnavailable {
                tag: tag_name,
                cause,
            }),
        }
    }
}
