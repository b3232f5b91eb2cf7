//! Normalized manifest entries
//!
//! Both manifest parsers reduce their formats to these two types; the engine
//! never sees file formats.

use serde::{Deserialize, Serialize};

/// One declared dependency of the module manifest.
///
/// `path` is unique within a manifest. `version` is a semver tag or a
/// pseudo-version exactly as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRequirement {
    pub path: String,
    pub version: String,
}

impl ModuleRequirement {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

/// One package pin of the legacy (vendoring) manifest.
///
/// Several entries may belong to the same module (one per sub-package) and
/// carry identical or different revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorEntry {
    pub path: String,
    pub revision: String,
}

impl VendorEntry {
    pub fn new(path: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            revision: revision.into(),
        }
    }
}
