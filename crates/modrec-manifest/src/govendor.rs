//! govendor `vendor.json` parser

use std::fs;
use std::path::Path;

use modrec_core::model::VendorEntry;
use serde::{Deserialize, Serialize};

use crate::errors::{io_error, manifest_parse, Result};

const MANIFEST: &str = "vendor.json";

/// One pinned package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPackage {
    pub path: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_exact: Option<String>,
    #[serde(
        default,
        rename = "checksumSHA1",
        skip_serializing_if = "Option::is_none"
    )]
    pub checksum_sha1: Option<String>,
    /// Fetch location when it differs from `path`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Whole sub-tree vendored
    #[serde(default)]
    pub tree: bool,
}

/// Parsed legacy manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorFile {
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub ignore: String,
    #[serde(default)]
    pub package: Vec<VendorPackage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,
}

impl VendorFile {
    /// Pins in file order, reduced to what reconciliation compares
    pub fn entries(&self) -> Vec<VendorEntry> {
        self.package
            .iter()
            .map(|p| VendorEntry::new(p.path.clone(), p.revision.clone()))
            .collect()
    }
}

/// Parse a `vendor.json` file from a path
///
/// # Errors
///
/// `Io` if the file cannot be read, `ManifestParse` if it is malformed.
pub fn parse_vendor_file(path: &Path) -> Result<VendorFile> {
    let content = fs::read_to_string(path).map_err(|e| io_error("read_vendor_json", e))?;
    parse_vendor_str(&content)
}

/// Parse `vendor.json` content
///
/// # Errors
///
/// `ManifestParse` for invalid JSON or a package without a path.
pub fn parse_vendor_str(content: &str) -> Result<VendorFile> {
    let file: VendorFile = serde_json::from_str(content).map_err(|e| {
        manifest_parse(MANIFEST, Some(e.line()), &format!("JSON parse error: {}", e))
    })?;

    if let Some(idx) = file.package.iter().position(|p| p.path.trim().is_empty()) {
        return Err(manifest_parse(
            MANIFEST,
            None,
            &format!("package #{} has an empty path", idx + 1),
        ));
    }
    Ok(file)
}
