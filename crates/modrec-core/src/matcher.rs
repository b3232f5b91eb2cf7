//! Module path to legacy entry matching
//!
//! A legacy manifest pins packages, a module manifest requires modules. A
//! package belongs to a module when its path equals the module path or lies
//! below it on a `/` boundary.

use crate::model::VendorEntry;

/// Whether `package_path` is the module itself or one of its sub-packages.
///
/// `github.com/foo/bar` contains `github.com/foo/bar/sub` but not
/// `github.com/foo/barbaz`.
pub fn is_within_module(package_path: &str, module_path: &str) -> bool {
    let module_path = module_path.trim_end_matches('/');
    if module_path.is_empty() {
        return false;
    }
    match package_path.strip_prefix(module_path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Legacy entries belonging to `module_path`, in the legacy manifest's order.
///
/// An empty result means the module has no vendored counterpart.
pub fn match_entries<'a>(module_path: &str, entries: &'a [VendorEntry]) -> Vec<&'a VendorEntry> {
    entries
        .iter()
        .filter(|e| is_within_module(&e.path, module_path))
        .collect()
}
