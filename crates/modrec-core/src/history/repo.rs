//! Mapping from module paths to repositories on the history host
//!
//! Module paths name import locations, not repositories. Besides plain
//! `github.com/owner/name[/sub]` paths, two vanity schemes that redirect to
//! GitHub are understood:
//!
//! - `golang.org/x/<name>` -> `golang/<name>`
//! - `gopkg.in/<pkg>.vN` -> `go-<pkg>/<pkg>`, `gopkg.in/<user>/<pkg>.vN` -> `<user>/<pkg>`
//!
//! A trailing `/vN` (N >= 2) is a major-version suffix, not a directory.

use crate::errors::ResolutionError;
use serde::Serialize;

/// A repository on the history host, plus the module's directory inside it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    /// Directory of a nested module, e.g. `api` for `github.com/o/r/api`
    pub subdir: Option<String>,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            subdir: None,
        }
    }

    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        let subdir = subdir.into();
        self.subdir = if subdir.is_empty() { None } else { Some(subdir) };
        self
    }

    /// Locate the repository hosting `module_path`.
    ///
    /// # Errors
    ///
    /// `ResolutionError::UnsupportedRepository` for paths that do not map onto
    /// the supported host.
    pub fn for_module(module_path: &str) -> Result<Self, ResolutionError> {
        let unsupported = || ResolutionError::UnsupportedRepository {
            module_path: module_path.to_string(),
        };
        let mut segments: Vec<&str> = module_path.trim_matches('/').split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(unsupported());
        }

        match segments[0] {
            "github.com" => {
                if segments.len() < 3 {
                    return Err(unsupported());
                }
                strip_major_suffix(&mut segments, 3);
                Ok(RepoRef::new(segments[1], segments[2]).with_subdir(segments[3..].join("/")))
            }
            "golang.org" => {
                if segments.len() < 3 || segments[1] != "x" {
                    return Err(unsupported());
                }
                strip_major_suffix(&mut segments, 3);
                Ok(RepoRef::new("golang", segments[2]).with_subdir(segments[3..].join("/")))
            }
            "gopkg.in" => match segments.len() {
                2 => {
                    let pkg = strip_gopkg_version(segments[1]).ok_or_else(unsupported)?;
                    Ok(RepoRef::new(format!("go-{}", pkg), pkg))
                }
                3 => {
                    let pkg = strip_gopkg_version(segments[2]).ok_or_else(unsupported)?;
                    Ok(RepoRef::new(segments[1], pkg))
                }
                _ => Err(unsupported()),
            },
            _ => Err(unsupported()),
        }
    }

    /// `owner/name`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Tag name for `version` in this repository. Nested modules tag their
    /// releases with the directory as prefix (`api/v1.2.0`).
    pub fn tag_for(&self, version: &str) -> String {
        match &self.subdir {
            Some(dir) => format!("{}/{}", dir, version),
            None => version.to_string(),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Drop a trailing `vN` (N >= 2) segment when it sits past `min_len` segments
fn strip_major_suffix(segments: &mut Vec<&str>, min_len: usize) {
    if segments.len() > min_len {
        if let Some(last) = segments.last() {
            if is_major_suffix(last) {
                segments.pop();
            }
        }
    }
}

fn is_major_suffix(segment: &str) -> bool {
    match segment.strip_prefix('v') {
        Some(n) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
            n.parse::<u64>().map_or(false, |major| major >= 2)
        }
        _ => false,
    }
}

/// `yaml.v2` -> `yaml`
fn strip_gopkg_version(segment: &str) -> Option<&str> {
    let (pkg, major) = segment.rsplit_once(".v")?;
    if pkg.is_empty() || major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(pkg)
}
