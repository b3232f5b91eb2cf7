//! Reconciliation output types

use serde::Serialize;

use crate::errors::ExError;
use crate::model::ModuleRequirement;

/// Outcome of reconciling one requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiffStatus {
    /// A vendored revision names the same commit as the module version
    Matched,
    /// Vendored and module revisions differ; `detail` says by how much
    Different,
    /// No vendored package falls under the module path
    NotFound,
    /// Resolution or comparison failed; `err` says why
    Errored,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStatus::Matched => "matched",
            DiffStatus::Different => "different",
            DiffStatus::NotFound => "not_found",
            DiffStatus::Errored => "errored",
        }
    }
}

/// Result for one module requirement.
///
/// Built only through the status constructors, which keep two invariants:
/// `legacy_versions` is empty iff the status is `NotFound`, and `err` is set
/// iff the status is `Errored`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    module_path: String,
    go_mod_version: String,
    legacy_versions: Vec<String>,
    status: DiffStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    err: Option<ExError>,
}

impl DiffEntry {
    /// # Panics
    ///
    /// Debug builds assert that `legacy_versions` is non-empty.
    pub fn matched(
        req: &ModuleRequirement,
        legacy_versions: Vec<String>,
        detail: Option<String>,
    ) -> Self {
        debug_assert!(!legacy_versions.is_empty());
        Self::build(req, legacy_versions, DiffStatus::Matched, detail, None)
    }

    /// # Panics
    ///
    /// Debug builds assert that `legacy_versions` is non-empty.
    pub fn different(req: &ModuleRequirement, legacy_versions: Vec<String>, detail: String) -> Self {
        debug_assert!(!legacy_versions.is_empty());
        Self::build(req, legacy_versions, DiffStatus::Different, Some(detail), None)
    }

    pub fn not_found(req: &ModuleRequirement) -> Self {
        Self::build(req, Vec::new(), DiffStatus::NotFound, None, None)
    }

    /// # Panics
    ///
    /// Debug builds assert that `legacy_versions` is non-empty.
    pub fn errored(req: &ModuleRequirement, legacy_versions: Vec<String>, err: ExError) -> Self {
        debug_assert!(!legacy_versions.is_empty());
        Self::build(req, legacy_versions, DiffStatus::Errored, None, Some(err))
    }

    fn build(
        req: &ModuleRequirement,
        legacy_versions: Vec<String>,
        status: DiffStatus,
        detail: Option<String>,
        err: Option<ExError>,
    ) -> Self {
        Self {
            module_path: req.path.clone(),
            go_mod_version: req.version.clone(),
            legacy_versions,
            status,
            detail,
            err,
        }
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn go_mod_version(&self) -> &str {
        &self.go_mod_version
    }

    /// Raw vendored revisions of every matched package, in manifest order
    pub fn legacy_versions(&self) -> &[String] {
        &self.legacy_versions
    }

    /// The revision used for comparison: the first matched package's
    pub fn primary_legacy_version(&self) -> Option<&str> {
        self.legacy_versions.first().map(String::as_str)
    }

    pub fn status(&self) -> DiffStatus {
        self.status
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn err(&self) -> Option<&ExError> {
        self.err.as_ref()
    }
}

/// Partitioned reconciliation result.
///
/// The four buckets are disjoint and together hold exactly one entry per
/// requirement; each bucket keeps the module manifest's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diff {
    matched: Vec<DiffEntry>,
    different: Vec<DiffEntry>,
    not_found: Vec<DiffEntry>,
    errored: Vec<DiffEntry>,
}

impl Diff {
    /// Partition entries, given in manifest order, into buckets
    pub fn from_entries(entries: impl IntoIterator<Item = DiffEntry>) -> Self {
        let mut diff = Diff::default();
        for entry in entries {
            match entry.status {
                DiffStatus::Matched => diff.matched.push(entry),
                DiffStatus::Different => diff.different.push(entry),
                DiffStatus::NotFound => diff.not_found.push(entry),
                DiffStatus::Errored => diff.errored.push(entry),
            }
        }
        diff
    }

    pub fn matched(&self) -> &[DiffEntry] {
        &self.matched
    }

    pub fn different(&self) -> &[DiffEntry] {
        &self.different
    }

    pub fn not_found(&self) -> &[DiffEntry] {
        &self.not_found
    }

    pub fn errored(&self) -> &[DiffEntry] {
        &self.errored
    }

    /// Total number of entries across all buckets
    pub fn len(&self) -> usize {
        self.matched.len() + self.different.len() + self.not_found.len() + self.errored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries an operator has to look at: everything not matched
    pub fn to_review(&self) -> usize {
        self.len() - self.matched.len()
    }

    /// Entries needing review, in report order: errored, not found, different
    pub fn review_entries(&self) -> impl Iterator<Item = &DiffEntry> {
        self.errored
            .iter()
            .chain(self.not_found.iter())
            .chain(self.different.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    fn req(p: &str) -> ModuleRequirement {
        ModuleRequirement::new(p, "v1.0.0")
    }

    #[test]
    fn test_from_entries_partitions_and_keeps_order() {
        let entries = vec![
            DiffEntry::not_found(&req("a")),
            DiffEntry::matched(&req("b"), vec!["1234567".into()], None),
            DiffEntry::not_found(&req("c")),
            DiffEntry::different(&req("d"), vec!["1234567".into()], "1 ahead".into()),
            DiffEntry::errored(
                &req("e"),
                vec!["1234567".into()],
                ExError::new(ExErrorKind::Transport),
            ),
        ];
        let diff = Diff::from_entries(entries);
        assert_eq!(diff.len(), 5);
        assert_eq!(diff.to_review(), 4);
        let nf: Vec<&str> = diff.not_found().iter().map(|e| e.module_path()).collect();
        assert_eq!(nf, vec!["a", "c"]);
        let review: Vec<&str> = diff.review_entries().map(|e| e.module_path()).collect();
        assert_eq!(review, vec!["e", "a", "c", "d"]);
    }

    #[test]
    fn test_constructors_hold_invariants() {
        let nf = DiffEntry::not_found(&req("a"));
        assert!(nf.legacy_versions().is_empty());
        assert!(nf.err().is_none());
        assert_eq!(nf.primary_legacy_version(), None);

        let er = DiffEntry::errored(
            &req("a"),
            vec!["abc1234".into()],
            ExError::new(ExErrorKind::TagNotFound),
        );
        assert_eq!(er.status(), DiffStatus::Errored);
        assert!(er.err().is_some());
    }

    #[test]
    fn test_entry_serializes_without_empty_optionals() {
        let e = DiffEntry::not_found(&ModuleRequirement::new("github.com/pkg/errors", "v0.9.1"));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["status"], "NotFound");
        assert_eq!(json["legacy_versions"], serde_json::json!([]));
        assert!(json.get("err").is_none());
    }
}
