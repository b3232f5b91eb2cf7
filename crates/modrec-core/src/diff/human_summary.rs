//! Human-readable summary of a [`Diff`].

use serde::Serialize;

use crate::diff::model::Diff;

/// Bucket counts of a [`Diff`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub matched: usize,
    pub to_check: usize,
    pub not_found: usize,
    pub different: usize,
    pub errored: usize,
}

impl Summary {
    pub fn from_diff(diff: &Diff) -> Self {
        Self {
            total: diff.len(),
            matched: diff.matched().len(),
            to_check: diff.to_review(),
            not_found: diff.not_found().len(),
            different: diff.different().len(),
            errored: diff.errored().len(),
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Matched package revisions: {} of {}.",
            self.matched, self.total
        )?;
        write!(
            f,
            "{} to check ({} not found and {} different revs, {} errored).",
            self.to_check, self.not_found, self.different, self.errored
        )
    }
}

/// Render the two-line summary printed at the end of a report.
///
/// Informational only; the structured [`Diff`] is the result.
pub fn render_human_summary(diff: &Diff) -> String {
    Summary::from_diff(diff).to_string()
}
