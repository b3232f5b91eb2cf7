//! Report rendering

use std::collections::HashMap;

use colored::Colorize;
use modrec_core::diff::{Diff, DiffEntry, DiffStatus, Summary};
use modrec_core::modrec_core_types::RunId;
use modrec_manifest::{ExplainError, Explanation};

/// `go mod why` results keyed by module path
pub type Explanations = HashMap<String, Result<Explanation, ExplainError>>;

/// Render the text report.
///
/// One line per entry to review (errored, then not found, then different):
/// `modulePath,goModVersion,legacyVersion-or-notFound,explanation`. The
/// explanation column holds the `go mod why` result followed by the entry's
/// note in parentheses when one was computed, otherwise the note alone. Matched modules follow with a check mark,
/// then the summary.
pub fn render_text(diff: &Diff, explanations: &Explanations) -> String {
    let mut output = String::new();

    for entry in diff.review_entries() {
        match explanations.get(entry.module_path()) {
            Some(Err(e)) => {
                output.push_str(&format!(
                    "{}\n",
                    format!("Failed to check {} ({})", entry.module_path(), e).red().bold()
                ));
                if !e.stderr.trim().is_empty() {
                    output.push_str(&format!("{}\n", e.stderr.trim_end().red()));
                }
            }
            Some(Ok(why)) => {
                output.push_str(&entry_line(entry, &format!("{} ({})", why, note(entry))))
            }
            None => output.push_str(&entry_line(entry, &note(entry))),
        }
    }

    for entry in diff.matched() {
        match entry.detail() {
            Some(detail) => output.push_str(&format!(
                "{} {} ({})\n",
                entry.module_path().bold(),
                "✓".green().bold(),
                detail
            )),
            None => output.push_str(&format!(
                "{} {}\n",
                entry.module_path().bold(),
                "✓".green().bold()
            )),
        }
    }

    output.push('\n');
    output.push_str(&render_summary(&Summary::from_diff(diff)));
    output
}

fn entry_line(entry: &DiffEntry, explanation: &str) -> String {
    format!(
        "{},{},{},{}\n",
        entry.module_path(),
        entry.go_mod_version(),
        entry.primary_legacy_version().unwrap_or("notFound"),
        explanation
    )
}

/// Short reason an entry needs review
fn note(entry: &DiffEntry) -> String {
    if let Some(err) = entry.err() {
        return err.to_string();
    }
    match (entry.status(), entry.detail()) {
        (_, Some(detail)) => detail.to_string(),
        (DiffStatus::NotFound, None) => "not vendored".to_string(),
        (status, None) => status.as_str().to_string(),
    }
}

fn render_summary(summary: &Summary) -> String {
    format!(
        "Matched package revisions: {} of {}.\n{} to check ({} not found and {} different revs, {} errored).\n",
        summary.matched.to_string().green().bold(),
        summary.total,
        summary.to_check.to_string().bold(),
        summary.not_found.to_string().red().bold(),
        summary.different.to_string().yellow().bold(),
        summary.errored.to_string().red(),
    )
}

/// Render the machine-readable report
///
/// # Errors
///
/// Propagates serialization failures.
pub fn render_json(diff: &Diff, run_id: &RunId) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({
        "run_id": run_id.as_str(),
        "summary": Summary::from_diff(diff),
        "diff": diff,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modrec_core::errors::{ExError, ExErrorKind};
    use modrec_core::model::ModuleRequirement;

    fn sample() -> Diff {
        Diff::from_entries(vec![
            DiffEntry::not_found(&ModuleRequirement::new("github.com/pkg/errors", "v0.9.1")),
            DiffEntry::matched(
                &ModuleRequirement::new("github.com/x/y", "v1.0.0"),
                vec!["aaaaaaaaaaaa".into()],
                None,
            ),
            DiffEntry::different(
                &ModuleRequirement::new("github.com/a/b", "v1.2.0"),
                vec!["bbbbbbbbbbbb".into()],
                "3 ahead".into(),
            ),
        ])
    }

    #[test]
    fn test_text_lines() {
        colored::control::set_override(false);
        let text = render_text(&sample(), &Explanations::new());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "github.com/pkg/errors,v0.9.1,notFound,not vendored");
        assert_eq!(lines[1], "github.com/a/b,v1.2.0,bbbbbbbbbbbb,3 ahead");
        assert_eq!(lines[2], "github.com/x/y ✓");
        assert!(text.contains("Matched package revisions: 1 of 3."));
        assert!(text.contains("2 to check (1 not found and 1 different revs, 0 errored)."));
    }

    #[test]
    fn test_explanation_column_and_failure() {
        colored::control::set_override(false);
        let mut explanations = Explanations::new();
        explanations.insert(
            "github.com/pkg/errors".into(),
            Ok(Explanation::Needed {
                trace: vec!["example.com/app".into(), "github.com/pkg/errors".into()],
            }),
        );
        explanations.insert(
            "github.com/a/b".into(),
            Err(ExplainError {
                error: ExError::new(ExErrorKind::ExplainFailed).with_message("exit status 1"),
                stderr: "go: cannot find main module\n".into(),
            }),
        );

        let text = render_text(&sample(), &explanations);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "github.com/pkg/errors,v0.9.1,notFound,[example.com/app github.com/pkg/errors] (not vendored)"
        );
        assert!(lines.iter().all(|l| !l.starts_with("  ")));
        assert!(text.contains("Failed to check github.com/a/b"));
        assert!(text.contains("go: cannot find main module"));
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&sample(), &RunId::from_string("run-1".into())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["run_id"], "run-1");
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["diff"]["not_found"][0]["module_path"], "github.com/pkg/errors");
    }
}
