//! `go mod why -m` explanations
//!
//! Used by the report only; reconciliation never depends on an explanation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use modrec_core::errors::ExError;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::errors::explain_failed;

/// Why the main module needs a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Explanation {
    /// Shortest import chain from the main module into the module
    Needed { trace: Vec<String> },
    /// No package of the main module imports the module
    NotNeeded,
}

impl std::fmt::Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Explanation::Needed { trace } => write!(f, "[{}]", trace.join(" ")),
            Explanation::NotNeeded => write!(f, "not needed by the main module"),
        }
    }
}

/// A failed explanation, with whatever the tool wrote to stderr
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct ExplainError {
    pub error: ExError,
    pub stderr: String,
}

#[async_trait]
pub trait ExplainWhy: Send + Sync {
    /// # Errors
    ///
    /// `ExplainError` when the explanation cannot be produced.
    async fn explain(&self, module_path: &str) -> Result<Explanation, ExplainError>;
}

/// Runs the `go` tool in the directory holding `go.mod`
#[derive(Debug, Clone)]
pub struct GoModWhy {
    workdir: PathBuf,
    go_binary: String,
}

impl GoModWhy {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            go_binary: "go".to_string(),
        }
    }

    pub fn with_go_binary(mut self, go_binary: impl Into<String>) -> Self {
        self.go_binary = go_binary.into();
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

#[async_trait]
impl ExplainWhy for GoModWhy {
    async fn explain(&self, module_path: &str) -> Result<Explanation, ExplainError> {
        debug!(module_path, workdir = %self.workdir.display(), "running go mod why");
        let output = Command::new(&self.go_binary)
            .args(["mod", "why", "-m", module_path])
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|e| ExplainError {
                error: explain_failed(
                    module_path,
                    &format!("failed to run {}: {}", self.go_binary, e),
                ),
                stderr: String::new(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(ExplainError {
                error: explain_failed(
                    module_path,
                    &format!("{} mod why exited with {}", self.go_binary, output.status),
                ),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_why_output(&stdout).ok_or_else(|| ExplainError {
            error: explain_failed(module_path, "no explanation in go mod why output"),
            stderr,
        })
    }
}

/// Parse the output of `go mod why -m` for a single module.
///
/// Returns `None` when the output holds neither a trace nor a "does not
/// need" note.
pub fn parse_why_output(stdout: &str) -> Option<Explanation> {
    let mut trace = Vec::new();
    for line in stdout.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with("(main module does not need") {
            return Some(Explanation::NotNeeded);
        }
        trace.push(line.to_string());
    }
    if trace.is_empty() {
        None
    } else {
        Some(Explanation::Needed { trace })
    }
}
