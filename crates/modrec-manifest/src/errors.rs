//! Error handling for modrec-manifest
//!
//! Wraps modrec-core ExError with manifest-specific helpers

use modrec_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a manifest parse error, with the 1-based line when known
pub fn manifest_parse(manifest: &str, line: Option<usize>, reason: &str) -> ExError {
    let message = match line {
        Some(line) => format!("{}:{}: {}", manifest, line, reason),
        None => format!("{}: {}", manifest, reason),
    };
    ExError::new(ExErrorKind::ManifestParse)
        .with_op("manifest_parse")
        .with_message(message)
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an explain-why failure
pub fn explain_failed(module_path: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::ExplainFailed)
        .with_op("go_mod_why")
        .with_module(module_path)
        .with_message(reason.to_string())
}
