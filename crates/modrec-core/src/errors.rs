use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure in modrec is classified into exactly one of these kinds.
/// Callers branch on the kind, never on message text. Only `ManifestParse`
/// and `Config` abort a run; everything else is recorded on a single
/// [`DiffEntry`](crate::diff::model::DiffEntry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExErrorKind {
    // Fatal
    /// A manifest could not be read or parsed
    ManifestParse,
    /// Invalid run configuration (bad URL, zero concurrency, ...)
    Config,

    // Resolution
    /// The host has no tag with the requested name
    TagNotFound,
    /// The host could not be asked (network, auth or rate-limit failure)
    HostUnavailable,
    /// The version string has none of the accepted shapes
    InvalidVersion,
    /// The module path does not map onto a repository on the supported host
    UnsupportedRepository,

    // Host
    /// Repository, tag or commit unknown to the host
    HostNotFound,
    RateLimited,
    /// Network, TLS, timeout or unexpected HTTP status
    Transport,

    // Run control
    Cancelled,

    // Reporting
    /// The explain-why helper failed; never affects classification
    ExplainFailed,

    Io,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ManifestParse => "ERR_MANIFEST_PARSE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::TagNotFound => "ERR_TAG_NOT_FOUND",
            ExErrorKind::HostUnavailable => "ERR_HOST_UNAVAILABLE",
            ExErrorKind::InvalidVersion => "ERR_INVALID_VERSION",
            ExErrorKind::UnsupportedRepository => "ERR_UNSUPPORTED_REPOSITORY",
            ExErrorKind::HostNotFound => "ERR_HOST_NOT_FOUND",
            ExErrorKind::RateLimited => "ERR_RATE_LIMITED",
            ExErrorKind::Transport => "ERR_TRANSPORT",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::ExplainFailed => "ERR_EXPLAIN_FAILED",
            ExErrorKind::Io => "ERR_IO",
        }
    }

    /// Whether an error of this kind must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExErrorKind::ManifestParse | ExErrorKind::Config)
    }
}

/// Canonical structured error type
///
/// Carries the classification plus enough context (operation, module path)
/// to be printed inline in a report next to successfully resolved entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    module_path: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            module_path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the module path the error belongs to
    pub fn with_module(mut self, path: impl Into<String>) -> Self {
        self.module_path = Some(path.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn module_path(&self) -> Option<&str> {
        self.module_path.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Shorthand for the per-entry cancellation error
    pub fn cancelled(op: &str) -> Self {
        ExError::new(ExErrorKind::Cancelled)
            .with_op(op)
            .with_message("run cancelled before the host call completed")
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.module_path {
            write!(f, " (module: {})", path)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

impl Serialize for ExError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("ExError", 4)?;
        st.serialize_field("code", self.code())?;
        st.serialize_field("op", &self.op)?;
        st.serialize_field("message", &self.message)?;
        st.serialize_field("source", &self.source)?;
        st.end()
    }
}

// ========== End Error Facility ==========

/// Outcome classes of a single call into the version-control host.
///
/// Exactly one of these (or success) is produced per call. The client never
/// retries; the engine records the failure on the entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Repository, tag or commit unknown to the host
    #[error("not found on host: {what}")]
    NotFound { what: String },

    /// The host refused the call because the rate limit is exhausted
    #[error("rate limited by host{}", reset_hint(.reset_at))]
    RateLimited { reset_at: Option<i64> },

    /// Network, TLS, timeout, auth or unexpected status
    #[error("transport error: {message}")]
    Transport { message: String },
}

fn reset_hint(reset_at: &Option<i64>) -> String {
    match reset_at {
        Some(ts) => match chrono::DateTime::from_timestamp(*ts, 0) {
            Some(at) => format!(" until {}", at.to_rfc3339()),
            None => String::new(),
        },
        None => String::new(),
    }
}

/// Failure to turn a version identifier into a canonical commit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("tag {tag} not found in {repo}")]
    TagNotFound { repo: String, tag: String },

    #[error("host unavailable while resolving {tag}: {cause}")]
    HostUnavailable { tag: String, cause: HostError },

    #[error("unrecognised version identifier: {version:?}")]
    InvalidVersion { version: String },

    #[error("module {module_path} is not hosted on a supported repository host")]
    UnsupportedRepository { module_path: String },

    #[error("cancelled while resolving {tag}")]
    Cancelled { tag: String },
}

/// Outcome of a gated host call: the host failed, or the run was cancelled
/// before (or while) the call was made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("cancelled")]
    Cancelled,
}

impl From<HostError> for ExError {
    fn from(err: HostError) -> Self {
        let kind = match &err {
            HostError::NotFound { .. } => ExErrorKind::HostNotFound,
            HostError::RateLimited { .. } => ExErrorKind::RateLimited,
            HostError::Transport { .. } => ExErrorKind::Transport,
        };
        ExError::new(kind).with_message(err.to_string())
    }
}

impl CallError {
    /// Convert into the canonical error, tagging it with the operation name
    pub fn into_ex(self, op: &str) -> ExError {
        match self {
            CallError::Host(err) => ExError::from(err).with_op(op),
            CallError::Cancelled => ExError::cancelled(op),
        }
    }
}

impl From<ResolutionError> for ExError {
    fn from(err: ResolutionError) -> Self {
        let message = err.to_string();
        match err {
            ResolutionError::TagNotFound { .. } => ExError::new(ExErrorKind::TagNotFound)
                .with_op("resolve_tag")
                .with_message(message),
            ResolutionError::HostUnavailable { cause, .. } => {
                ExError::new(ExErrorKind::HostUnavailable)
                    .with_op("resolve_tag")
                    .with_message(message)
                    .with_source(cause.into())
            }
            ResolutionError::InvalidVersion { .. } => ExError::new(ExErrorKind::InvalidVersion)
                .with_op("resolve_version")
                .with_message(message),
            ResolutionError::UnsupportedRepository { module_path } => {
                ExError::new(ExErrorKind::UnsupportedRepository)
                    .with_op("repo_for_module")
                    .with_module(module_path)
                    .with_message(message)
            }
            ResolutionError::Cancelled { .. } => ExError::cancelled("resolve_tag"),
        }
    }
}
