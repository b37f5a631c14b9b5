//! Error classification for protected-path evaluation.
//!
//! Every error aborts the evaluation it occurred in. Callers must treat any of them as a
//! rejection of the push or merge: paths that could not be verified are never allowed.

/// Stable high-level error classification for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Missing or invalid settings, including patterns that don't compile.
    Configuration,
    /// The commit-history or permission service failed or gave an unusable answer.
    HostUnavailable,
    /// A commit named by a ref update does not exist on the host.
    NotFound,
    /// The caller passed a malformed ref update or user.
    InvalidInput,
    /// The evaluation was cancelled through its cancellation flag.
    Cancelled,
    /// I/O errors from the operating system.
    Io,
}

impl Kind {
    /// Returns true if the condition may go away when the same evaluation is attempted again.
    ///
    /// Nothing in this crate retries on its own, this is a hint for callers only.
    pub fn is_temporary(self) -> bool {
        match self {
            Kind::HostUnavailable | Kind::Cancelled | Kind::Io => true,
            Kind::Configuration | Kind::NotFound | Kind::InvalidInput => false,
        }
    }
}

/// Error type for all operations provided by this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A setting is missing or holds a value we can't use.
    #[error("configuration error in '{key}': {message}")]
    Configuration { key: String, message: String },
    /// A path or branch pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// A host service call failed.
    #[error("host unavailable during {operation}: {message}")]
    HostUnavailable { operation: &'static str, message: String },
    /// The host does not know the given commit.
    #[error("commit '{0}' could not be resolved")]
    CommitNotFound(String),
    /// A ref update or user violates the caller contract.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Cancellation was requested while the evaluation was running.
    #[error("evaluation was cancelled")]
    Cancelled,
    /// I/O errors from filesystem or OS interactions.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Fast classification helper returning a stable error kind.
    pub fn kind(&self) -> Kind {
        match self {
            Error::Configuration { .. } | Error::InvalidPattern { .. } => Kind::Configuration,
            Error::HostUnavailable { .. } => Kind::HostUnavailable,
            Error::CommitNotFound(_) => Kind::NotFound,
            Error::InvalidInput(_) => Kind::InvalidInput,
            Error::Cancelled => Kind::Cancelled,
            Error::Io(_) => Kind::Io,
        }
    }

    pub(crate) fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    pub(crate) fn host(operation: &'static str, message: impl Into<String>) -> Self {
        Error::HostUnavailable {
            operation,
            message: message.into(),
        }
    }
}
