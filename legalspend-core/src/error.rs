use thiserror::Error;

/// Unified error type for the legalspend workspace.
///
/// Configuration problems are fatal at construction/startup time and
/// propagate to the caller; source and data problems are transient and are
/// logged and degraded to empty results close to where they occur.
#[derive(Debug, Error)]
pub enum SpendError {
    /// Invalid or incomplete configuration: unknown database driver or file
    /// type, unresolved registry key, duplicate registration, missing
    /// connection parameter.
    #[error("configuration error: {0}")]
    Config(String),

    /// An individual source failed during an operation.
    #[error("{name} failed: {msg}")]
    Source {
        /// Name of the source that failed.
        name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Issues with returned or expected data (malformed rows, bad payloads).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

impl SpendError {
    /// Helper: build a `Config` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Helper: build a `Source` error tagged with the source name.
    pub fn source(source: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            name: source.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Data` error.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }
}
