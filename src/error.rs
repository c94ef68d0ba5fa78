//! Error types for each layer. None of them is fatal at runtime: the session
//! logs and absorbs them, only the one-shot CLI commands bubble them up.

use crate::models::TaskId;

/// Invalid due time input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DueTimeError {
    #[error("invalid due time '{0}', expected HH:MM")]
    Malformed(String),
    #[error("due time '{0}' is out of range")]
    OutOfRange(String),
}

/// Failure talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Connection refused, DNS, broken body, ...
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("backend answered {status} for {url}")]
    Status { status: u16, url: String },

    /// The configured backend URL cannot carry a path.
    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),

    /// Backend answered 2xx but the body is not what we expect.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Rejected user operation, raised before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("task description must not be empty")]
    EmptyDescription,
    #[error("task {0} not found")]
    UnknownTask(TaskId),
}

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// A reminder side effect that could not be carried out. Always swallowed.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert output is not a terminal")]
    NoTerminal,
    #[error("alert output failed: {0}")]
    Io(#[from] std::io::Error),
}
