//! Error types for issuesync
//!
//! Defines the error enum covering every failure mode of a sync run.
//! Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for issuesync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type for issuesync operations
///
/// Inside a run only project resolution and the final state write can fail
/// the run. Errors raised for a single repository or item are logged and
/// absorbed by the driver.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration errors (missing file, missing token, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unreachable hosts and timed-out requests
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed response bodies
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success responses from GitHub or Todoist
    #[error("Integration error: {0}")]
    Integration(String),

    /// The target Todoist project does not exist
    #[error("Todoist project not found: {0}")]
    ProjectNotFound(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
