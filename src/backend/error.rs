use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to the extraction backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport error, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status code.
    #[error("backend error ({status}): {message}")]
    Status {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The response body is not the expected JSON.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A report could not be written to disk.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}
