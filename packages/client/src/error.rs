//! Error types for the client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the handshake (e.g. malformed member id)
    #[error("Server rejected member '{0}'")]
    Rejected(String),

    /// The server URL could not be parsed
    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
