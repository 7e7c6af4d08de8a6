//! Error types for the core library

use thiserror::Error;

/// Failures surfaced by a [`TaskService`](crate::task::TaskService).
///
/// The set is closed: every transport, protocol and payload problem maps to
/// exactly one variant. Variants carry messages rather than source errors so
/// the value can be cloned into published store state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Failed to decode response: {0}")]
    Decoding(String),

    #[error("Failed to encode request: {0}")]
    Encoding(String),

    #[error("Unauthorized access. Check your API key.")]
    Unauthorized,

    #[error("Resource not found.")]
    NotFound,

    #[error("Server error with status code: {0}")]
    Server(u16),

    #[error("No data received from server.")]
    NoData,

    #[error("Invalid response from server.")]
    InvalidResponse,
}

impl Error {
    /// Map a non-success HTTP status code to its error variant
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            code => Self::Server(code),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(Error::from_status(401), Error::Unauthorized);
        assert_eq!(Error::from_status(404), Error::NotFound);
        assert_eq!(Error::from_status(500), Error::Server(500));
        assert_eq!(Error::from_status(418), Error::Server(418));
    }

    #[test]
    fn test_messages_are_readable() {
        assert_eq!(
            Error::Server(503).to_string(),
            "Server error with status code: 503"
        );
        assert_eq!(
            Error::InvalidData("Task ID is missing".into()).to_string(),
            "Invalid data: Task ID is missing"
        );
    }
}
