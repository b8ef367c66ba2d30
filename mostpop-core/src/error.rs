//! Error types for mostpop.
//!
//! Transports raise these errors and the repository surfaces them verbatim as
//! the terminal event of a result stream. Cache-internal failures use
//! [`FeedError::Serialization`] but never leave the cache.

use thiserror::Error;

/// Result type alias using `FeedError`.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Main error type for all mostpop operations.
#[derive(Debug, Error)]
pub enum FeedError {
    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The host could not be reached.
    #[error("Network request failed: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The API answered with a non-2xx status.
    #[error("The API returned an invalid response: Status Code {code}.")]
    HttpStatus {
        /// Status code returned by the server.
        code: u16,
    },

    /// The response carried no HTTP status at all.
    #[error("The API returned a non-HTTP response.")]
    NonHttpResponse,

    /// The request URL could not be built.
    #[error("The URL constructed for the API request was invalid: {0}")]
    InvalidUrl(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // DECODING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The payload did not match the expected schema.
    #[error("Failed to decode the object from the service: {0}")]
    Decode(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // AUTHENTICATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// No API key was configured.
    #[error("Missing or empty NYT_API_KEY.")]
    MissingApiKey,

    /// The API rejected the configured credential.
    #[error("The API rejected the credential: {0}")]
    Unauthorized(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A filter or one of its fields could not be parsed.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Cache payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of transport failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Unreachable host, timeout or malformed request.
    Network,
    /// Non-2xx status.
    HttpStatus,
    /// Schema mismatch.
    Decode,
    /// Missing or rejected credential.
    Auth,
}

impl FeedError {
    /// Classifies the error as a transport failure, if it is one.
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            FeedError::Network(_)
            | FeedError::Timeout(_)
            | FeedError::InvalidUrl(_)
            | FeedError::NonHttpResponse => Some(TransportErrorKind::Network),
            FeedError::HttpStatus { .. } => Some(TransportErrorKind::HttpStatus),
            FeedError::Decode(_) => Some(TransportErrorKind::Decode),
            FeedError::MissingApiKey | FeedError::Unauthorized(_) => Some(TransportErrorKind::Auth),
            FeedError::InvalidFilter(_)
            | FeedError::Serialization(_)
            | FeedError::Config(_)
            | FeedError::Io(_) => None,
        }
    }

    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            FeedError::Network(_) | FeedError::Timeout(_) => true,
            FeedError::HttpStatus { code } => *code >= 500 || *code == 429,
            _ => false,
        }
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.transport_kind() == Some(TransportErrorKind::Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeedError::HttpStatus { code: 403 };
        assert_eq!(
            err.to_string(),
            "The API returned an invalid response: Status Code 403."
        );
        assert_eq!(
            FeedError::NonHttpResponse.to_string(),
            "The API returned a non-HTTP response."
        );
        assert!(FeedError::MissingApiKey.to_string().contains("NYT_API_KEY"));
    }

    #[test]
    fn test_error_classification() {
        assert!(FeedError::Network("down".into()).is_recoverable());
        assert!(FeedError::Timeout("slow".into()).is_recoverable());
        assert!(FeedError::HttpStatus { code: 503 }.is_recoverable());
        assert!(!FeedError::HttpStatus { code: 404 }.is_recoverable());
        assert!(!FeedError::MissingApiKey.is_recoverable());

        assert!(FeedError::MissingApiKey.is_auth_error());
        assert!(FeedError::Unauthorized("401".into()).is_auth_error());
        assert!(!FeedError::Decode("bad".into()).is_auth_error());
    }

    #[test]
    fn test_transport_kind() {
        assert_eq!(
            FeedError::HttpStatus { code: 500 }.transport_kind(),
            Some(TransportErrorKind::HttpStatus)
        );
        assert_eq!(
            FeedError::Decode("x".into()).transport_kind(),
            Some(TransportErrorKind::Decode)
        );
        assert_eq!(FeedError::Config("x".into()).transport_kind(), None);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let feed_result: Result<serde_json::Value> = json_result.map_err(FeedError::from);
        assert!(matches!(feed_result, Err(FeedError::Serialization(_))));
    }
}
