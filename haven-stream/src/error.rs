//! Error types for reply stream decoding.

use std::error::Error as StdError;

/// Errors from the transport that delivers the response body.
///
/// Any of these ends a session with [`StreamOutcome::Failed`](crate::StreamOutcome::Failed).
/// The decoder never retries; [`TransportError::is_retryable`] is a hint for
/// the calling layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The byte source failed while the body was being read.
    #[error("stream read error: {0}")]
    Read(#[source] Box<dyn StdError + Send + Sync>),
    /// The server answered with a non-success status before any body was read.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("request failed: {0}")]
    Request(#[source] Box<dyn StdError + Send + Sync>),
}

impl TransportError {
    /// Wrap a byte source error.
    pub fn read(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Read(err.into())
    }

    /// Whether the same request could reasonably succeed if sent again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Read(_) | Self::Request(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..=599).contains(status),
        }
    }
}

/// Why a single event payload produced no fragment.
///
/// Payload errors are absorbed by the session: they are counted in
/// [`SessionStats::malformed_payloads`](crate::SessionStats::malformed_payloads)
/// and logged, never surfaced as an outcome.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The payload bytes are not UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// The payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> TransportError {
        TransportError::Status {
            status: code,
            body: "body".into(),
        }
    }

    #[test]
    fn read_errors_are_retryable() {
        let err = TransportError::read(std::io::Error::other("connection reset"));
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "stream read error: connection reset");
    }

    #[test]
    fn server_and_rate_limit_statuses_are_retryable() {
        assert!(status(429).is_retryable());
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
    }

    #[test]
    fn client_statuses_are_not_retryable() {
        assert!(!status(400).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn status_display_includes_code_and_body() {
        let err = TransportError::Status {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn read_error_keeps_source() {
        let err = TransportError::read(std::io::Error::other("eof"));
        let source = StdError::source(&err).expect("source should be set");
        assert_eq!(source.to_string(), "eof");
    }

    #[test]
    fn payload_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PayloadError::from(json_err);
        assert!(err.to_string().starts_with("payload is not valid JSON"));
    }
}
