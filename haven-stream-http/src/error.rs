//! Internal error helpers for mapping HTTP/reqwest errors to [`TransportError`].

use haven_stream::TransportError;

/// Map a non-success HTTP status and its body to a [`TransportError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> TransportError {
    TransportError::Status {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] raised while sending to a [`TransportError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    TransportError::Request(Box::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_body_are_kept() {
        let err = map_http_status(reqwest::StatusCode::UNAUTHORIZED, "invalid api key");
        assert!(matches!(
            err,
            TransportError::Status { status: 401, ref body } if body == "invalid api key"
        ));
    }

    #[test]
    fn status_5xx_is_retryable() {
        let err = map_http_status(reqwest::StatusCode::BAD_GATEWAY, "bad gateway");
        assert!(err.is_retryable());
    }

    #[test]
    fn status_429_is_retryable() {
        let err = map_http_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.is_retryable());
    }

    #[test]
    fn status_400_is_not_retryable() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad body");
        assert!(!err.is_retryable());
    }

    #[test]
    fn empty_body_preserved_in_error() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "");
        assert!(matches!(err, TransportError::Status { ref body, .. } if body.is_empty()));
    }
}
