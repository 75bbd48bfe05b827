//! Turning an HTTP response into a [`ReplyStream`].
//!
//! Connection setup, headers and authentication stay with the caller, who
//! builds the [`RequestBuilder`]. This module only checks the status and
//! hands the body to the decoder.

use bytes::Bytes;
use haven_stream::{CancellationToken, DecoderConfig, ReplyStream};
use reqwest::{RequestBuilder, Response};

use crate::error::{map_http_status, map_reqwest_error};

/// Decode a response body as a reply stream.
///
/// A non-success status yields a stream that immediately finishes with
/// `StreamOutcome::Failed(TransportError::Status { .. })`, carrying the error
/// body. Reading that body is raced against `token`; if it fires first the
/// response is dropped and the stream finishes with `StreamOutcome::Cancelled`.
/// Otherwise the body is consumed lazily as the stream is polled.
pub async fn stream_response(
    response: Response,
    config: DecoderConfig,
    token: CancellationToken,
) -> ReplyStream {
    let status = response.status();
    if !status.is_success() {
        let body = tokio::select! {
            biased;
            () = token.cancelled() => return cancelled(config, token),
            body = response.text() => body.unwrap_or_default(),
        };
        tracing::debug!(status = %status, "reply request rejected");
        return ReplyStream::failed(map_http_status(status, &body));
    }

    tracing::debug!(url = %response.url(), status = %status, "streaming reply body");
    ReplyStream::with_cancellation(response.bytes_stream(), config, token)
}

/// Send a prepared request and decode its response as a reply stream.
///
/// Send failures (connect, DNS, TLS, timeout) become a stream that finishes
/// with `StreamOutcome::Failed(TransportError::Request(..))`. If `token` is
/// cancelled before the response headers arrive, the request is dropped and
/// the stream finishes with `StreamOutcome::Cancelled` without reading.
pub async fn send(
    request: RequestBuilder,
    config: DecoderConfig,
    token: CancellationToken,
) -> ReplyStream {
    let sent = tokio::select! {
        biased;
        () = token.cancelled() => None,
        result = request.send() => Some(result),
    };

    match sent {
        Some(Ok(response)) => stream_response(response, config, token).await,
        Some(Err(err)) => {
            tracing::debug!(error = %err, "reply request failed");
            ReplyStream::failed(map_reqwest_error(err))
        }
        None => cancelled(config, token),
    }
}

/// A session over an empty body whose token has already fired.
fn cancelled(config: DecoderConfig, token: CancellationToken) -> ReplyStream {
    let nothing = futures::stream::empty::<Result<Bytes, reqwest::Error>>();
    ReplyStream::with_cancellation(nothing, config, token)
}
