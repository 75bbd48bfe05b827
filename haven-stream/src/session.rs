//! Decode sessions: one response body in, reply fragments out.
//!
//! A [`ReplyStream`] is bound to one byte source when constructed and does
//! nothing until first polled. It yields [`ReplyEvent::Fragment`]s in wire
//! order, then exactly one [`ReplyEvent::Finished`], then ends.
//!
//! The source is only polled when the caller asks for the next event and
//! every buffered fragment has been handed out, so a slow consumer never
//! causes read-ahead. Cancellation goes through a [`CancellationToken`]; it is
//! checked before every fragment is emitted and raced against every pending
//! read. The source is dropped before the terminal event is emitted.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::config::DecoderConfig;
use crate::decoder::{Decoder, SessionStats, Step};
use crate::error::TransportError;
use crate::reply::{CollectedReply, Reply};

/// Terminal state of a session. Produced exactly once.
#[derive(Debug)]
pub enum StreamOutcome {
    /// The sentinel was seen or the source closed cleanly.
    ///
    /// `partial` is set when a sentinel was expected but the source closed
    /// without one. Fragments already delivered are still valid.
    Completed {
        /// The stream ended without its end-of-stream marker.
        partial: bool,
    },
    /// The caller cancelled. Fragments already delivered stand.
    Cancelled,
    /// The byte source failed.
    Failed(TransportError),
}

impl StreamOutcome {
    /// Whether the session completed, partially or not.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Whether the stream ended without its expected marker.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Completed { partial: true })
    }

    /// Whether the session was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the transport failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The session state this outcome leaves behind.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self {
            Self::Completed { .. } => SessionState::Completed,
            Self::Cancelled => SessionState::Cancelled,
            Self::Failed(_) => SessionState::Failed,
        }
    }
}

/// Lifecycle of a [`ReplyStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, not yet polled.
    Idle,
    /// Polled at least once, no outcome yet.
    Streaming,
    /// Terminal: sentinel or clean end of source.
    Completed,
    /// Terminal: the caller cancelled.
    Cancelled,
    /// Terminal: the source failed.
    Failed,
}

impl SessionState {
    /// Whether no further events will be produced.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// An item produced by a [`ReplyStream`].
#[derive(Debug)]
pub enum ReplyEvent {
    /// Incremental reply text.
    Fragment(String),
    /// The session ended. Always the last event.
    Finished {
        /// How it ended.
        outcome: StreamOutcome,
        /// Counters for the whole session.
        stats: SessionStats,
    },
}

/// Handle to a lazily-driven decode session.
///
/// Implements [`Stream`] with `Item = ReplyEvent`.
pub struct ReplyStream {
    receiver: Pin<Box<dyn Stream<Item = ReplyEvent> + Send>>,
    state: SessionState,
    token: CancellationToken,
}

impl ReplyStream {
    /// Bind a session to a byte source with a fresh cancellation token.
    ///
    /// The source is any stream of byte chunks, such as
    /// `reqwest::Response::bytes_stream()`.
    #[must_use]
    pub fn new<S, E>(source: S, config: DecoderConfig) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::with_cancellation(source, config, CancellationToken::new())
    }

    /// Bind a session to a byte source, cancelled through `token`.
    #[must_use]
    pub fn with_cancellation<S, E>(
        source: S,
        config: DecoderConfig,
        token: CancellationToken,
    ) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let receiver = decode_stream(source, config, token.clone());
        Self {
            receiver: Box::pin(receiver),
            state: SessionState::Idle,
            token,
        }
    }

    /// A session that fails without reading anything.
    ///
    /// Used when the transport failed before a body was available.
    #[must_use]
    pub fn failed(error: TransportError) -> Self {
        tracing::debug!(error = %error, "reply stream failed before body");
        let finished = ReplyEvent::Finished {
            outcome: StreamOutcome::Failed(error),
            stats: SessionStats::default(),
        };
        Self {
            receiver: Box::pin(futures::stream::iter([finished])),
            state: SessionState::Idle,
            token: CancellationToken::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Request cancellation. Takes effect at the next step of the session.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// A token that cancels this session when triggered.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Drive the session to its end, folding fragments into a [`Reply`].
    ///
    /// Returns `None` when the `Finished` event was already taken by an
    /// earlier poll; the outcome is delivered once and is not replayed.
    /// [`ReplyStream::state`] still reports how that session ended.
    pub async fn collect_reply(mut self) -> Option<CollectedReply> {
        let mut reply = Reply::new();
        while let Some(event) = self.next().await {
            match event {
                ReplyEvent::Fragment(text) => reply = reply.push(&text),
                ReplyEvent::Finished { outcome, stats } => {
                    return Some(CollectedReply {
                        reply,
                        outcome,
                        stats,
                    });
                }
            }
        }
        None
    }
}

impl Stream for ReplyStream {
    type Item = ReplyEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state == SessionState::Idle {
            this.state = SessionState::Streaming;
        }
        let polled = this.receiver.as_mut().poll_next(cx);
        if let Poll::Ready(Some(ReplyEvent::Finished { outcome, .. })) = &polled {
            this.state = outcome.state();
        }
        polled
    }
}

impl std::fmt::Debug for ReplyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyStream")
            .field("state", &self.state)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// The session loop.
///
/// Buffered frames are fully drained before the next read, and each read is
/// raced against cancellation with cancellation taking priority.
fn decode_stream<S, E>(
    source: S,
    config: DecoderConfig,
    token: CancellationToken,
) -> impl Stream<Item = ReplyEvent> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::stream! {
        let mut decoder = Decoder::new(config);
        let mut source = Box::pin(source);
        tracing::debug!(expects_sentinel = decoder.expects_sentinel(), "reply stream started");

        let outcome = 'session: loop {
            while let Some(step) = decoder.next_step() {
                if token.is_cancelled() {
                    break 'session StreamOutcome::Cancelled;
                }
                match step {
                    Step::Fragment(text) => {
                        yield ReplyEvent::Fragment(text);
                    }
                    Step::Sentinel => break 'session StreamOutcome::Completed { partial: false },
                }
            }

            let next = tokio::select! {
                biased;
                () = token.cancelled() => None,
                chunk = source.next() => Some(chunk),
            };

            match next {
                None => break StreamOutcome::Cancelled,
                Some(Some(Ok(chunk))) => {
                    tracing::trace!(len = chunk.len(), "stream chunk received");
                    decoder.feed(&chunk);
                }
                Some(Some(Err(err))) => break StreamOutcome::Failed(TransportError::read(err)),
                Some(None) => match decoder.finish() {
                    Some(Step::Sentinel) => break StreamOutcome::Completed { partial: false },
                    Some(Step::Fragment(text)) => {
                        if token.is_cancelled() {
                            break StreamOutcome::Cancelled;
                        }
                        yield ReplyEvent::Fragment(text);
                        break StreamOutcome::Completed { partial: decoder.expects_sentinel() };
                    }
                    None => break StreamOutcome::Completed { partial: decoder.expects_sentinel() },
                },
            }
        };

        // Release the transport before reporting the outcome.
        drop(source);

        let stats = decoder.stats();
        match &outcome {
            StreamOutcome::Failed(err) => {
                tracing::debug!(
                    error = %err,
                    fragments = stats.fragments_extracted,
                    "reply stream failed"
                );
            }
            other => {
                tracing::debug!(
                    outcome = ?other,
                    fragments = stats.fragments_extracted,
                    "reply stream finished"
                );
            }
        }
        yield ReplyEvent::Finished { outcome, stats };
    }
}
