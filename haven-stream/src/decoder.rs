//! Synchronous decode pipeline: buffer, frame, classify, extract.
//!
//! [`Decoder`] holds no I/O. Feed it bytes, then pull [`Step`]s until it
//! returns `None`. The async session in [`crate::session`] drives one of
//! these per response.

use serde::{Deserialize, Serialize};

use crate::buffer::FrameBuffer;
use crate::config::DecoderConfig;
use crate::event::{Event, EventFilter};
use crate::extract::FragmentExtractor;

/// Something the caller has to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Incremental reply text, never empty.
    Fragment(String),
    /// The end-of-stream marker was seen.
    Sentinel,
}

/// Counters for one decode session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Bytes received from the source.
    pub bytes_read: u64,
    /// Complete frames decoded, including ignorable ones.
    pub frames: u64,
    /// Frames dropped as keep-alives or framing noise.
    pub ignored_frames: u64,
    /// Fragments extracted from payloads.
    pub fragments_extracted: u64,
    /// Payloads skipped because they were not UTF-8 JSON.
    pub malformed_payloads: u64,
}

/// Incremental decoder over an arbitrarily chunked byte stream.
#[derive(Debug)]
pub struct Decoder {
    buffer: FrameBuffer,
    filter: EventFilter,
    extractor: FragmentExtractor,
    stats: SessionStats,
    ended: bool,
}

impl Decoder {
    /// Create a decoder with an empty buffer.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            buffer: FrameBuffer::new(),
            filter: config.event_filter(),
            extractor: config.extractor,
            stats: SessionStats::default(),
            ended: false,
        }
    }

    /// Buffer a chunk. Ignored once the sentinel has been seen.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.ended {
            return;
        }
        self.stats.bytes_read += chunk.len() as u64;
        self.buffer.append(chunk);
    }

    /// Decode buffered frames until one yields a [`Step`].
    ///
    /// Returns `None` when only a partial frame (or nothing) is left. After
    /// [`Step::Sentinel`] the buffer is discarded and this always returns
    /// `None`.
    pub fn next_step(&mut self) -> Option<Step> {
        while !self.ended {
            let frame = self.buffer.next_frame()?;
            if let Some(step) = self.decode_frame(&frame) {
                return Some(step);
            }
        }
        None
    }

    /// Decode the unterminated tail left when the source closed.
    pub fn finish(&mut self) -> Option<Step> {
        if self.ended {
            return None;
        }
        let tail = self.buffer.take_remainder()?;
        self.decode_frame(&tail)
    }

    /// Whether a sentinel literal is configured.
    #[must_use]
    pub fn expects_sentinel(&self) -> bool {
        self.filter.has_sentinel()
    }

    /// Whether the sentinel has been seen.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    fn decode_frame(&mut self, frame: &[u8]) -> Option<Step> {
        self.stats.frames += 1;
        match self.filter.classify(frame) {
            Event::Ignorable => {
                self.stats.ignored_frames += 1;
                None
            }
            Event::Sentinel => {
                self.ended = true;
                self.buffer.clear();
                tracing::debug!(frames = self.stats.frames, "end-of-stream marker received");
                Some(Step::Sentinel)
            }
            Event::Payload(payload) => match self.extractor.extract(payload) {
                Ok(Some(text)) => {
                    self.stats.fragments_extracted += 1;
                    Some(Step::Fragment(text))
                }
                Ok(None) => None,
                Err(err) => {
                    self.stats.malformed_payloads += 1;
                    tracing::warn!(
                        error = %err,
                        payload_len = payload.len(),
                        "skipping malformed stream payload"
                    );
                    None
                }
            },
        }
    }
}
