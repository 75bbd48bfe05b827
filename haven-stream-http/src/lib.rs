#![doc = include_str!("../README.md")]

pub(crate) mod error;
pub mod response;

pub use response::{send, stream_response};

// Re-export haven-stream for convenience
pub use haven_stream::{
    CancellationToken, CollectedReply, DecoderConfig, Preset, ReplyEvent, ReplyStream,
    StreamOutcome, TransportError,
};
