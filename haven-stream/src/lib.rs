#![doc = include_str!("../README.md")]

pub mod buffer;
pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod extract;
pub mod reply;
pub mod session;

pub use buffer::FrameBuffer;
pub use config::{DONE_SENTINEL, DecoderConfig, Preset, SSE_DATA_PREFIX};
pub use decoder::{Decoder, SessionStats, Step};
pub use error::{PayloadError, TransportError};
pub use event::{Event, EventFilter};
pub use extract::{ExtractFn, FragmentExtractor};
pub use reply::{CollectedReply, FAILURE_NOTICE, Reply};
pub use session::{ReplyEvent, ReplyStream, SessionState, StreamOutcome};

// Re-exported so callers can cancel without a direct tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
