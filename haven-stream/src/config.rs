//! Decoder configuration and provider presets.

use serde::{Deserialize, Serialize};

use crate::event::EventFilter;
use crate::extract::FragmentExtractor;

/// Event prefix used by server-sent event streams.
pub const SSE_DATA_PREFIX: &str = "data:";

/// End-of-stream literal used by OpenAI-compatible chat streams.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Wire formats the decoder knows out of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// OpenAI-compatible chat completions: `data:` events, `[DONE]` marker,
    /// text at `choices[0].delta.content`.
    #[default]
    OpenAi,
    /// Anthropic messages: `data:` events, no marker, text at `delta.text`.
    Anthropic,
    /// Gemini `streamGenerateContent?alt=sse`: `data:` events, no marker,
    /// text at `candidates[0].content.parts[0].text`.
    Gemini,
    /// Ollama chat: bare JSON lines, no marker, text at `message.content`.
    Ollama,
}

impl Preset {
    /// JSON pointer to the incremental text for this format.
    #[must_use]
    pub fn text_pointer(self) -> &'static str {
        match self {
            Self::OpenAi => "/choices/0/delta/content",
            Self::Anthropic => "/delta/text",
            Self::Gemini => "/candidates/0/content/parts/0/text",
            Self::Ollama => "/message/content",
        }
    }
}

/// How a session frames, terminates and extracts.
///
/// Defaults to [`Preset::OpenAi`].
///
/// # Example
///
/// ```
/// use haven_stream::{DecoderConfig, FragmentExtractor, Preset};
///
/// let config = DecoderConfig::preset(Preset::OpenAi)
///     .sentinel("[END]")
///     .extractor(FragmentExtractor::pointer("/choices/0/text"));
/// assert_eq!(config.sentinel_literal(), Some("[END]"));
/// ```
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub(crate) prefix: Option<String>,
    pub(crate) sentinel: Option<String>,
    pub(crate) extractor: FragmentExtractor,
}

impl DecoderConfig {
    /// Configuration for OpenAI-compatible streams.
    #[must_use]
    pub fn new() -> Self {
        Self::preset(Preset::OpenAi)
    }

    /// Configuration for a known wire format.
    #[must_use]
    pub fn preset(preset: Preset) -> Self {
        let (prefix, sentinel) = match preset {
            Preset::OpenAi => (Some(SSE_DATA_PREFIX), Some(DONE_SENTINEL)),
            Preset::Anthropic | Preset::Gemini => (Some(SSE_DATA_PREFIX), None),
            Preset::Ollama => (None, None),
        };
        Self {
            prefix: prefix.map(str::to_owned),
            sentinel: sentinel.map(str::to_owned),
            extractor: FragmentExtractor::pointer(preset.text_pointer()),
        }
    }

    /// Only frames starting with `prefix` carry payloads.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Treat every non-blank frame as a payload.
    #[must_use]
    pub fn no_prefix(mut self) -> Self {
        self.prefix = None;
        self
    }

    /// End the stream when a payload equals `sentinel`.
    #[must_use]
    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = Some(sentinel.into());
        self
    }

    /// The stream only ends when the source closes.
    #[must_use]
    pub fn no_sentinel(mut self) -> Self {
        self.sentinel = None;
        self
    }

    /// Override how text is found in each payload.
    #[must_use]
    pub fn extractor(mut self, extractor: FragmentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// The configured event prefix.
    #[must_use]
    pub fn prefix_literal(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The configured end-of-stream literal.
    #[must_use]
    pub fn sentinel_literal(&self) -> Option<&str> {
        self.sentinel.as_deref()
    }

    pub(crate) fn event_filter(&self) -> EventFilter {
        EventFilter::new(self.prefix.as_deref(), self.sentinel.as_deref())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Preset> for DecoderConfig {
    fn from(preset: Preset) -> Self {
        Self::preset(preset)
    }
}
