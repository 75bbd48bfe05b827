//! Frame classification: event prefix and end-of-stream sentinel.

/// What a single frame means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// The end-of-stream marker. Nothing after it is decoded.
    Sentinel,
    /// A payload candidate with the prefix removed.
    Payload(&'a [u8]),
    /// Keep-alives, comments, blank lines and any other framing noise.
    Ignorable,
}

/// Classifies frames by a fixed prefix and a fixed sentinel literal.
///
/// With a prefix, only frames starting with it carry payloads; one space
/// after the prefix is dropped if present (`data: x` and `data:x` are the
/// same event). Without a prefix, every non-blank frame is a payload. A
/// trailing `\r` is dropped first so CRLF-delimited streams decode the same.
/// A frame with nothing but whitespace after the prefix (a bare `data:`) is
/// [`Event::Ignorable`], so it never reaches the extractor and is not
/// counted as a malformed payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    prefix: Option<Vec<u8>>,
    sentinel: Option<Vec<u8>>,
}

impl EventFilter {
    /// Create a filter for the given prefix and sentinel.
    #[must_use]
    pub fn new(prefix: Option<&str>, sentinel: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(|p| p.as_bytes().to_vec()),
            sentinel: sentinel.map(|s| s.as_bytes().to_vec()),
        }
    }

    /// Whether a sentinel literal is configured.
    #[must_use]
    pub fn has_sentinel(&self) -> bool {
        self.sentinel.is_some()
    }

    /// Classify one frame.
    #[must_use]
    pub fn classify<'a>(&self, frame: &'a [u8]) -> Event<'a> {
        let line = frame.strip_suffix(b"\r").unwrap_or(frame);

        let candidate = match &self.prefix {
            Some(prefix) => match line.strip_prefix(prefix.as_slice()) {
                Some(rest) => rest.strip_prefix(b" ").unwrap_or(rest),
                None => return Event::Ignorable,
            },
            None => line,
        };

        if candidate.iter().all(u8::is_ascii_whitespace) {
            return Event::Ignorable;
        }
        if self.sentinel.as_deref() == Some(candidate) {
            return Event::Sentinel;
        }
        Event::Payload(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sse() -> EventFilter {
        EventFilter::new(Some("data:"), Some("[DONE]"))
    }

    #[test]
    fn strips_prefix_and_one_space() {
        assert_eq!(sse().classify(b"data: {}"), Event::Payload(b"{}"));
        assert_eq!(sse().classify(b"data:{}"), Event::Payload(b"{}"));
        assert_eq!(sse().classify(b"data:  {}"), Event::Payload(b" {}"));
    }

    #[test]
    fn sentinel_is_recognized_with_or_without_space() {
        assert_eq!(sse().classify(b"data: [DONE]"), Event::Sentinel);
        assert_eq!(sse().classify(b"data:[DONE]"), Event::Sentinel);
        assert_eq!(sse().classify(b"data: [DONE]\r"), Event::Sentinel);
    }

    #[test]
    fn sentinel_must_match_exactly() {
        assert_eq!(sse().classify(b"data: [DONE] "), Event::Payload(b"[DONE] "));
        assert_eq!(sse().classify(b"data: [done]"), Event::Payload(b"[done]"));
    }

    #[test]
    fn noise_is_ignorable() {
        let filter = sse();
        assert_eq!(filter.classify(b""), Event::Ignorable);
        assert_eq!(filter.classify(b"\r"), Event::Ignorable);
        assert_eq!(filter.classify(b": keep-alive"), Event::Ignorable);
        assert_eq!(filter.classify(b"event: message"), Event::Ignorable);
        assert_eq!(filter.classify(b"id: 42"), Event::Ignorable);
        assert_eq!(filter.classify(b"data:"), Event::Ignorable);
        assert_eq!(filter.classify(b"data: "), Event::Ignorable);
    }

    #[test]
    fn crlf_is_trimmed_from_payloads() {
        assert_eq!(sse().classify(b"data: {\"a\":1}\r"), Event::Payload(b"{\"a\":1}"));
    }

    #[test]
    fn no_prefix_treats_every_line_as_payload() {
        let filter = EventFilter::new(None, None);
        assert_eq!(filter.classify(b"{\"done\":false}"), Event::Payload(b"{\"done\":false}"));
        assert_eq!(filter.classify(b"   "), Event::Ignorable);
        assert!(!filter.has_sentinel());
    }

    #[test]
    fn no_sentinel_passes_marker_through() {
        let filter = EventFilter::new(Some("data:"), None);
        assert_eq!(filter.classify(b"data: [DONE]"), Event::Payload(b"[DONE]"));
    }
}
