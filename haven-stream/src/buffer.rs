//! Byte accumulation and line framing.
//!
//! Transports deliver bytes in arbitrary spans. [`FrameBuffer`] collects them
//! and hands back complete `\n`-terminated lines, keeping any unterminated
//! tail until more bytes arrive.

use bytes::{Bytes, BytesMut};

const NEWLINE: u8 = b'\n';

/// Growing byte buffer that yields complete lines.
///
/// After every call to [`FrameBuffer::drain_frames`] the buffer holds at most
/// one partial line: no newline byte remains buffered.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: BytesMut,
    /// Prefix of `buf` already known to contain no newline.
    scanned: usize,
}

impl FrameBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes at the tail.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Remove and return the next complete line, without its delimiter.
    ///
    /// Returns `None` when no newline is buffered. Two consecutive newlines
    /// produce an empty frame.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == NEWLINE) else {
            self.scanned = self.buf.len();
            return None;
        };
        let end = self.scanned + offset;
        self.scanned = 0;

        let mut frame = self.buf.split_to(end + 1);
        frame.truncate(end);
        Some(frame.freeze())
    }

    /// Remove and return every complete line currently buffered.
    pub fn drain_frames(&mut self) -> Vec<Bytes> {
        std::iter::from_fn(|| self.next_frame()).collect()
    }

    /// Take the unterminated tail, if any.
    ///
    /// Used once the source has ended so a final line that lacks its newline
    /// is not lost.
    pub fn take_remainder(&mut self) -> Option<Bytes> {
        self.scanned = 0;
        if self.buf.is_empty() {
            return None;
        }
        Some(self.buf.split().freeze())
    }

    /// Discard everything buffered.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames_of(buffer: &mut FrameBuffer) -> Vec<String> {
        buffer
            .drain_frames()
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }

    #[test]
    fn splits_complete_lines() {
        let mut buffer = FrameBuffer::new();
        buffer.append(b"one\ntwo\n");
        assert_eq!(frames_of(&mut buffer), vec!["one", "two"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn keeps_partial_tail_until_completed() {
        let mut buffer = FrameBuffer::new();
        buffer.append(b"data: {\"a\"");
        assert!(buffer.drain_frames().is_empty());
        assert_eq!(buffer.len(), 10);

        buffer.append(b":1}\nda");
        assert_eq!(frames_of(&mut buffer), vec!["data: {\"a\":1}"]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn consecutive_newlines_yield_empty_frames() {
        let mut buffer = FrameBuffer::new();
        buffer.append(b"a\n\n\nb\n");
        assert_eq!(frames_of(&mut buffer), vec!["a", "", "", "b"]);
    }

    #[test]
    fn draining_twice_without_input_yields_nothing() {
        let mut buffer = FrameBuffer::new();
        buffer.append(b"a\nb\npartial");
        assert_eq!(buffer.drain_frames().len(), 2);
        assert!(buffer.drain_frames().is_empty());
        assert!(buffer.drain_frames().is_empty());
        assert_eq!(buffer.len(), 7);
    }

    #[test]
    fn byte_at_a_time_frames_match_whole_input() {
        let input = b"first line\nsecond\n\nthird";
        let mut buffer = FrameBuffer::new();
        let mut frames = Vec::new();
        for byte in input {
            buffer.append(std::slice::from_ref(byte));
            frames.extend(buffer.drain_frames());
        }
        let frames: Vec<&[u8]> = frames.iter().map(|f| f.as_ref()).collect();
        assert_eq!(frames, vec![&b"first line"[..], &b"second"[..], &b""[..]]);
        assert_eq!(buffer.take_remainder().as_deref(), Some(&b"third"[..]));
    }

    #[test]
    fn remainder_is_none_when_empty() {
        let mut buffer = FrameBuffer::new();
        buffer.append(b"done\n");
        buffer.drain_frames();
        assert!(buffer.take_remainder().is_none());
    }

    #[test]
    fn newline_after_long_partial_is_found() {
        let mut buffer = FrameBuffer::new();
        buffer.append(b"abc");
        assert!(buffer.next_frame().is_none());
        buffer.append(b"def");
        assert!(buffer.next_frame().is_none());
        buffer.append(b"\nxyz\n");
        assert_eq!(buffer.next_frame().as_deref(), Some(&b"abcdef"[..]));
        assert_eq!(buffer.next_frame().as_deref(), Some(&b"xyz"[..]));
        assert!(buffer.next_frame().is_none());
    }

    #[test]
    fn clear_discards_partial_frame() {
        let mut buffer = FrameBuffer::new();
        buffer.append(b"partial");
        buffer.next_frame();
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.append(b"x\n");
        assert_eq!(frames_of(&mut buffer), vec!["x"]);
    }
}
