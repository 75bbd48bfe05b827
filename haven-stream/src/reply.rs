//! Caller-side folding of fragments into displayable reply text.

use crate::decoder::SessionStats;
use crate::session::StreamOutcome;

/// Shown in place of a reply when the session failed before any text arrived.
pub const FAILURE_NOTICE: &str = "Sorry, I couldn't get a response right now. Please try again.";

/// Accumulated reply text.
///
/// Folded by value: [`Reply::push`] consumes the reply and returns the
/// extended one, so a renderer can keep the previous value as a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    text: String,
    fragments: usize,
}

impl Reply {
    /// An empty reply.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment.
    #[must_use]
    pub fn push(mut self, fragment: &str) -> Self {
        self.text.push_str(fragment);
        self.fragments += 1;
        self
    }

    /// Text received so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of fragments folded in.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Whether no fragment has arrived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments == 0
    }

    /// What to show the user once the session has ended.
    ///
    /// Partial content is always kept. Only a failure with nothing received
    /// is replaced by [`FAILURE_NOTICE`].
    #[must_use]
    pub fn display_text(&self, outcome: &StreamOutcome) -> &str {
        if outcome.is_failed() && self.is_empty() {
            FAILURE_NOTICE
        } else {
            &self.text
        }
    }

    /// Consume the reply, returning its text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Everything a finished session produced.
#[derive(Debug)]
pub struct CollectedReply {
    /// The folded fragments.
    pub reply: Reply,
    /// How the session ended.
    pub outcome: StreamOutcome,
    /// Session counters.
    pub stats: SessionStats,
}

impl CollectedReply {
    /// Text to show the user. See [`Reply::display_text`].
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.reply.display_text(&self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    fn failed() -> StreamOutcome {
        StreamOutcome::Failed(TransportError::read(std::io::Error::other("reset")))
    }

    #[test]
    fn push_folds_in_order() {
        let reply = Reply::new().push("Hi").push(" there");
        assert_eq!(reply.text(), "Hi there");
        assert_eq!(reply.fragment_count(), 2);
    }

    #[test]
    fn earlier_snapshot_is_unchanged() {
        let first = Reply::new().push("Hi");
        let second = first.clone().push("!");
        assert_eq!(first.text(), "Hi");
        assert_eq!(second.text(), "Hi!");
    }

    #[test]
    fn failure_with_no_text_shows_notice() {
        assert_eq!(Reply::new().display_text(&failed()), FAILURE_NOTICE);
    }

    #[test]
    fn failure_after_text_keeps_partial_content() {
        let reply = Reply::new().push("Call 911 if");
        assert_eq!(reply.display_text(&failed()), "Call 911 if");
    }

    #[test]
    fn cancelled_or_empty_completion_shows_what_arrived() {
        let reply = Reply::new();
        assert_eq!(reply.display_text(&StreamOutcome::Cancelled), "");
        assert_eq!(
            reply.display_text(&StreamOutcome::Completed { partial: false }),
            ""
        );
    }
}
