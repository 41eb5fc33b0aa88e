//! Search debouncing
//!
//! Keystrokes arm a single-slot timer. Arming again before it fires
//! invalidates the earlier slot, so only the text present when the last
//! timer expires is committed. The controller does not own a clock: it hands
//! out a [`DebounceTicket`] and whoever drives the select reports back when
//! the ticket's delay has elapsed.

use std::time::Duration;

/// A scheduled commit; only the most recent ticket can still commit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceTicket {
    pub generation: u64,
    pub delay: Duration,
}

#[derive(Clone, Debug)]
struct PendingCommit {
    generation: u64,
    text: String,
}

/// Owns the pending and committed search query
#[derive(Clone, Debug)]
pub struct SearchController {
    delay: Duration,
    generation: u64,
    pending: Option<PendingCommit>,
    committed: Option<String>,
}

impl SearchController {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
            committed: None,
        }
    }

    /// Record a keystroke and (re)arm the debounce slot
    pub fn on_query_text_changed(&mut self, text: impl Into<String>) -> DebounceTicket {
        self.generation += 1;
        self.pending = Some(PendingCommit {
            generation: self.generation,
            text: text.into(),
        });
        DebounceTicket {
            generation: self.generation,
            delay: self.delay,
        }
    }

    /// The debounce timer for `generation` expired
    ///
    /// Returns the newly committed query, or `None` if the ticket was
    /// superseded or cancelled.
    pub fn fire(&mut self, generation: u64) -> Option<Option<String>> {
        match self.pending.take() {
            Some(pending) if pending.generation == generation => {
                self.committed = Some(pending.text);
                tracing::debug!("Search query committed: {:?}", self.committed);
                Some(self.committed.clone())
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Commit `query` immediately, dropping any pending keystrokes
    pub fn commit_now(&mut self, query: Option<String>) -> Option<String> {
        self.cancel();
        self.committed = query;
        tracing::debug!("Search query committed immediately: {:?}", self.committed);
        self.committed.clone()
    }

    /// Invalidate the armed slot without committing
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a keystroke is waiting for its debounce window
    pub fn is_typing(&self) -> bool {
        self.pending.is_some()
    }

    /// The last committed query
    pub fn committed(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_keystroke_commits() {
        let mut search = SearchController::new(Duration::from_millis(500));

        let jo = search.on_query_text_changed("jo");
        let john = search.on_query_text_changed("john");
        assert_eq!(john.delay, Duration::from_millis(500));
        assert!(search.is_typing());

        // The superseded timer fires first and must not commit
        assert_eq!(search.fire(jo.generation), None);
        assert!(search.is_typing());

        assert_eq!(search.fire(john.generation), Some(Some("john".to_string())));
        assert_eq!(search.committed(), Some("john"));
        assert!(!search.is_typing());

        // Firing twice commits once
        assert_eq!(search.fire(john.generation), None);
    }

    #[test]
    fn test_commit_now_cancels_pending() {
        let mut search = SearchController::new(Duration::from_millis(500));
        let ticket = search.on_query_text_changed("abc");

        assert_eq!(search.commit_now(None), None);
        assert_eq!(search.committed(), None);
        assert_eq!(search.fire(ticket.generation), None);
    }

    #[test]
    fn test_empty_text_commits_empty_query() {
        let mut search = SearchController::new(Duration::from_millis(10));
        let ticket = search.on_query_text_changed("");
        assert_eq!(search.fire(ticket.generation), Some(Some(String::new())));
    }
}
