// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Bounded, session-local history of submitted lines with Up/Down browsing.

use std::collections::VecDeque;

/// Default cap on retained entries.
pub const HISTORY_SIZE_MAX: usize = 1_000;

/// Submitted lines, newest first, plus the browsing state for Up/Down
/// recall.
///
/// Browsing is a detour from live editing: the first `ArrowUp` stashes the
/// in-progress line, and stepping past the newest entry with `ArrowDown`
/// restores it. Submitting a line ends any browse in progress.
#[derive(Debug)]
pub struct History {
    /// Entries in recency order: index 0 is the most recent submission.
    entries: VecDeque<String>,

    max_size: usize,

    /// Index of the entry currently shown while browsing, `None` when the
    /// user is editing the live line.
    position: Option<usize>,

    /// The live line as it was when browsing started, restored when the
    /// user steps back past the newest entry.
    stash: Option<String>,
}

impl Default for History {
    fn default() -> Self {
        History {
            entries: VecDeque::new(),
            max_size: HISTORY_SIZE_MAX,
            position: None,
            stash: None,
        }
    }
}

impl History {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Record a submitted line. Empty lines and lines identical to the most
    /// recent entry are skipped. Any browse in progress ends.
    pub fn append(&mut self, entry: &str) {
        self.reset_browse();

        if entry.is_empty() {
            return;
        }
        if self.entries.front().is_some_and(|last| last == entry) {
            return;
        }

        self.entries.push_front(entry.to_owned());
        self.entries.truncate(self.max_size);
    }

    /// Change the retention cap, evicting the oldest entries if the history
    /// already exceeds it.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.entries.truncate(max_size);
    }

    /// Step to the next-older entry (`ArrowUp`).
    ///
    /// On the first step this stashes `live_line`, the line being edited.
    /// Returns the text to display, or `None` when there is nothing older
    /// (empty history, or already at the oldest entry).
    pub fn browse_older(&mut self, live_line: &str) -> Option<String> {
        match self.position {
            None => {
                let entry = self.entries.front()?;
                self.stash = Some(live_line.to_owned());
                self.position = Some(0);
                Some(entry.clone())
            }
            Some(index) => {
                let older = index + 1;
                let entry = self.entries.get(older)?;
                self.position = Some(older);
                Some(entry.clone())
            }
        }
    }

    /// Step to the next-newer entry (`ArrowDown`).
    ///
    /// Stepping past the newest entry ends the browse and returns the
    /// stashed live line. Returns `None` when not browsing.
    pub fn browse_newer(&mut self) -> Option<String> {
        match self.position? {
            0 => {
                self.position = None;
                Some(self.stash.take().unwrap_or_default())
            }
            index => {
                let newer = index - 1;
                self.position = Some(newer);
                self.entries.get(newer).cloned()
            }
        }
    }

    /// Abandon any browse in progress and drop the stashed line.
    pub fn reset_browse(&mut self) {
        self.position = None;
        self.stash = None;
    }
}

#[cfg(test)]
mod tests_append {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn newest_entry_is_first() {
        let mut history = History::new();
        history.append("one");
        history.append("two");

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries.front().map(String::as_str), Some("two"));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let mut history = History::new();
        history.append("");

        assert!(history.is_empty());
    }

    #[test]
    fn consecutive_duplicates_are_skipped() {
        let mut history = History::new();
        history.append("ls");
        history.append("ls");

        assert_eq!(history.len(), 1);
    }

    #[test]
    fn non_consecutive_duplicates_are_kept() {
        let mut history = History::new();
        history.append("ls");
        history.append("pwd");
        history.append("ls");

        assert_eq!(history.len(), 3);
    }

    #[test]
    fn oldest_entries_are_evicted_at_cap() {
        let mut history = History::new();
        history.set_max_size(2);
        history.append("one");
        history.append("two");
        history.append("three");

        assert_eq!(history.len(), 2);
        // "one" was evicted; the oldest remaining entry is "two".
        assert_eq!(history.entries.back().map(String::as_str), Some("two"));
    }

    #[test]
    fn shrinking_the_cap_evicts_immediately() {
        let mut history = History::new();
        history.append("one");
        history.append("two");
        history.append("three");

        history.set_max_size(1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries.front().map(String::as_str), Some("three"));
    }
}
