// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The in-progress line of input and its cursor.
//!
//! The cursor is a *grapheme cluster* index, not a byte or `char` offset.
//! This keeps editing operations correct for text where one user-visible
//! character spans several `char`s (e.g. emoji with modifiers, combining
//! accents): Backspace removes the whole cluster, `ArrowLeft` skips over
//! it as one unit, and the renderer positions the terminal cursor by
//! display-column width rather than character count.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Editable line contents plus a cursor position in grapheme clusters.
///
/// Invariant: `0 <= cursor <= grapheme_count()` at all times. Mutating
/// methods report whether they changed anything so the caller can skip a
/// redraw when nothing moved.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    line: String,
    /// Cursor position as a grapheme cluster index into `line`.
    cursor: usize,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn contents(&self) -> &str { &self.line }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.line.is_empty() }

    /// Cursor position in grapheme clusters from the start of the line.
    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    #[must_use]
    pub fn grapheme_count(&self) -> usize { self.line.graphemes(true).count() }

    /// Byte offset in `line` where grapheme cluster `index` starts, or the
    /// end of the string when the index is past the last cluster.
    fn byte_offset(&self, index: usize) -> usize {
        self.line
            .grapheme_indices(true)
            .nth(index)
            .map_or(self.line.len(), |(offset, _)| offset)
    }

    /// Insert a character at the cursor, leaving the cursor in the cluster
    /// the character landed in.
    ///
    /// The cursor is re-derived from the insertion offset rather than
    /// adjusted by a count delta: an insertion can merge *surrounding*
    /// clusters (a combining mark joins the previous one, a ZWJ can fuse
    /// the clusters on both sides), so the total count may stay flat or
    /// even shrink.
    pub fn insert(&mut self, ch: char) {
        let offset = self.byte_offset(self.cursor);
        self.line.insert(offset, ch);
        let end_of_inserted = offset + ch.len_utf8();
        self.cursor = self.line[..end_of_inserted].graphemes(true).count();
    }

    /// Remove the grapheme cluster before the cursor (Backspace). Returns
    /// false when the cursor is at the start of the line.
    pub fn delete_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.line.replace_range(start..end, "");
        self.cursor -= 1;
        true
    }

    /// Remove the grapheme cluster at the cursor (Delete). Returns false
    /// when the cursor is at the end of the line. The cursor stays put.
    pub fn delete_at_cursor(&mut self) -> bool {
        if self.cursor >= self.grapheme_count() {
            return false;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.line.replace_range(start..end, "");
        true
    }

    /// Move the cursor by `delta` grapheme clusters, clamped to the line
    /// boundaries. Returns false when the cursor did not move.
    pub fn move_cursor(&mut self, delta: isize) -> bool {
        let count = self.grapheme_count();
        #[allow(clippy::cast_possible_wrap)]
        let new_cursor =
            (self.cursor as isize + delta).clamp(0, count as isize) as usize;
        let moved = new_cursor != self.cursor;
        self.cursor = new_cursor;
        moved
    }

    pub fn move_cursor_to_start(&mut self) -> bool {
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    pub fn move_cursor_to_end(&mut self) -> bool {
        let count = self.grapheme_count();
        let moved = self.cursor != count;
        self.cursor = count;
        moved
    }

    /// Replace the whole line and put the cursor at the end. Used when
    /// recalling a history entry.
    pub fn set_contents(&mut self, text: &str) {
        self.line.clear();
        self.line.push_str(text);
        self.cursor = self.grapheme_count();
    }

    pub fn clear(&mut self) {
        self.line.clear();
        self.cursor = 0;
    }

    /// Take the finished line out of the buffer, leaving it empty and the
    /// cursor at the start.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.line)
    }

    /// Display width of the whole line in terminal columns.
    #[must_use]
    pub fn display_width(&self) -> usize { self.line.width() }

    /// Display width of the text before the cursor, i.e. how many columns
    /// the terminal cursor sits past the prompt.
    #[must_use]
    pub fn display_width_before_cursor(&self) -> usize {
        let offset = self.byte_offset(self.cursor);
        self.line[..offset].width()
    }
}



#[cfg(test)]
mod tests_unicode {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn emoji_is_one_grapheme_two_columns() {
        let mut buf = LineBuffer::new();
        buf.set_contents("a😀b");

        assert_eq!(buf.grapheme_count(), 3);
        assert_eq!(buf.display_width(), 4); // a=1, 😀=2, b=1
    }

    #[test]
    fn backspace_removes_whole_emoji() {
        let mut buf = LineBuffer::new();
        buf.set_contents("a😀");

        assert!(buf.delete_before_cursor());
        assert_eq!(buf.contents(), "a");
    }

    #[test]
    fn arrow_skips_emoji_as_one_unit() {
        let mut buf = LineBuffer::new();
        buf.set_contents("a😀b");
        buf.move_cursor(-2); // past 'b' and the emoji

        assert_eq!(buf.cursor(), 1);
        assert_eq!(buf.display_width_before_cursor(), 1);
    }

    #[test]
    fn combining_accent_merges_into_previous_cluster() {
        let mut buf = LineBuffer::new();
        buf.insert('e');
        buf.insert('\u{0301}'); // combining acute accent

        assert_eq!(buf.grapheme_count(), 1);
        assert_eq!(buf.cursor(), 1);
        assert_eq!(buf.contents(), "e\u{0301}");
    }

    #[test]
    fn zwj_insert_merging_two_clusters_keeps_cursor_valid() {
        // ZWJ between two emoji fuses them into one cluster: the count
        // drops from 2 to 1, and the cursor must follow, not underflow.
        let mut buf = LineBuffer::new();
        buf.insert('👩');
        buf.insert('👦');
        buf.move_cursor(-1);

        buf.insert('\u{200D}');

        assert_eq!(buf.contents(), "👩\u{200D}👦");
        assert_eq!(buf.grapheme_count(), 1);
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn cursor_width_counts_wide_chars() {
        let mut buf = LineBuffer::new();
        buf.set_contents("中文");

        assert_eq!(buf.grapheme_count(), 2);
        assert_eq!(buf.display_width_before_cursor(), 4);
    }
}
