//! Editor buffers.
//!
//! When a transfer is triggered from an open note, the link replaces the
//! buffer content instead of the stored file so the editor stays in sync.

use std::ops::Range;

pub trait EditorBuffer {
    fn replace_entire_content(&mut self, text: &str);

    /// Replace the current selection (or insert at the cursor when it is empty).
    fn replace_selection(&mut self, text: &str);
}

/// Plain in-memory buffer with a byte-range selection.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    selection: Range<usize>,
}

impl TextBuffer {
    /// Cursor at the end of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        Self { text, selection: end..end }
    }

    /// Select `range`, clamped to the text and snapped to char boundaries.
    pub fn select(&mut self, range: Range<usize>) {
        let clamp = |mut i: usize| {
            i = i.min(self.text.len());
            while !self.text.is_char_boundary(i) {
                i -= 1;
            }
            i
        };
        let start = clamp(range.start);
        let end = clamp(range.end).max(start);
        self.selection = start..end;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl EditorBuffer for TextBuffer {
    fn replace_entire_content(&mut self, text: &str) {
        self.text = text.to_string();
        let end = self.text.len();
        self.selection = end..end;
    }

    fn replace_selection(&mut self, text: &str) {
        self.text.replace_range(self.selection.clone(), text);
        let end = self.selection.start + text.len();
        self.selection = end..end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_replaced_and_cursor_follows() {
        let mut buf = TextBuffer::new("see HERE please");
        buf.select(4..8);
        buf.replace_selection("[x](y)");
        assert_eq!(buf.text(), "see [x](y) please");
        buf.replace_selection("!");
        assert_eq!(buf.text(), "see [x](y)! please");
    }

    #[test]
    fn selection_clamps_to_char_boundaries() {
        let mut buf = TextBuffer::new("héllo");
        buf.select(2..99);
        buf.replace_selection("");
        assert_eq!(buf.text(), "h");
    }

    #[test]
    fn whole_content_replacement() {
        let mut buf = TextBuffer::new("old");
        buf.replace_entire_content("new");
        assert_eq!(buf.into_text(), "new");
    }
}
