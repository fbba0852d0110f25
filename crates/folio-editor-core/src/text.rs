//! Canonical document storage.
//!
//! Offsets are chars (Unicode scalar values) throughout the engine, matching
//! how the surface counts text.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

/// Char-indexed text storage for the canonical document.
pub trait TextBuffer {
    fn len_chars(&self) -> usize;

    /// Insert text at char offset.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Delete char range.
    fn delete(&mut self, char_range: Range<usize>);

    /// Text in a char range, or None if the range is out of bounds.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Character at offset. None past the end.
    fn char_at(&self, char_offset: usize) -> Option<char>;

    fn to_string(&self) -> String;
}

/// Ropey-backed document.
#[derive(Clone, Debug, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }
}

impl TextBuffer for EditorRope {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset.min(self.rope.len_chars()), text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let len = self.rope.len_chars();
        self.rope.remove(char_range.start.min(len)..char_range.end.min(len));
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        self.rope.get_char(char_offset)
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}
