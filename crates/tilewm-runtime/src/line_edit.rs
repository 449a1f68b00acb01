#![forbid(unsafe_code)]

//! Single-line editing for console argument slots.
//!
//! The cursor is a grapheme index, so combining sequences and wide glyphs
//! move and delete as one unit. Typed characters are upper-cased on insert.

use tilewm_core::event::{KeyCode, KeyEvent};
use unicode_segmentation::UnicodeSegmentation;

/// What a keystroke did to the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Key not handled here.
    Ignored,
    /// Cursor moved; text unchanged.
    Moved,
    /// Text changed.
    Changed,
    Submit,
    Next,
    Prev,
}

/// Editor over a borrowed value and cursor.
#[derive(Debug)]
pub struct LineEdit<'a> {
    value: &'a mut String,
    cursor: &'a mut usize,
}

impl<'a> LineEdit<'a> {
    /// Wrap `value`, clamping `cursor` into range.
    pub fn new(value: &'a mut String, cursor: &'a mut usize) -> Self {
        let mut edit = Self { value, cursor };
        let count = edit.grapheme_count();
        if *edit.cursor > count {
            *edit.cursor = count;
        }
        edit
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> EditOutcome {
        if !key.is_press() {
            return EditOutcome::Ignored;
        }
        let ctrl = key.ctrl();
        match key.code {
            KeyCode::Enter => EditOutcome::Submit,
            KeyCode::Tab if key.shift() => EditOutcome::Prev,
            KeyCode::Tab | KeyCode::Down => EditOutcome::Next,
            KeyCode::BackTab | KeyCode::Up => EditOutcome::Prev,
            KeyCode::Char('w') if ctrl => self.changed(Self::delete_word_back),
            KeyCode::Char('u') if ctrl => self.changed(Self::clear_to_start),
            KeyCode::Char(c) if !ctrl && !key.alt() => self.changed(|e| e.insert_char(c)),
            KeyCode::Backspace if ctrl => self.changed(Self::delete_word_back),
            KeyCode::Backspace => self.changed(Self::delete_char_back),
            KeyCode::Delete => self.changed(Self::delete_char_forward),
            KeyCode::Left => {
                if *self.cursor > 0 {
                    *self.cursor -= 1;
                }
                EditOutcome::Moved
            }
            KeyCode::Right => {
                if *self.cursor < self.grapheme_count() {
                    *self.cursor += 1;
                }
                EditOutcome::Moved
            }
            KeyCode::Home => {
                *self.cursor = 0;
                EditOutcome::Moved
            }
            KeyCode::End => {
                *self.cursor = self.grapheme_count();
                EditOutcome::Moved
            }
            _ => EditOutcome::Ignored,
        }
    }

    fn changed(&mut self, op: impl FnOnce(&mut Self)) -> EditOutcome {
        let before = self.value.clone();
        op(self);
        if before == *self.value {
            EditOutcome::Moved
        } else {
            EditOutcome::Changed
        }
    }

    fn insert_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        for upper in c.to_uppercase() {
            let old_count = self.grapheme_count();
            let byte_offset = self.grapheme_byte_offset(*self.cursor);
            self.value.insert(byte_offset, upper);
            // A combining mark merges into the previous grapheme and leaves
            // the cursor where it is.
            if self.grapheme_count() > old_count {
                *self.cursor += 1;
            }
        }
    }

    fn delete_char_back(&mut self) {
        if *self.cursor > 0 {
            let byte_start = self.grapheme_byte_offset(*self.cursor - 1);
            let byte_end = self.grapheme_byte_offset(*self.cursor);
            self.value.drain(byte_start..byte_end);
            *self.cursor -= 1;
        }
    }

    fn delete_char_forward(&mut self) {
        if *self.cursor < self.grapheme_count() {
            let byte_start = self.grapheme_byte_offset(*self.cursor);
            let byte_end = self.grapheme_byte_offset(*self.cursor + 1);
            self.value.drain(byte_start..byte_end);
        }
    }

    fn delete_word_back(&mut self) {
        let graphemes: Vec<&str> = self.value.graphemes(true).collect();
        let is_space = |g: &str| g.chars().all(char::is_whitespace);
        let mut pos = *self.cursor;
        while pos > 0 && is_space(graphemes[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && !is_space(graphemes[pos - 1]) {
            pos -= 1;
        }
        if pos < *self.cursor {
            let byte_start = self.grapheme_byte_offset(pos);
            let byte_end = self.grapheme_byte_offset(*self.cursor);
            self.value.drain(byte_start..byte_end);
            *self.cursor = pos;
        }
    }

    fn clear_to_start(&mut self) {
        let byte_end = self.grapheme_byte_offset(*self.cursor);
        self.value.drain(..byte_end);
        *self.cursor = 0;
    }

    fn grapheme_count(&self) -> usize {
        self.value.graphemes(true).count()
    }

    fn grapheme_byte_offset(&self, grapheme_idx: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

/// Number of graphemes in `text`; the cursor position at its end.
#[must_use]
pub fn end_cursor(text: &str) -> usize {
    text.graphemes(true).count()
}
