//! wizard::input
//!
//! Minimal text editor used for message editing.

/// An editable buffer with a character cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    /// Cursor position in characters
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    /// Single-line input with the cursor at the end.
    pub fn single_line(initial: &str) -> Self {
        let text = initial.replace('\n', " ");
        let cursor = text.chars().count();
        Self {
            text,
            cursor,
            multiline: false,
        }
    }

    /// Multi-line input with the cursor at the end.
    pub fn multi_line(initial: &str) -> Self {
        Self {
            cursor: initial.chars().count(),
            text: initial.to_string(),
            multiline: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, c: char) {
        if c == '\n' && !self.multiline {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn newline(&mut self) {
        self.insert('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.text.chars().count() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    /// Start of the current line.
    pub fn home(&mut self) {
        let before: Vec<char> = self.text.chars().take(self.cursor).collect();
        self.cursor = before
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    /// End of the current line.
    pub fn end(&mut self) {
        let after = self
            .text
            .chars()
            .skip(self.cursor)
            .position(|c| c == '\n')
            .unwrap_or_else(|| self.text.chars().count() - self.cursor);
        self.cursor += after;
    }
}
