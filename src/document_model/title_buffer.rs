/// Single-line field backing the title surface. No selection, no history;
/// just a string with a char-offset cursor.
#[derive(Debug, Default)]
pub struct TitleBuffer {
    text: String,
    cursor: usize,
}

impl TitleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.replace('\n', " ");
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, col: usize) -> usize {
        self.text
            .char_indices()
            .nth(col)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            return;
        }
        let idx = self.byte_index(self.cursor);
        self.text.insert(idx, c);
        self.cursor += 1;
    }

    pub fn delete_char_backward(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index(self.cursor);
            self.text.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut title = TitleBuffer::new();
        for c in "draft".chars() {
            title.insert_char(c);
        }
        assert_eq!(title.text(), "draft");
        title.delete_char_backward();
        assert_eq!(title.text(), "draf");
        assert_eq!(title.cursor(), 4);
    }

    #[test]
    fn test_newlines_are_rejected() {
        let mut title = TitleBuffer::new();
        title.insert_char('a');
        title.insert_char('\n');
        title.insert_char('b');
        assert_eq!(title.text(), "ab");
    }

    #[test]
    fn test_set_text_flattens_newlines() {
        let mut title = TitleBuffer::new();
        title.set_text("two\nlines");
        assert_eq!(title.text(), "two lines");
    }
}
