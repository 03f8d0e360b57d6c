/// Maximum number of undo snapshots kept per buffer.
const MAX_UNDO_DEPTH: usize = 200;

/// A (row, column) position in the buffer. Columns are char offsets.
pub type Position = (usize, usize);

#[derive(Debug, Clone)]
struct Snapshot {
    lines: Vec<String>,
    cursor: Position,
}

/// Line-oriented text buffer owning character data, cursor, and selection.
///
/// Motions take an `extend` flag: when set, the selection anchor is kept
/// (established if absent) so the motion grows the selection; when clear,
/// any anchor is dropped. Deleting mutations return the removed text so the
/// caller can capture it into a register.
pub struct TextBuffer {
    lines: Vec<String>,
    cursor_line: usize,
    cursor_column: usize,
    selection_anchor: Option<Position>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    in_group: bool,
    group_checkpointed: bool,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_column: 0,
            selection_anchor: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            in_group: false,
            group_checkpointed: false,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        if !text.is_empty() {
            buffer.lines = text.split('\n').map(String::from).collect();
            if buffer.lines.is_empty() {
                buffer.lines.push(String::new());
            }
        }
        buffer
    }

    // --- State reads ---

    pub fn cursor(&self) -> Position {
        (self.cursor_line, self.cursor_column)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    pub fn plain_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.lines
            .iter()
            .map(|l| l.split_whitespace().count())
            .sum()
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map_or(line.len(), |(i, _)| i)
    }

    // --- Selection ---

    pub fn start_selection(&mut self) {
        self.selection_anchor = Some(self.cursor());
    }

    pub fn reset_selection(&mut self) {
        self.selection_anchor = None;
    }

    pub fn has_selection(&self) -> bool {
        self.selection_anchor.is_some()
    }

    /// The selected span, ordered, as a half-open range between the anchor
    /// and the cursor. `None` when no anchor is set or the span is empty.
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        let anchor = self.selection_anchor?;
        let cursor = self.cursor();
        if anchor == cursor {
            return None;
        }
        if anchor < cursor {
            Some((anchor, cursor))
        } else {
            Some((cursor, anchor))
        }
    }

    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection_range()?;
        Some(self.text_in_range(start, end))
    }

    fn text_in_range(&self, start: Position, end: Position) -> String {
        let (sr, sc) = start;
        let (er, ec) = end;
        if sr == er {
            let line = &self.lines[sr];
            let a = Self::byte_index(line, sc);
            let b = Self::byte_index(line, ec);
            return line[a..b].to_string();
        }
        let mut out = String::new();
        let first = &self.lines[sr];
        out.push_str(&first[Self::byte_index(first, sc)..]);
        for row in sr + 1..er {
            out.push('\n');
            out.push_str(&self.lines[row]);
        }
        out.push('\n');
        let last = &self.lines[er];
        out.push_str(&last[..Self::byte_index(last, ec)]);
        out
    }

    // --- Undo history ---

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines: self.lines.clone(),
            cursor: self.cursor(),
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.lines = snap.lines;
        self.cursor_line = snap.cursor.0;
        self.cursor_column = snap.cursor.1;
        self.selection_anchor = None;
        self.clamp_cursor();
    }

    /// Record an undo point before a mutation. Inside a group only the first
    /// mutation records one, so the whole group undoes as a unit.
    fn checkpoint(&mut self) {
        if self.in_group {
            if self.group_checkpointed {
                return;
            }
            self.group_checkpointed = true;
        }
        self.undo_stack.push(self.snapshot());
        if self.undo_stack.len() > MAX_UNDO_DEPTH {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Coalesce the following mutations into one undo step (an Insert-mode
    /// session, for example).
    pub fn begin_undo_group(&mut self) {
        self.in_group = true;
        self.group_checkpointed = false;
    }

    pub fn end_undo_group(&mut self) {
        self.in_group = false;
        self.group_checkpointed = false;
    }

    pub fn undo(&mut self) {
        if let Some(snap) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(snap);
        }
    }

    pub fn redo(&mut self) {
        if let Some(snap) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(snap);
        }
    }

    // --- Motions ---

    fn before_motion(&mut self, extend: bool) {
        if extend {
            if self.selection_anchor.is_none() {
                self.start_selection();
            }
        } else {
            self.selection_anchor = None;
        }
    }

    fn clamp_cursor(&mut self) {
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len().saturating_sub(1);
        }
        let len = self.line_len(self.cursor_line);
        if self.cursor_column > len {
            self.cursor_column = len;
        }
    }

    pub fn move_left(&mut self, extend: bool) {
        self.before_motion(extend);
        if self.cursor_column > 0 {
            self.cursor_column -= 1;
        }
    }

    pub fn move_right(&mut self, extend: bool) {
        self.before_motion(extend);
        if self.cursor_column < self.line_len(self.cursor_line) {
            self.cursor_column += 1;
        }
    }

    pub fn move_up(&mut self, extend: bool) {
        self.before_motion(extend);
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor();
        }
    }

    pub fn move_down(&mut self, extend: bool) {
        self.before_motion(extend);
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.clamp_cursor();
        }
    }

    pub fn line_home(&mut self, extend: bool) {
        self.before_motion(extend);
        self.cursor_column = 0;
    }

    /// First non-blank column of the current line (`^`).
    pub fn visual_line_home(&mut self, extend: bool) {
        self.before_motion(extend);
        let line = &self.lines[self.cursor_line];
        self.cursor_column = line
            .chars()
            .position(|c| !c.is_whitespace())
            .unwrap_or(0);
    }

    pub fn line_end(&mut self, extend: bool) {
        self.before_motion(extend);
        self.cursor_column = self.line_len(self.cursor_line);
    }

    pub fn buffer_home(&mut self, extend: bool) {
        self.before_motion(extend);
        self.cursor_line = 0;
        self.cursor_column = 0;
    }

    pub fn buffer_end(&mut self, extend: bool) {
        self.before_motion(extend);
        self.cursor_line = self.lines.len() - 1;
        self.cursor_column = self.line_len(self.cursor_line);
    }

    pub fn word_forward(&mut self, extend: bool) {
        self.before_motion(extend);
        self.word_forward_cursor();
    }

    pub fn word_backward(&mut self, extend: bool) {
        self.before_motion(extend);
        self.word_backward_cursor();
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    /// Advance to the start of the next word. Small-word rules: a word is a
    /// run of alphanumerics/underscores or a run of other punctuation.
    fn word_forward_cursor(&mut self) {
        let chars: Vec<char> = self.lines[self.cursor_line].chars().collect();

        // At or past end of line: hop to the next line's first word.
        if self.cursor_column >= chars.len() {
            if self.cursor_line + 1 < self.lines.len() {
                self.cursor_line += 1;
                self.cursor_column = 0;
                self.skip_leading_whitespace();
            }
            return;
        }

        let mut col = self.cursor_column;
        let current = chars[col];
        if !current.is_whitespace() {
            let in_word = Self::is_word_char(current);
            while col < chars.len()
                && !chars[col].is_whitespace()
                && Self::is_word_char(chars[col]) == in_word
            {
                col += 1;
            }
        }
        while col < chars.len() && chars[col].is_whitespace() {
            col += 1;
        }

        if col >= chars.len() && self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_column = 0;
            self.skip_leading_whitespace();
        } else {
            self.cursor_column = col.min(chars.len());
        }
    }

    fn skip_leading_whitespace(&mut self) {
        let chars: Vec<char> = self.lines[self.cursor_line].chars().collect();
        while self.cursor_column < chars.len() && chars[self.cursor_column].is_whitespace() {
            self.cursor_column += 1;
        }
    }

    /// Move back to the start of the previous word.
    fn word_backward_cursor(&mut self) {
        if self.cursor_column == 0 {
            if self.cursor_line == 0 {
                return;
            }
            self.cursor_line -= 1;
            self.cursor_column = self.line_len(self.cursor_line);
        }

        let chars: Vec<char> = self.lines[self.cursor_line].chars().collect();
        let mut col = self.cursor_column;

        while col > 0 && chars[col - 1].is_whitespace() {
            col -= 1;
        }
        if col > 0 {
            let in_word = Self::is_word_char(chars[col - 1]);
            while col > 0
                && !chars[col - 1].is_whitespace()
                && Self::is_word_char(chars[col - 1]) == in_word
            {
                col -= 1;
            }
        }
        self.cursor_column = col;
    }

    // --- Mutations ---

    pub fn insert_char(&mut self, c: char) {
        self.checkpoint();
        let line = &mut self.lines[self.cursor_line];
        let idx = Self::byte_index(line, self.cursor_column);
        line.insert(idx, c);
        self.cursor_column += 1;
    }

    pub fn insert_newline(&mut self) {
        self.checkpoint();
        let line = &mut self.lines[self.cursor_line];
        let idx = Self::byte_index(line, self.cursor_column);
        let rest = line.split_off(idx);
        self.lines.insert(self.cursor_line + 1, rest);
        self.cursor_line += 1;
        self.cursor_column = 0;
    }

    /// Insert arbitrary text (may span lines) at the cursor. An active
    /// selection is replaced; the whole edit is one undo step.
    pub fn insert_text(&mut self, text: &str) {
        self.checkpoint();
        self.begin_undo_group_if_ungrouped(|buf| {
            if let Some((start, end)) = buf.selection_range() {
                buf.selection_anchor = None;
                buf.delete_range(start, end);
            }
            for (i, piece) in text.split('\n').enumerate() {
                if i > 0 {
                    let line = &mut buf.lines[buf.cursor_line];
                    let idx = Self::byte_index(line, buf.cursor_column);
                    let rest = line.split_off(idx);
                    buf.lines.insert(buf.cursor_line + 1, rest);
                    buf.cursor_line += 1;
                    buf.cursor_column = 0;
                }
                if !piece.is_empty() {
                    let line = &mut buf.lines[buf.cursor_line];
                    let idx = Self::byte_index(line, buf.cursor_column);
                    line.insert_str(idx, piece);
                    buf.cursor_column += piece.chars().count();
                }
            }
        });
    }

    // Runs a multi-step edit without recording intermediate undo points.
    fn begin_undo_group_if_ungrouped(&mut self, f: impl FnOnce(&mut Self)) {
        let was_grouped = self.in_group;
        self.in_group = true;
        self.group_checkpointed = true;
        f(self);
        if !was_grouped {
            self.end_undo_group();
        }
    }

    /// Delete the active selection, or the character under the cursor when
    /// there is none. Returns the removed text.
    pub fn delete_char(&mut self) -> String {
        if let Some((start, end)) = self.selection_range() {
            self.checkpoint();
            self.selection_anchor = None;
            return self.delete_range(start, end);
        }
        self.selection_anchor = None;
        let len = self.line_len(self.cursor_line);
        if self.cursor_column < len {
            self.checkpoint();
            let line = &mut self.lines[self.cursor_line];
            let idx = Self::byte_index(line, self.cursor_column);
            line.remove(idx).to_string()
        } else if self.cursor_line + 1 < self.lines.len() {
            // At end of line: join with the next line.
            self.checkpoint();
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
            "\n".to_string()
        } else {
            String::new()
        }
    }

    /// Delete the character before the cursor (Insert-mode backspace).
    pub fn delete_char_backward(&mut self) {
        if self.cursor_column > 0 {
            self.checkpoint();
            self.cursor_column -= 1;
            let line = &mut self.lines[self.cursor_line];
            let idx = Self::byte_index(line, self.cursor_column);
            line.remove(idx);
        } else if self.cursor_line > 0 {
            self.checkpoint();
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_column = self.line_len(self.cursor_line);
            self.lines[self.cursor_line].push_str(&current);
        }
    }

    /// Delete the current line. Returns it with a trailing newline.
    pub fn delete_line(&mut self) -> String {
        self.checkpoint();
        self.selection_anchor = None;
        let removed = if self.lines.len() == 1 {
            std::mem::take(&mut self.lines[0])
        } else {
            self.lines.remove(self.cursor_line)
        };
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len() - 1;
        }
        self.cursor_column = 0;
        format!("{}\n", removed)
    }

    pub fn delete_word_forward(&mut self) -> String {
        self.checkpoint();
        let start = self.cursor();
        self.word_forward_cursor();
        let end = self.cursor();
        self.cursor_line = start.0;
        self.cursor_column = start.1;
        self.delete_range(start, end)
    }

    pub fn delete_word_backward(&mut self) -> String {
        self.checkpoint();
        let end = self.cursor();
        self.word_backward_cursor();
        let start = self.cursor();
        self.delete_range(start, end)
    }

    pub fn delete_to_line_end(&mut self) -> String {
        self.checkpoint();
        let start = self.cursor();
        let end = (self.cursor_line, self.line_len(self.cursor_line));
        self.delete_range(start, end)
    }

    pub fn delete_to_line_start(&mut self) -> String {
        self.checkpoint();
        let end = self.cursor();
        let start = (self.cursor_line, 0);
        self.delete_range(start, end)
    }

    /// Remove the half-open range `[start, end)` and leave the cursor at
    /// `start`. Positions must be ordered.
    fn delete_range(&mut self, start: Position, end: Position) -> String {
        let removed = self.text_in_range(start, end);
        let (sr, sc) = start;
        let (er, ec) = end;
        if sr == er {
            let line = &mut self.lines[sr];
            let a = Self::byte_index(line, sc);
            let b = Self::byte_index(line, ec);
            line.replace_range(a..b, "");
        } else {
            let tail = {
                let last = &self.lines[er];
                last[Self::byte_index(last, ec)..].to_string()
            };
            let first = &mut self.lines[sr];
            first.truncate(Self::byte_index(first, sc));
            first.push_str(&tail);
            self.lines.drain(sr + 1..=er);
        }
        self.cursor_line = sr;
        self.cursor_column = sc;
        removed
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from_text(text)
    }

    #[test]
    fn test_from_text_splits_lines() {
        let buf = buffer("one\ntwo\nthree");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line(1), Some("two"));
        assert_eq!(buf.plain_text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_basic_motions_clamp_at_edges() {
        let mut buf = buffer("ab\ncdef");
        buf.move_left(false);
        assert_eq!(buf.cursor(), (0, 0));
        buf.move_right(false);
        buf.move_right(false);
        buf.move_right(false);
        assert_eq!(buf.cursor(), (0, 2));
        buf.move_down(false);
        assert_eq!(buf.cursor(), (1, 2));
        buf.move_up(false);
        buf.move_up(false);
        assert_eq!(buf.cursor(), (0, 2));
    }

    #[test]
    fn test_word_forward_over_punctuation() {
        let mut buf = buffer("foo, bar baz");
        buf.word_forward(false);
        assert_eq!(buf.cursor(), (0, 3)); // lands on the comma
        buf.word_forward(false);
        assert_eq!(buf.cursor(), (0, 5)); // "bar"
        buf.word_forward(false);
        assert_eq!(buf.cursor(), (0, 9)); // "baz"
    }

    #[test]
    fn test_word_forward_crosses_lines() {
        let mut buf = buffer("one\n  two");
        buf.line_end(false);
        buf.word_forward(false);
        assert_eq!(buf.cursor(), (1, 2));
    }

    #[test]
    fn test_word_backward() {
        let mut buf = buffer("foo bar baz");
        buf.line_end(false);
        buf.word_backward(false);
        assert_eq!(buf.cursor(), (0, 8));
        buf.word_backward(false);
        assert_eq!(buf.cursor(), (0, 4));
        buf.word_backward(false);
        assert_eq!(buf.cursor(), (0, 0));
    }

    #[test]
    fn test_visual_line_home() {
        let mut buf = buffer("   indented");
        buf.line_end(false);
        buf.visual_line_home(false);
        assert_eq!(buf.cursor(), (0, 3));
    }

    #[test]
    fn test_selection_extends_with_motion() {
        let mut buf = buffer("hello world");
        buf.start_selection();
        for _ in 0..5 {
            buf.move_right(true);
        }
        assert_eq!(buf.selected_text().as_deref(), Some("hello"));
    }

    #[test]
    fn test_plain_motion_drops_selection() {
        let mut buf = buffer("hello");
        buf.start_selection();
        buf.move_right(true);
        assert!(buf.has_selection());
        buf.move_right(false);
        assert!(!buf.has_selection());
    }

    #[test]
    fn test_multiline_selection_text() {
        let mut buf = buffer("abc\ndef");
        buf.move_right(false);
        buf.start_selection();
        buf.move_down(true);
        buf.move_right(true);
        assert_eq!(buf.selected_text().as_deref(), Some("bc\nde"));
    }

    #[test]
    fn test_delete_char_under_cursor() {
        let mut buf = buffer("abc");
        buf.move_right(false);
        assert_eq!(buf.delete_char(), "b");
        assert_eq!(buf.plain_text(), "ac");
    }

    #[test]
    fn test_delete_char_removes_selection() {
        let mut buf = buffer("hello world");
        buf.start_selection();
        for _ in 0..6 {
            buf.move_right(true);
        }
        assert_eq!(buf.delete_char(), "hello ");
        assert_eq!(buf.plain_text(), "world");
        assert!(!buf.has_selection());
    }

    #[test]
    fn test_delete_line_returns_text() {
        let mut buf = buffer("first\nsecond\nthird");
        buf.move_down(false);
        assert_eq!(buf.delete_line(), "second\n");
        assert_eq!(buf.plain_text(), "first\nthird");
        assert_eq!(buf.cursor(), (1, 0));
    }

    #[test]
    fn test_delete_last_line_leaves_empty_buffer() {
        let mut buf = buffer("only");
        assert_eq!(buf.delete_line(), "only\n");
        assert_eq!(buf.line_count(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_delete_word_forward() {
        let mut buf = buffer("foo bar");
        assert_eq!(buf.delete_word_forward(), "foo ");
        assert_eq!(buf.plain_text(), "bar");
    }

    #[test]
    fn test_delete_to_line_end_and_start() {
        let mut buf = buffer("hello world");
        for _ in 0..5 {
            buf.move_right(false);
        }
        assert_eq!(buf.delete_to_line_end(), " world");
        assert_eq!(buf.plain_text(), "hello");
        assert_eq!(buf.delete_to_line_start(), "hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_insert_text_multiline() {
        let mut buf = buffer("ab");
        buf.move_right(false);
        buf.insert_text("x\ny");
        assert_eq!(buf.plain_text(), "ax\nyb");
        assert_eq!(buf.cursor(), (1, 1));
    }

    #[test]
    fn test_insert_text_replaces_selection_in_one_undo_step() {
        let mut buf = buffer("hello world");
        buf.start_selection();
        for _ in 0..5 {
            buf.move_right(true);
        }
        buf.insert_text("bye");
        assert_eq!(buf.plain_text(), "bye world");
        assert!(!buf.has_selection());

        buf.undo();
        assert_eq!(buf.plain_text(), "hello world");
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut buf = buffer("keep");
        buf.delete_line();
        assert!(buf.is_empty());
        buf.undo();
        assert_eq!(buf.plain_text(), "keep");
        buf.redo();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_undo_group_coalesces_inserts() {
        let mut buf = TextBuffer::new();
        buf.begin_undo_group();
        for c in "hello".chars() {
            buf.insert_char(c);
        }
        buf.end_undo_group();
        assert_eq!(buf.plain_text(), "hello");
        buf.undo();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_word_count() {
        assert_eq!(buffer("").word_count(), 0);
        assert_eq!(buffer("one two\nthree").word_count(), 3);
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buf = buffer("ab\ncd");
        buf.move_down(false);
        buf.delete_char_backward();
        assert_eq!(buf.plain_text(), "abcd");
        assert_eq!(buf.cursor(), (0, 2));
    }
}
