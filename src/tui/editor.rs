use ratatui::text::Span;

/// Minimal text area used for the learning input and the quiz answer box.
///
/// Lines are kept as char buffers so the cursor column is a char index,
/// which keeps Urdu and other multi-byte input simple to edit.
#[derive(Debug)]
pub struct Editor {
    lines: Vec<Vec<char>>,
    cursor: Cursor,
    scroll_top: usize,
    single_line: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Cursor {
    row: usize,
    col: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
            cursor: Cursor::default(),
            scroll_top: 0,
            single_line: false,
        }
    }

    /// An editor that ignores newlines.
    pub fn single_line() -> Self {
        Self {
            single_line: true,
            ..Self::new()
        }
    }

    pub fn content(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().flatten().all(|c| c.is_whitespace())
    }

    pub fn clear(&mut self) {
        *self = Self {
            single_line: self.single_line,
            ..Self::new()
        };
    }

    /// `(row, column)` of the cursor, in chars.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor.row, self.cursor.col)
    }

    /// Terminal cells taken by the text left of the cursor on its line.
    pub fn cursor_width(&self) -> usize {
        let before: String = self.lines[self.cursor.row][..self.cursor.col].iter().collect();
        Span::raw(before).width()
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn ensure_cursor_visible(&mut self, view_height: usize) {
        let row = self.cursor.row;
        self.scroll_top = if view_height == 0 {
            0
        } else if row < self.scroll_top {
            row
        } else if row >= self.scroll_top + view_height {
            row + 1 - view_height
        } else {
            self.scroll_top
        };
    }

    pub fn insert_char(&mut self, ch: char) {
        let Cursor { row, col } = self.cursor;
        self.lines[row].insert(col, ch);
        self.cursor.col += 1;
    }

    pub fn insert_newline(&mut self) {
        if self.single_line {
            return;
        }
        let Cursor { row, col } = self.cursor;
        let tail = self.lines[row].split_off(col);
        self.lines.insert(row + 1, tail);
        self.cursor = Cursor { row: row + 1, col: 0 };
    }

    pub fn backspace(&mut self) {
        let Cursor { row, col } = self.cursor;
        if col > 0 {
            self.lines[row].remove(col - 1);
            self.cursor.col -= 1;
        } else if row > 0 {
            let line = self.lines.remove(row);
            let joined_at = self.lines[row - 1].len();
            self.lines[row - 1].extend(line);
            self.cursor = Cursor { row: row - 1, col: joined_at };
        }
    }

    pub fn delete(&mut self) {
        let Cursor { row, col } = self.cursor;
        if col < self.lines[row].len() {
            self.lines[row].remove(col);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].extend(next);
        }
    }

    pub fn move_left(&mut self) {
        let Cursor { row, col } = self.cursor;
        if col > 0 {
            self.cursor.col -= 1;
        } else if row > 0 {
            self.cursor = Cursor { row: row - 1, col: self.lines[row - 1].len() };
        }
    }

    pub fn move_right(&mut self) {
        let Cursor { row, col } = self.cursor;
        if col < self.lines[row].len() {
            self.cursor.col += 1;
        } else if row + 1 < self.lines.len() {
            self.cursor = Cursor { row: row + 1, col: 0 };
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.move_to_row(self.cursor.row - 1);
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.lines.len() {
            self.move_to_row(self.cursor.row + 1);
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.col = self.lines[self.cursor.row].len();
    }

    fn move_to_row(&mut self, row: usize) {
        self.cursor = Cursor {
            row,
            col: self.cursor.col.min(self.lines[row].len()),
        };
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
