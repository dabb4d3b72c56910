use std::ops::Range;

/// Rows the menu needs besides the list itself: title, list borders, status bar, footer.
pub const CHROME_ROWS: usize = 5;

/// Number of list rows that fit on a terminal `height` rows tall. Never below 1.
pub fn viewport_rows(height: u16) -> usize {
    (height as usize).saturating_sub(CHROME_ROWS).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuInput {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Browsing,
    Selected(usize),
    Cancelled,
}

/// Cursor and scroll bookkeeping over a list of `len` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    len: usize,
    cursor: usize,
    scroll_offset: usize,
    viewport: usize,
}

impl Selector {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            cursor: 0,
            scroll_offset: 0,
            viewport: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    /// Called before every redraw; the terminal may have been resized since the last one.
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows.max(1);
        self.sync_scroll();
    }

    /// Indices of the rows currently on screen.
    pub fn visible_range(&self) -> Range<usize> {
        self.scroll_offset..self.len.min(self.scroll_offset + self.viewport)
    }

    pub fn apply(&mut self, input: MenuInput) -> Transition {
        let last = self.len.saturating_sub(1);
        match input {
            MenuInput::Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            MenuInput::Down => {
                if self.cursor < last {
                    self.cursor += 1;
                }
            }
            MenuInput::PageUp => self.cursor = self.cursor.saturating_sub(self.viewport),
            MenuInput::PageDown => self.cursor = last.min(self.cursor + self.viewport),
            MenuInput::Home => self.cursor = 0,
            MenuInput::End => self.cursor = last,
            MenuInput::Confirm => {
                if self.is_empty() {
                    return Transition::Browsing;
                }
                return Transition::Selected(self.cursor);
            }
            MenuInput::Cancel => return Transition::Cancelled,
        }
        self.sync_scroll();
        Transition::Browsing
    }

    // Moves the window by the least amount that keeps the cursor on screen.
    fn sync_scroll(&mut self) {
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + self.viewport {
            self.scroll_offset = self.cursor + 1 - self.viewport;
        }
    }
}
