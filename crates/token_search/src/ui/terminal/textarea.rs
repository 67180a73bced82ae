// Adapted from codex-rs/tui/src/bottom_pane/textarea.rs (Apache 2.0 licensed)
// Single-line input buffer behind the search box.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::WidgetRef;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const WORD_SEPARATORS: &str = "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

fn is_word_separator(ch: char) -> bool {
    WORD_SEPARATORS.contains(ch)
}

/// On Windows, AltGr sends ALT+CONTROL together. Detect this to avoid
/// treating AltGr characters as control combos.
#[cfg(windows)]
#[inline]
fn is_altgr(mods: KeyModifiers) -> bool {
    mods.contains(KeyModifiers::ALT) && mods.contains(KeyModifiers::CONTROL)
}

#[cfg(not(windows))]
#[inline]
fn is_altgr(_mods: KeyModifiers) -> bool {
    false
}

/// A one-line editable buffer. Keeps its own horizontal scroll offset (in
/// display columns) so the cursor stays inside the visible width.
#[derive(Debug)]
pub struct TextArea {
    text: String,
    /// Byte offset of the cursor, always on a grapheme boundary.
    cursor_pos: usize,
    scroll: usize,
    viewport_width: u16,
    kill_buffer: String,
}

impl TextArea {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor_pos: 0,
            scroll: 0,
            viewport_width: 0,
            kill_buffer: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Insert at the cursor. Line breaks become spaces since the input has one line.
    pub fn insert_str(&mut self, text: &str) {
        let text: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        let pos = self.clamp_pos_to_char_boundary(self.cursor_pos);
        self.text.insert_str(pos, &text);
        self.cursor_pos = pos + text.len();
        self.reveal_cursor();
    }

    /// Remove the whole text, returning it. The kill buffer keeps a copy.
    pub fn take_text(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        if !text.is_empty() {
            self.kill_buffer = text.clone();
        }
        self.cursor_pos = 0;
        self.reveal_cursor();
        text
    }

    pub fn replace_range(&mut self, range: Range<usize>, text: &str) {
        let start = self.clamp_pos_to_char_boundary(range.start);
        let end = self.clamp_pos_to_char_boundary(range.end);
        if start > end {
            return;
        }
        let removed_len = end - start;
        let diff = text.len() as isize - removed_len as isize;

        self.text.replace_range(start..end, text);

        self.cursor_pos = if self.cursor_pos < start {
            self.cursor_pos
        } else if self.cursor_pos <= end {
            start + text.len()
        } else {
            ((self.cursor_pos as isize) + diff) as usize
        }
        .min(self.text.len());
        self.cursor_pos = self.clamp_pos_to_char_boundary(self.cursor_pos);
        self.reveal_cursor();
    }

    /// Cursor as a byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor_pos
    }

    /// Cursor as a character offset, the unit tokens are measured in.
    pub fn cursor_char_offset(&self) -> usize {
        self.text[..self.cursor_pos].chars().count()
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor_pos = self.clamp_pos_to_grapheme_boundary(pos);
        self.reveal_cursor();
    }

    /// Place the cursor on the grapheme drawn at `column` of the visible area.
    pub fn set_cursor_from_column(&mut self, column: u16) {
        let target = self.scroll + column as usize;
        let mut col = 0usize;
        for (idx, g) in self.text.grapheme_indices(true) {
            let w = g.width();
            if col + w > target {
                self.set_cursor(idx);
                return;
            }
            col += w;
        }
        self.set_cursor(self.text.len());
    }

    /// First visible display column.
    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn set_viewport_width(&mut self, width: u16) {
        if self.viewport_width != width {
            self.viewport_width = width;
            self.reveal_cursor();
        }
    }

    /// Display column of the cursor, counted from the start of the text.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor_pos].width()
    }

    /// Compute the on-screen cursor position.
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let col = self.cursor_column().checked_sub(self.scroll)?;
        if col >= area.width as usize {
            return None;
        }
        Some((area.x + col as u16, area.y))
    }

    pub fn input(&mut self, event: KeyEvent) {
        match event {
            // C0 control character fallbacks (terminals that don't report CONTROL modifier)
            KeyEvent {
                code: KeyCode::Char('\u{0002}'),
                modifiers: KeyModifiers::NONE,
                ..
            } => self.move_cursor_left(),
            KeyEvent {
                code: KeyCode::Char('\u{0006}'),
                modifiers: KeyModifiers::NONE,
                ..
            } => self.move_cursor_right(),
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
                ..
            } => self.insert_str(&c.to_string()),
            KeyEvent {
                code: KeyCode::Char('h'),
                modifiers,
                ..
            } if modifiers == (KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.delete_backward_word()
            }
            // Windows AltGr: treat as plain character
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                ..
            } if is_altgr(modifiers) => self.insert_str(&c.to_string()),
            KeyEvent {
                code: KeyCode::Backspace,
                modifiers: KeyModifiers::ALT,
                ..
            } => self.delete_backward_word(),
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('h'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.delete_backward(1),
            KeyEvent {
                code: KeyCode::Delete,
                modifiers: KeyModifiers::ALT,
                ..
            } => self.delete_forward_word(),
            KeyEvent {
                code: KeyCode::Delete,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('d'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.delete_forward(1),
            KeyEvent {
                code: KeyCode::Char('w'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.delete_backward_word(),
            KeyEvent {
                code: KeyCode::Char('b'),
                modifiers: KeyModifiers::ALT,
                ..
            }
            | KeyEvent {
                code: KeyCode::Left,
                modifiers: KeyModifiers::ALT | KeyModifiers::CONTROL,
                ..
            } => self.set_cursor(self.beginning_of_previous_word()),
            KeyEvent {
                code: KeyCode::Char('f'),
                modifiers: KeyModifiers::ALT,
                ..
            }
            | KeyEvent {
                code: KeyCode::Right,
                modifiers: KeyModifiers::ALT | KeyModifiers::CONTROL,
                ..
            } => self.set_cursor(self.end_of_next_word()),
            KeyEvent {
                code: KeyCode::Char('u'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.kill_range(0..self.cursor_pos),
            KeyEvent {
                code: KeyCode::Char('k'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.kill_range(self.cursor_pos..self.text.len()),
            KeyEvent {
                code: KeyCode::Char('y'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.yank(),
            KeyEvent {
                code: KeyCode::Left,
                modifiers: KeyModifiers::NONE,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('b'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.move_cursor_left(),
            KeyEvent {
                code: KeyCode::Right,
                modifiers: KeyModifiers::NONE,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('f'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.move_cursor_right(),
            KeyEvent {
                code: KeyCode::Home,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('a'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.set_cursor(0),
            KeyEvent {
                code: KeyCode::End, ..
            }
            | KeyEvent {
                code: KeyCode::Char('e'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.set_cursor(self.text.len()),
            _ => {}
        }
    }

    // ####### Input Functions #######

    pub fn delete_backward(&mut self, n: usize) {
        let mut target = self.cursor_pos;
        for _ in 0..n {
            if target == 0 {
                break;
            }
            target = self.prev_grapheme_boundary(target);
        }
        if target < self.cursor_pos {
            self.replace_range(target..self.cursor_pos, "");
        }
    }

    pub fn delete_forward(&mut self, n: usize) {
        let mut target = self.cursor_pos;
        for _ in 0..n {
            if target >= self.text.len() {
                break;
            }
            target = self.next_grapheme_boundary(target);
        }
        if target > self.cursor_pos {
            self.replace_range(self.cursor_pos..target, "");
        }
    }

    pub fn delete_backward_word(&mut self) {
        let start = self.beginning_of_previous_word();
        self.kill_range(start..self.cursor_pos);
    }

    pub fn delete_forward_word(&mut self) {
        let end = self.end_of_next_word();
        self.kill_range(self.cursor_pos..end);
    }

    pub fn yank(&mut self) {
        if self.kill_buffer.is_empty() {
            return;
        }
        let text = self.kill_buffer.clone();
        self.insert_str(&text);
    }

    fn kill_range(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        self.kill_buffer = self.text[range.clone()].to_string();
        self.replace_range(range, "");
    }

    // ####### Cursor Movement #######

    pub fn move_cursor_left(&mut self) {
        self.cursor_pos = self.prev_grapheme_boundary(self.cursor_pos);
        self.reveal_cursor();
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_pos = self.next_grapheme_boundary(self.cursor_pos);
        self.reveal_cursor();
    }

    // ####### Word Navigation #######

    fn beginning_of_previous_word(&self) -> usize {
        let prefix = &self.text[..self.cursor_pos];
        let Some((first_non_ws_idx, ch)) = prefix
            .char_indices()
            .rev()
            .find(|&(_, ch)| !ch.is_whitespace())
        else {
            return 0;
        };
        let is_separator = is_word_separator(ch);
        let mut start = first_non_ws_idx;
        for (idx, ch) in prefix[..first_non_ws_idx].char_indices().rev() {
            if ch.is_whitespace() || is_word_separator(ch) != is_separator {
                start = idx + ch.len_utf8();
                break;
            }
            start = idx;
        }
        start
    }

    fn end_of_next_word(&self) -> usize {
        let Some(first_non_ws) = self.text[self.cursor_pos..].find(|c: char| !c.is_whitespace())
        else {
            return self.text.len();
        };
        let word_start = self.cursor_pos + first_non_ws;
        let mut iter = self.text[word_start..].char_indices();
        let Some((_, first_ch)) = iter.next() else {
            return word_start;
        };
        let is_separator = is_word_separator(first_ch);
        let mut end = self.text.len();
        for (idx, ch) in iter {
            if ch.is_whitespace() || is_word_separator(ch) != is_separator {
                end = word_start + idx;
                break;
            }
        }
        end
    }

    // ####### Internal Helpers #######

    /// Keep the cursor column inside `[scroll, scroll + width)`, and avoid
    /// leaving blank columns on the right once the text has shrunk.
    fn reveal_cursor(&mut self) {
        let width = self.viewport_width as usize;
        if width == 0 {
            self.scroll = 0;
            return;
        }
        let col = self.cursor_column();
        if col < self.scroll {
            self.scroll = col;
        } else if col >= self.scroll + width {
            self.scroll = col + 1 - width;
        }
        // One extra column for the cursor parked after the last character.
        let max_scroll = (self.text.width() + 1).saturating_sub(width);
        self.scroll = self.scroll.min(max_scroll);
    }

    fn clamp_pos_to_char_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.text.len());
        while pos > 0 && !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn clamp_pos_to_grapheme_boundary(&self, pos: usize) -> usize {
        let pos = self.clamp_pos_to_char_boundary(pos);
        let mut gc = unicode_segmentation::GraphemeCursor::new(pos, self.text.len(), true);
        match gc.is_boundary(&self.text, 0) {
            Ok(true) => pos,
            Ok(false) => self.prev_grapheme_boundary(pos),
            Err(_) => pos,
        }
    }

    fn prev_grapheme_boundary(&self, pos: usize) -> usize {
        if pos == 0 {
            return 0;
        }
        let mut gc = unicode_segmentation::GraphemeCursor::new(pos, self.text.len(), true);
        match gc.prev_boundary(&self.text, 0) {
            Ok(Some(b)) => b,
            Ok(None) => 0,
            Err(_) => self.clamp_pos_to_char_boundary(pos - 1),
        }
    }

    fn next_grapheme_boundary(&self, pos: usize) -> usize {
        if pos >= self.text.len() {
            return self.text.len();
        }
        let mut gc = unicode_segmentation::GraphemeCursor::new(pos, self.text.len(), true);
        match gc.next_boundary(&self.text, 0) {
            Ok(Some(b)) => b,
            Ok(None) => self.text.len(),
            Err(_) => self.text.len(),
        }
    }
}

impl Default for TextArea {
    fn default() -> Self {
        Self::new()
    }
}

/// Paints the visible slice of raw text in the default style. Styled layers
/// are drawn over it.
impl WidgetRef for &TextArea {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let right = self.scroll + area.width as usize;
        let mut col = 0usize;
        for g in self.text.graphemes(true) {
            let w = g.width();
            if col >= right {
                break;
            }
            if w > 0 && col >= self.scroll && col + w <= right {
                let x = area.x + (col - self.scroll) as u16;
                buf.set_string(x, area.y, g, Style::default());
            }
            col += w;
        }
    }
}
