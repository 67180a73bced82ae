use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::WidgetRef;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::search::{ActiveToken, AdapterLookup, Token};

/// Persistent state of the background layer. The search box keeps its
/// horizontal offset in step with the input it mirrors.
#[derive(Debug, Default)]
pub struct BackgroundLayer {
    scroll_left: usize,
}

impl BackgroundLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_left(&self) -> usize {
        self.scroll_left
    }

    pub fn set_scroll_left(&mut self, scroll_left: usize) {
        self.scroll_left = scroll_left;
    }
}

/// Styled rendition of the tokens, painted over the raw input text.
pub struct Background<'a> {
    pub layer: &'a BackgroundLayer,
    pub tokens: &'a [Token],
    pub adapter: &'a AdapterLookup,
    pub is_last_token_selected: bool,
    pub active_token: Option<ActiveToken<'a>>,
}

fn ghost_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM)
}

impl WidgetRef for Background<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let active_index = self.active_token.map(|a| a.index);
        let mut col = 0;
        for (index, token) in self.tokens.iter().enumerate() {
            let mut style = self.adapter.adapter(token).style();
            if active_index == Some(index) && !token.kind.is_whitespace() {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            col = self.paint(area, buf, col, &token.text, style);
        }

        // Inline completion after the last token while the caret is on it.
        if self.is_last_token_selected {
            if let Some(active) = self.active_token {
                if let Some(rest) = self.adapter.adapter(active.token).completion() {
                    self.paint(area, buf, col, &rest, ghost_style());
                }
            }
        }
    }
}

impl Background<'_> {
    /// Paint `text` starting at display column `col` (relative to the start
    /// of the input), clipped to the scrolled window. Returns the column after it.
    fn paint(
        &self,
        area: Rect,
        buf: &mut Buffer,
        mut col: usize,
        text: &str,
        style: Style,
    ) -> usize {
        let left = self.layer.scroll_left;
        let right = left + area.width as usize;
        for g in text.graphemes(true) {
            let w = g.width();
            if w > 0 && col >= left && col + w <= right {
                buf.set_string(area.x + (col - left) as u16, area.y, g, style);
            }
            col += w;
        }
        col
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::search::{active_token, get_adapter, prepare_config, tokenize};

    fn render(text: &str, caret: Option<usize>, scroll: usize, width: u16) -> Buffer {
        let config = SearchConfig::default();
        let tokens = tokenize(text, &prepare_config(&config));
        let adapter = get_adapter(&config);
        let active = active_token(&tokens, caret);
        let mut layer = BackgroundLayer::new();
        layer.set_scroll_left(scroll);
        let background = Background {
            layer: &layer,
            tokens: &tokens,
            adapter: &adapter,
            is_last_token_selected: crate::search::is_last_token_selected(
                &tokens,
                active.map(|a| a.index),
            ),
            active_token: active,
        };
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        background.render_ref(area, &mut buf);
        buf
    }

    #[test]
    fn test_tokens_are_styled() {
        let buf = render("status:open", None, 0, 20);
        assert_eq!(buf[(0, 0)].symbol(), "s");
        assert_eq!(buf[(0, 0)].fg, Color::Cyan);
        assert!(buf[(0, 0)].modifier.contains(Modifier::BOLD));
        assert_eq!(buf[(7, 0)].symbol(), "o");
        assert_eq!(buf[(7, 0)].fg, Color::Green);
    }

    #[test]
    fn test_active_token_is_underlined() {
        let buf = render("bug docs", Some(2), 0, 20);
        assert!(buf[(0, 0)].modifier.contains(Modifier::UNDERLINED));
        assert!(!buf[(4, 0)].modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_ghost_completion_after_last_token() {
        let buf = render("status:cl", Some(9), 0, 20);
        assert_eq!(buf[(9, 0)].symbol(), "o");
        assert!(buf[(9, 0)].modifier.contains(Modifier::DIM));
        assert_eq!(buf[(12, 0)].symbol(), "d");
    }

    #[test]
    fn test_no_ghost_when_unfocused() {
        let buf = render("status:cl", None, 0, 20);
        assert_eq!(buf[(9, 0)].symbol(), " ");
    }

    #[test]
    fn test_scroll_left_clips_tokens() {
        let buf = render("status:open", None, 7, 4);
        assert_eq!(buf[(0, 0)].symbol(), "o");
        assert_eq!(buf[(3, 0)].symbol(), "n");
        assert_eq!(buf[(0, 0)].fg, Color::Green);
    }
}
