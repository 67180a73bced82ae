use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::WidgetRef;
use tracing::{debug, trace};
use unicode_width::UnicodeWidthStr;

use super::background::{Background, BackgroundLayer};
use super::popup::Popup;
use super::textarea::TextArea;
use crate::config::SearchConfig;
use crate::search::{
    self, get_adapter, prepare_config, tokenize, ActiveToken, AdapterLookup, Token, TokenConfig,
};

/// Width reserved for the "› " prefix to the left of the input.
const PREFIX_COLS: u16 = 2;

/// What the widget knows about the input: its text and where the caret is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub text: String,
    /// Character offset of the caret, `None` while the input is unfocused.
    pub caret: Option<usize>,
}

/// Search box: a raw input, a background layer showing the styled tokens,
/// and a suggestion popup anchored to the token under the caret.
pub struct Search {
    config: SearchConfig,
    token_config: TokenConfig,
    adapter: AdapterLookup,
    state: InputState,
    input: TextArea,
    background: Option<BackgroundLayer>,
    /// Screen area of the input row from the last render, for mouse hit-testing.
    input_area: Rect,
}

impl Search {
    pub fn new(config: SearchConfig) -> Self {
        let mut search = Self::detached(config);
        search.attach_background(BackgroundLayer::new());
        search
    }

    /// A search box with no background layer; tokens are not highlighted
    /// until one is attached.
    pub fn detached(config: SearchConfig) -> Self {
        Self {
            token_config: prepare_config(&config),
            adapter: get_adapter(&config),
            config,
            state: InputState::default(),
            input: TextArea::new(),
            background: None,
            input_area: Rect::default(),
        }
    }

    pub fn attach_background(&mut self, layer: BackgroundLayer) {
        self.background = Some(layer);
        self.scroll_background();
    }

    pub fn detach_background(&mut self) -> Option<BackgroundLayer> {
        self.background.take()
    }

    pub fn background(&self) -> Option<&BackgroundLayer> {
        self.background.as_ref()
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.token_config = prepare_config(&config);
        self.adapter = get_adapter(&config);
        self.config = config;
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn input(&self) -> &TextArea {
        &self.input
    }

    pub fn input_area(&self) -> Rect {
        self.input_area
    }

    pub fn is_focused(&self) -> bool {
        self.state.caret.is_some()
    }

    // ####### Event Handlers #######

    pub fn on_blur(&mut self) {
        debug!("search blurred");
        self.set_cursor_location(None);
    }

    pub fn on_focus(&mut self) {
        debug!("search focused");
        self.set_cursor_location(Some(self.input.cursor_char_offset()));
    }

    /// Click at `column` of the input row (0 = first visible column).
    pub fn on_click(&mut self, column: u16) {
        self.input.set_cursor_from_column(column);
        self.set_cursor_location(Some(self.input.cursor_char_offset()));
    }

    /// Remove the whole input and return it for the clipboard.
    pub fn on_cut(&mut self) -> String {
        let cut = self.input.take_text();
        self.set_cursor_location(Some(self.input.cursor_char_offset()));
        self.state.text = self.input.text().to_string();
        debug!(chars = cut.chars().count(), "cut input");
        cut
    }

    pub fn on_paste(&mut self, pasted: &str) {
        self.input.insert_str(pasted);
        self.set_cursor_location(Some(self.input.cursor_char_offset()));
        self.state.text = self.input.text().to_string();
    }

    pub fn on_key_down(&mut self, key: KeyEvent) {
        self.input.input(key);
        self.set_cursor_location(Some(self.input.cursor_char_offset()));
        self.sync_text();
    }

    /// Key releases never edit; they only report where the input left the caret.
    pub fn on_key_up(&mut self, _key: KeyEvent) {
        self.set_cursor_location(Some(self.input.cursor_char_offset()));
        self.sync_text();
    }

    fn sync_text(&mut self) {
        if self.input.text() != self.state.text {
            self.state.text = self.input.text().to_string();
        }
    }

    fn set_cursor_location(&mut self, location: Option<usize>) {
        self.scroll_background();
        self.state.caret = location;
    }

    /// Copy the input's horizontal offset onto the background layer.
    fn scroll_background(&mut self) {
        let input_scroll = self.input.scroll_offset();
        if let Some(layer) = self.background.as_mut() {
            if layer.scroll_left() != input_scroll {
                trace!(
                    from = layer.scroll_left(),
                    to = input_scroll,
                    "sync background scroll"
                );
                layer.set_scroll_left(input_scroll);
            }
        }
    }

    /// Runs after every render.
    fn did_update(&mut self) {
        self.scroll_background();
    }

    // ####### Derived State #######

    pub fn tokens(&self) -> Vec<Token> {
        tokenize(&self.state.text, &self.token_config)
    }

    pub fn active_token_index(&self) -> Option<usize> {
        search::resolve_active_token_index(&self.tokens(), self.state.caret)
    }

    pub fn is_last_token_selected(&self) -> bool {
        search::is_last_token_selected(&self.tokens(), self.active_token_index())
    }

    pub fn active_token(&self) -> Option<Token> {
        self.active_token_index()
            .map(|index| self.tokens().swap_remove(index))
    }

    /// Rows needed for the input plus the tallest popup the config allows.
    pub fn max_height(&self) -> u16 {
        let popup_rows = u16::try_from(self.config.max_suggestions)
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        popup_rows.saturating_add(1)
    }

    // ####### Rendering #######

    /// Render into `area` (input on the first row, popup below). Returns
    /// where the terminal cursor belongs, if the input is focused and the
    /// caret is visible.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) -> Option<Position> {
        if area.height == 0 || area.width <= PREFIX_COLS {
            return None;
        }

        let input_area = Rect {
            x: area.x + PREFIX_COLS,
            y: area.y,
            width: area.width - PREFIX_COLS,
            height: 1,
        };
        let popup_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height - 1,
        };
        self.input_area = input_area;
        // Layout can move the input's scroll; mirror it before painting.
        self.input.set_viewport_width(input_area.width);
        self.scroll_background();

        let prompt_style = if self.is_focused() {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        buf.set_span(area.x, area.y, &Span::styled("›", prompt_style), PREFIX_COLS);

        if self.state.text.is_empty() {
            let placeholder_style = Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM);
            buf.set_stringn(
                input_area.x,
                input_area.y,
                &self.config.placeholder,
                input_area.width as usize,
                placeholder_style,
            );
        }

        let tokens = self.tokens();
        let active = search::active_token(&tokens, self.state.caret);
        let is_last_token_selected =
            search::is_last_token_selected(&tokens, active.map(|a| a.index));

        (&self.input).render_ref(input_area, buf);

        if let Some(layer) = self.background.as_ref() {
            Background {
                layer,
                tokens: &tokens,
                adapter: &self.adapter,
                is_last_token_selected,
                active_token: active,
            }
            .render_ref(input_area, buf);
        }

        if popup_area.height > 0 {
            Popup {
                active_token: active,
                adapter: &self.adapter,
                anchor_x: self.anchor_column(input_area, active),
            }
            .render_ref(popup_area, buf);
        }

        let cursor = self
            .state
            .caret
            .and_then(|_| self.input.cursor_position(input_area))
            .map(|(x, y)| Position::new(x, y));

        self.did_update();
        cursor
    }

    /// Screen column of the active token's first cell, one left so the popup
    /// border sits just before it.
    fn anchor_column(&self, input_area: Rect, active: Option<ActiveToken<'_>>) -> u16 {
        let Some(active) = active else {
            return input_area.x;
        };
        let prefix: String = self.state.text.chars().take(active.start).collect();
        let col = prefix.width().saturating_sub(self.input.scroll_offset());
        let col = col.min(input_area.width.saturating_sub(1) as usize) as u16;
        (input_area.x + col).saturating_sub(1)
    }
}
