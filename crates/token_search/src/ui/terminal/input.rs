use derive_more::IsVariant;
use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::debug;

use super::search::Search;
use crate::search::Token;

/// Result of handling a terminal event
#[derive(Debug, IsVariant)]
pub enum KeyEventResult {
    /// Continue processing normally
    Continue,
    /// Quit the application
    Quit,
    /// Submit the query
    Submit { query: String, tokens: Vec<Token> },
    /// Escape key was pressed; the search box has been blurred
    Escape,
}

/// Routes terminal events to the search box handlers.
pub struct InputManager {
    pub search: Search,
}

impl InputManager {
    pub fn new(search: Search) -> Self {
        Self { search }
    }

    pub fn handle_event(&mut self, event: Event) -> KeyEventResult {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::Paste(pasted) => {
                self.handle_paste(pasted);
                KeyEventResult::Continue
            }
            Event::FocusLost => {
                self.search.on_blur();
                KeyEventResult::Continue
            }
            Event::FocusGained => {
                self.search.on_focus();
                KeyEventResult::Continue
            }
            Event::Mouse(mouse_event) => {
                self.handle_mouse_event(mouse_event);
                KeyEventResult::Continue
            }
            Event::Resize(_, _) => KeyEventResult::Continue,
        }
    }

    /// Handle a key event and return the appropriate result
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> KeyEventResult {
        if key_event.kind == KeyEventKind::Release {
            // A blurred input gets no key up, or the release of Esc would refocus it.
            if self.search.is_focused() {
                self.search.on_key_up(key_event);
            }
            return KeyEventResult::Continue;
        }

        match key_event {
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => KeyEventResult::Quit,
            KeyEvent {
                code: KeyCode::Esc,
                modifiers: KeyModifiers::NONE,
                ..
            } => {
                self.search.on_blur();
                KeyEventResult::Escape
            }
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => {
                let query = self.search.state().text.clone();
                if query.trim().is_empty() {
                    KeyEventResult::Continue
                } else {
                    KeyEventResult::Submit {
                        tokens: self.search.tokens(),
                        query,
                    }
                }
            }
            KeyEvent {
                code: KeyCode::Char('x'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                let cut = self.search.on_cut();
                if !cut.is_empty() && !copy_to_clipboard(&cut) {
                    debug!("Clipboard unavailable; cut text kept in kill buffer only");
                }
                KeyEventResult::Continue
            }
            // Ctrl-V / Alt-V: paste from the system clipboard for terminals
            // that don't deliver bracketed paste.
            KeyEvent {
                code: KeyCode::Char('v'),
                modifiers,
                ..
            } if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                match read_clipboard() {
                    Some(text) => self.handle_paste(text),
                    None => debug!("No clipboard text found on Ctrl/Alt-V"),
                }
                KeyEventResult::Continue
            }
            _ => {
                self.search.on_key_down(key_event);
                KeyEventResult::Continue
            }
        }
    }

    /// Handle a terminal paste event (from bracketed paste).
    pub fn handle_paste(&mut self, pasted: String) {
        // Many terminals convert newlines to \r when pasting.
        let pasted = pasted.replace("\r\n", " ").replace(['\r', '\n'], " ");
        self.search.on_paste(&pasted);
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        if mouse_event.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let area = self.search.input_area();
        let inside = mouse_event.row == area.y
            && mouse_event.column >= area.x
            && mouse_event.column < area.right();
        if inside {
            self.search.on_click(mouse_event.column - area.x);
        } else {
            self.search.on_blur();
        }
    }
}

fn copy_to_clipboard(text: &str) -> bool {
    let Ok(mut clipboard) = arboard::Clipboard::new() else {
        return false;
    };
    clipboard.set_text(text.to_string()).is_ok()
}

fn read_clipboard() -> Option<String> {
    let mut clipboard = arboard::Clipboard::new().ok()?;
    clipboard.get_text().ok().filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use ratatui::buffer::Buffer;
    use ratatui::crossterm::event::{KeyEventState, MouseEventKind};
    use ratatui::layout::Rect;

    fn create_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn new_input_manager() -> InputManager {
        InputManager::new(Search::new(SearchConfig::default()))
    }

    fn type_str(input_manager: &mut InputManager, text: &str) {
        for c in text.chars() {
            input_manager.handle_key_event(create_key_event(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_typing_and_submit() {
        let mut input_manager = new_input_manager();
        type_str(&mut input_manager, "label:bug");
        assert_eq!(input_manager.search.state().text, "label:bug");

        let result =
            input_manager.handle_key_event(create_key_event(KeyCode::Enter, KeyModifiers::NONE));
        match result {
            KeyEventResult::Submit { query, tokens } => {
                assert_eq!(query, "label:bug");
                assert_eq!(tokens.len(), 2);
            }
            other => panic!("Expected Submit, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_submit_is_ignored() {
        let mut input_manager = new_input_manager();
        type_str(&mut input_manager, "  ");
        let result =
            input_manager.handle_key_event(create_key_event(KeyCode::Enter, KeyModifiers::NONE));
        assert!(result.is_continue());
    }

    #[test]
    fn test_quit_signal() {
        let mut input_manager = new_input_manager();
        let result = input_manager
            .handle_key_event(create_key_event(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(result.is_quit());
    }

    #[test]
    fn test_escape_blurs() {
        let mut input_manager = new_input_manager();
        type_str(&mut input_manager, "bug");
        let result =
            input_manager.handle_key_event(create_key_event(KeyCode::Esc, KeyModifiers::NONE));
        assert!(result.is_escape());
        assert_eq!(input_manager.search.state().caret, None);
    }

    fn release(code: KeyCode) -> Event {
        let mut key_event = create_key_event(code, KeyModifiers::NONE);
        key_event.kind = KeyEventKind::Release;
        Event::Key(key_event)
    }

    #[test]
    fn test_release_is_key_up() {
        let mut input_manager = new_input_manager();
        type_str(&mut input_manager, "ab");
        input_manager.handle_key_event(create_key_event(KeyCode::Left, KeyModifiers::NONE));
        assert_eq!(input_manager.search.state().caret, Some(1));

        input_manager.handle_event(release(KeyCode::Char('z')));
        // Releases are not forwarded to the input, so nothing is inserted.
        assert_eq!(input_manager.search.state().text, "ab");
        assert_eq!(input_manager.search.state().caret, Some(1));
    }

    #[test]
    fn test_release_while_blurred_keeps_caret_cleared() {
        let mut input_manager = new_input_manager();
        type_str(&mut input_manager, "ab");
        input_manager.handle_event(Event::FocusLost);
        input_manager.handle_event(release(KeyCode::Char('b')));
        assert_eq!(input_manager.search.state().caret, None);
    }

    #[test]
    fn test_escape_release_does_not_refocus() {
        let mut input_manager = new_input_manager();
        type_str(&mut input_manager, "status:op");
        let result =
            input_manager.handle_key_event(create_key_event(KeyCode::Esc, KeyModifiers::NONE));
        assert!(result.is_escape());
        let result = input_manager.handle_event(release(KeyCode::Esc));
        assert!(result.is_continue());
        assert_eq!(input_manager.search.state().caret, None);

        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        assert_eq!(input_manager.search.render(area, &mut buf), None);
        // No popup under the value token.
        assert_eq!(buf[(8, 1)].symbol(), " ");
    }

    #[test]
    fn test_focus_events() {
        let mut input_manager = new_input_manager();
        type_str(&mut input_manager, "ab");
        input_manager.handle_event(Event::FocusLost);
        assert!(!input_manager.search.is_focused());
        input_manager.handle_event(Event::FocusGained);
        assert_eq!(input_manager.search.state().caret, Some(2));
    }

    #[test]
    fn test_paste_normalizes_newlines() {
        let mut input_manager = new_input_manager();
        input_manager.handle_event(Event::Paste("is:pr\r\nbug".to_string()));
        assert_eq!(input_manager.search.state().text, "is:pr bug");
        assert_eq!(input_manager.search.state().caret, Some(9));
    }

    #[test]
    fn test_mouse_click_inside_and_outside() {
        let mut input_manager = new_input_manager();
        type_str(&mut input_manager, "ab,cd");
        let area = Rect::new(0, 3, 30, 4);
        let mut buf = Buffer::empty(area);
        input_manager.search.render(area, &mut buf);

        // Input row starts after the two prefix columns.
        input_manager.handle_event(click(3, 3));
        assert_eq!(input_manager.search.state().caret, Some(1));

        input_manager.handle_event(click(3, 5));
        assert_eq!(input_manager.search.state().caret, None);
    }
}
