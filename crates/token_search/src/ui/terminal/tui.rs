// Terminal setup and teardown for the search box.
//
// The UI lives in an inline viewport below the shell prompt, so scrollback
// stays intact and output printed after exit lands under the widget.

use std::io;
use std::io::stdout;
use std::io::Stdout;
use std::panic;

use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
    EnableFocusChange, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::disable_raw_mode;
use ratatui::crossterm::terminal::enable_raw_mode;
use ratatui::crossterm::terminal::supports_keyboard_enhancement;
use ratatui::layout::Rect;
use ratatui::{Frame, TerminalOptions, Viewport};
use tracing::debug;

/// Type alias for the terminal type used in this application.
pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal with an inline viewport of `height` rows.
pub fn init(height: u16) -> io::Result<Tui> {
    enable_raw_mode()?;
    execute!(
        stdout(),
        EnableBracketedPaste,
        EnableFocusChange,
        EnableMouseCapture
    )?;

    // Release events only arrive with the kitty keyboard protocol.
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if keyboard_enhanced {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }
    debug!(keyboard_enhanced, "terminal initialized");

    set_panic_hook(keyboard_enhanced);

    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(height),
        },
    )?;
    Ok(Tui {
        terminal,
        keyboard_enhanced,
    })
}

/// Restore terminal state.
pub fn restore(keyboard_enhanced: bool) -> io::Result<()> {
    if keyboard_enhanced {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    execute!(
        stdout(),
        DisableMouseCapture,
        DisableFocusChange,
        DisableBracketedPaste
    )?;
    disable_raw_mode()?;
    Ok(())
}

fn set_panic_hook(keyboard_enhanced: bool) {
    let hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore(keyboard_enhanced);
        hook(panic_info);
    }));
}

pub struct Tui {
    pub terminal: Terminal,
    keyboard_enhanced: bool,
}

impl Tui {
    pub fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }

    /// Area of the inline viewport on screen.
    pub fn viewport_area(&mut self) -> Rect {
        self.terminal.get_frame().area()
    }

    pub fn restore(&self) -> io::Result<()> {
        restore(self.keyboard_enhanced)
    }
}
