use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::event::EventStream;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::search::Token;
use crate::ui::terminal::{
    input::{InputManager, KeyEventResult},
    search::Search,
    tui,
};

/// A query the user submitted with Enter.
#[derive(Debug, Clone)]
pub struct SubmittedQuery {
    pub query: String,
    pub tokens: Vec<Token>,
}

/// Main event loop for handling terminal events
async fn event_loop(
    input_manager: &mut InputManager,
    tui: &mut tui::Tui,
) -> Result<Option<SubmittedQuery>> {
    let mut event_stream = EventStream::new();
    let mut needs_redraw = true; // Draw initial frame

    loop {
        if needs_redraw {
            tui.draw(|frame| {
                let area = frame.area();
                if let Some(cursor) = input_manager.search.render(area, frame.buffer_mut()) {
                    frame.set_cursor_position(cursor);
                }
            })?;
            needs_redraw = false;
        }

        let Some(event) = event_stream.next().await else {
            debug!("Event stream ended");
            return Ok(None);
        };
        match input_manager.handle_event(event?) {
            KeyEventResult::Quit => return Ok(None),
            KeyEventResult::Submit { query, tokens } => {
                info!(query = %query, tokens = tokens.len(), "query submitted");
                return Ok(Some(SubmittedQuery { query, tokens }));
            }
            KeyEventResult::Escape | KeyEventResult::Continue => {}
        }
        needs_redraw = true;
    }
}

pub struct TerminalSearchApp {
    config: SearchConfig,
    /// Viewport rows; `None` sizes it to fit the search box and its popup.
    height: Option<u16>,
}

impl TerminalSearchApp {
    pub fn new(config: SearchConfig, height: Option<u16>) -> Self {
        Self { config, height }
    }

    /// Run the search box until the user submits or quits.
    pub async fn run(&self) -> Result<Option<SubmittedQuery>> {
        let mut input_manager = InputManager::new(Search::new(self.config.clone()));
        // Start focused, like an input with autofocus.
        input_manager.search.on_focus();

        let height = self
            .height
            .unwrap_or_else(|| input_manager.search.max_height())
            .max(1);
        let mut tui = tui::init(height)?;
        info!(height, "search box started");

        let loop_result = event_loop(&mut input_manager, &mut tui).await;

        // Move cursor below the viewport so post-exit output appears below the UI.
        let viewport = tui.viewport_area();
        let move_result = crossterm::execute!(std::io::stdout(), MoveTo(0, viewport.bottom()));
        let cleanup_result = tui.restore();

        if let Err(cleanup_error) = cleanup_result.and(move_result) {
            if loop_result.is_ok() {
                return Err(cleanup_error.into());
            }
            warn!(
                "Terminal cleanup failed after loop error: {}",
                cleanup_error
            );
        }

        loop_result
    }
}
