use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, WidgetRef};
use unicode_width::UnicodeWidthStr;

use crate::search::{ActiveToken, AdapterLookup, Suggestion};

/// Gap between a suggestion and its description.
const DETAIL_GAP: usize = 2;

/// Suggestion list anchored below the active token.
pub struct Popup<'a> {
    pub active_token: Option<ActiveToken<'a>>,
    pub adapter: &'a AdapterLookup,
    /// Screen column the popup's left border should line up with.
    pub anchor_x: u16,
}

impl Popup<'_> {
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.active_token
            .map(|active| self.adapter.adapter(active.token).suggestions())
            .unwrap_or_default()
    }

    /// Rows needed to show every suggestion, borders included; 0 when hidden.
    pub fn required_height(&self) -> u16 {
        let count = self.suggestions().len();
        if count == 0 {
            0
        } else {
            with_border(count)
        }
    }
}

/// `inner` cells plus one border cell on each side, saturating at `u16::MAX`.
fn with_border(inner: usize) -> u16 {
    u16::try_from(inner).unwrap_or(u16::MAX).saturating_add(2)
}

impl WidgetRef for Popup<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let suggestions = self.suggestions();
        if suggestions.is_empty() || area.height < 3 || area.width < 3 {
            return;
        }

        let content_width = suggestions
            .iter()
            .map(|s| {
                s.label.width()
                    + s.detail
                        .as_deref()
                        .map(|d| DETAIL_GAP + d.width())
                        .unwrap_or(0)
            })
            .max()
            .unwrap_or(0);
        let width = with_border(content_width).min(area.width);
        let height = with_border(suggestions.len()).min(area.height);
        // Shift left when the anchor would push the popup past the right edge.
        let x = self
            .anchor_x
            .clamp(area.x, area.right().saturating_sub(width));
        let rect = Rect::new(x, area.y, width, height);

        let detail_style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM);
        let lines: Vec<Line> = suggestions
            .into_iter()
            .map(|s| {
                let mut spans = vec![Span::raw(s.label)];
                if let Some(detail) = s.detail {
                    spans.push(Span::raw(" ".repeat(DETAIL_GAP)));
                    spans.push(Span::styled(detail, detail_style));
                }
                Line::from(spans)
            })
            .collect();

        Clear.render(rect, buf);
        Paragraph::new(lines)
            .block(Block::bordered().border_style(Style::default().fg(Color::DarkGray)))
            .render(rect, buf);
    }
}
