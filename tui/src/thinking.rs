//! The "Nesti is thinking..." indicator shown while a request is in flight.

use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::ui_colors::primary_color;

const DOT_FRAMES: &[&str] = &["·  ", "·· ", "···", " ··", "  ·", "   "];

#[derive(Debug, Default)]
pub(crate) struct ThinkingIndicator {
    frame: usize,
}

impl ThinkingIndicator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Advance the dot animation by one frame.
    pub(crate) fn tick(&mut self) {
        self.frame = (self.frame + 1) % DOT_FRAMES.len();
    }

    pub(crate) fn reset(&mut self) {
        self.frame = 0;
    }

    pub(crate) fn line(&self) -> Line<'static> {
        Line::from(vec![
            Span::from("Nesti is thinking").fg(primary_color()),
            Span::from(" "),
            Span::from(DOT_FRAMES[self.frame]).fg(primary_color()).bold(),
        ])
    }
}
