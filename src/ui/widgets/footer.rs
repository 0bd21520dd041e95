// src/ui/widgets/footer.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Renders the footer widget, which displays available actions.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let spans = match app.state {
        AppState::Editing => Line::from(vec![
            key("Enter"),
            Span::raw(" run checks, "),
            key("Tab"),
            Span::raw(" switch field, "),
            key("F1-F9"),
            Span::raw(" examples, "),
            key("Esc"),
            Span::raw(if app.session.is_some() { " back" } else { " quit" }),
        ]),
        AppState::Viewing => Line::from(vec![
            key("←/→"),
            Span::raw(" tabs, "),
            key("↑/↓"),
            Span::raw(" scroll, "),
            key("[R]"),
            Span::raw("efresh, "),
            key("[N]"),
            Span::raw("ew target, "),
            key("[Q]"),
            Span::raw("uit"),
        ]),
    };

    let footer = Paragraph::new(spans).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
