// src/ui/widgets/input.rs
use crate::app::{App, AppState, InputField};
use ratatui::{prelude::*, widgets::{Block, Borders, Paragraph}};

/// Renders the target and port boxes. Field errors replace the box title.
pub fn render_input(frame: &mut Frame, app: &App, target_area: Rect, port_area: Rect) {
    render_box(frame, app, InputField::Target, "Target (host or IP)", &app.target_input, target_area);
    render_box(frame, app, InputField::Port, "Port (optional)", &app.port_input, port_area);
}

fn render_box(frame: &mut Frame, app: &App, field: InputField, title: &str, value: &str, area: Rect) {
    let editing = app.state == AppState::Editing;
    let focused = editing && app.focus == field;
    let key = match field {
        InputField::Target => "target",
        InputField::Port => "port",
    };

    let (title, border_style) = match app.field_error(key) {
        Some(error) => (format!("{} - {}", title, error.message), Style::default().fg(Color::Red)),
        None if focused => (title.to_string(), Style::default().fg(Color::Yellow)),
        None => (title.to_string(), Style::default().fg(Color::DarkGray)),
    };

    let block = Block::default().borders(Borders::ALL).title(title).border_style(border_style);
    let paragraph = Paragraph::new(value)
        .block(block)
        .style(Style::default().fg(if editing { Color::Yellow } else { Color::Gray }));
    frame.render_widget(paragraph, area);

    if focused {
        frame.set_cursor_position(Position::new(area.x + value.chars().count() as u16 + 1, area.y + 1));
    }
}
