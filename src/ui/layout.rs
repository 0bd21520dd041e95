// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions, computed once per frame.
pub struct AppLayout {
    pub target_input: Rect,
    pub port_input: Rect,
    pub tabs: Rect,
    pub content: Rect,
    pub footer: Rect,
}

/// Input row on top, tab bar below it, the focused tab's content, and a one-line footer.
pub fn create_layout(frame_size: Rect) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let input_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(main_chunks[0]);

    AppLayout {
        target_input: input_chunks[0],
        port_input: input_chunks[1],
        tabs: main_chunks[1],
        content: main_chunks[2],
        footer: main_chunks[3],
    }
}
