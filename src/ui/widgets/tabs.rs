// src/ui/widgets/tabs.rs

use crate::app::App;
use crate::core::models::Category;
use crate::core::tab_state::TabStatus;
use chrono::Local;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Tabs},
};

/// Marker shown after each tab label.
pub fn status_marker(app: &App, category: Category) -> (&'static str, Color) {
    match app.tab(category).status {
        TabStatus::Unavailable => ("-", Color::DarkGray),
        TabStatus::Unrequested => ("·", Color::Gray),
        TabStatus::Pending if app.is_dormant(category) => ("…", Color::Magenta),
        TabStatus::Pending => ("○", Color::Cyan),
        TabStatus::Ready => ("✓", Color::Green),
        TabStatus::Error => ("✗", Color::Red),
    }
}

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Category::all()
        .map(|category| {
            let (marker, color) = status_marker(app, category);
            Line::from(vec![
                Span::raw(format!("{} ", category.label())),
                Span::styled(marker, Style::default().fg(color)),
            ])
        })
        .collect();

    let title = match &app.session {
        Some(session) => {
            let started = session.created_at().with_timezone(&Local).format("%H:%M:%S");
            match session.port() {
                Some(port) => format!("Results for {}:{} (started {})", session.target(), port, started),
                None => format!("Results for {} (started {})", session.target(), started),
            }
        }
        None => "Results".to_string(),
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(app.active_tab.index())
        .highlight_style(Style::new().bold().bg(Color::DarkGray));
    frame.render_widget(tabs, area);
}
