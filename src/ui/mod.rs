// src/ui/mod.rs

use crate::app::App;
use ratatui::prelude::*;

mod layout;
mod widgets;

pub fn render(app: &App, frame: &mut Frame) {
    let layout = layout::create_layout(frame.area());

    widgets::input::render_input(frame, app, layout.target_input, layout.port_input);
    widgets::tabs::render_tabs(frame, app, layout.tabs);
    widgets::results::render_results(frame, app, layout.content);
    widgets::footer::render_footer(frame, app, layout.footer);
}
