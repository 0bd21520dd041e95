// src/main.rs

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod app;
mod config;
mod core;
mod logging;
mod ui;

use app::{App, AppState};
use crate::core::gateway::HttpGateway;
use crate::core::orchestrator::{CheckOrchestrator, TabStateChange};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let settings = config::Settings::load()?;
    info!(api = %settings.api_base_url, authenticated = settings.credentials().is_some(), "Starting dashboard.");
    let gateway = HttpGateway::new(&settings.api_base_url, settings.credentials(), settings.request_timeout())?;
    let orchestrator = CheckOrchestrator::new(Arc::new(gateway), settings.poll_settings())
        .with_check_options(settings.check_options.clone());
    let mut changes = orchestrator.subscribe();

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new(settings.polling.max_retries);
    let result = run(&mut terminal, &mut app, &orchestrator, &mut changes);

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    orchestrator: &CheckOrchestrator,
    changes: &mut tokio::sync::mpsc::UnboundedReceiver<TabStateChange>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(app, orchestrator)?;
        }

        while let Ok(change) = changes.try_recv() {
            app.apply_change(change);
        }
        app.on_tick();
    }
    Ok(())
}

fn handle_events(app: &mut App, orchestrator: &CheckOrchestrator) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Editing => handle_editing_input(app, orchestrator, key.code),
                AppState::Viewing => handle_viewing_input(app, orchestrator, key.code),
            }
        }
    }
    Ok(())
}

fn handle_editing_input(app: &mut App, orchestrator: &CheckOrchestrator, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc if app.session.is_some() => app.state = AppState::Viewing,
        KeyCode::Esc => app.quit(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::F(n @ 1..=9) => app.load_example(usize::from(n - 1)),
        KeyCode::Char(c) => app.push_char(c),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Enter => match orchestrator.create_session(&app.target_input, app.port_value()) {
            Ok(session) => {
                app.begin_session(Arc::clone(&session));
                orchestrator.activate_category(&session, app.active_tab);
            }
            Err(e) => {
                warn!(error = %e, "Input rejected.");
                app.set_form_errors(&e);
            }
        },
        _ => {}
    }
}

fn handle_viewing_input(app: &mut App, orchestrator: &CheckOrchestrator, key_code: KeyCode) {
    let Some(session) = app.session.clone() else {
        app.reset();
        return;
    };
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('r') => orchestrator.manual_refresh(&session, app.active_tab),
        KeyCode::Left | KeyCode::Right => {
            let category = if key_code == KeyCode::Left { app.previous_tab() } else { app.next_tab() };
            if app.needs_activation(category) {
                orchestrator.activate_category(&session, category);
            }
        }
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}
