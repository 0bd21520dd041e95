// src/app.rs

use crate::core::error::{CheckError, FieldError};
use crate::core::models::Category;
use crate::core::orchestrator::TabStateChange;
use crate::core::session::Session;
use crate::core::tab_state::{TabState, TabStatus};
use std::sync::Arc;
use strum::EnumCount;

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Quick targets bound to F1..F9.
pub const QUICK_EXAMPLES: [(&str, &str); 9] = [
    ("Google", "google.com"),
    ("Cloudflare", "cloudflare.com"),
    ("GitHub", "github.com"),
    ("Google DNS", "8.8.8.8"),
    ("Cloudflare DNS", "1.1.1.1"),
    ("OpenDNS", "208.67.222.222"),
    ("HTTP Test", "httpbin.org"),
    ("SSL Labs", "ssllabs.com"),
    ("Speed Test", "speedtest.net"),
];

const MAX_PORT_DIGITS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Typing a target and an optional port.
    Editing,
    /// Browsing the tabs of the current session.
    Viewing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Target,
    Port,
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub target_input: String,
    pub port_input: String,
    pub focus: InputField,
    pub form_errors: Vec<FieldError>,
    pub session: Option<Arc<Session>>,
    pub active_tab: Category,
    pub tabs: [TabState; Category::COUNT],
    pub spinner_frame: usize,
    pub scroll_offset: u16,
    pub max_retries: u32,
}

impl App {
    pub fn new(max_retries: u32) -> Self {
        Self {
            should_quit: false,
            state: AppState::Editing,
            target_input: String::new(),
            port_input: String::new(),
            focus: InputField::Target,
            form_errors: Vec::new(),
            session: None,
            active_tab: Category::GeoIp,
            tabs: std::array::from_fn(|_| TabState::unrequested()),
            spinner_frame: 0,
            scroll_offset: 0,
            max_retries,
        }
    }

    pub fn on_tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // --- Form ---

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            InputField::Target if !c.is_whitespace() => self.target_input.push(c),
            InputField::Port if c.is_ascii_digit() && self.port_input.len() < MAX_PORT_DIGITS => {
                self.port_input.push(c)
            }
            _ => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            InputField::Target => self.target_input.pop(),
            InputField::Port => self.port_input.pop(),
        };
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            InputField::Target => InputField::Port,
            InputField::Port => InputField::Target,
        };
    }

    pub fn load_example(&mut self, index: usize) {
        if let Some((_, target)) = QUICK_EXAMPLES.get(index) {
            self.target_input = target.to_string();
            self.port_input.clear();
            self.focus = InputField::Target;
            self.form_errors.clear();
        }
    }

    /// The port as typed, or `None` when the box is empty.
    pub fn port_value(&self) -> Option<&str> {
        Some(self.port_input.as_str()).filter(|port| !port.is_empty())
    }

    pub fn set_form_errors(&mut self, error: &CheckError) {
        self.form_errors = match error.field_errors() {
            [] => vec![FieldError::new("general", &error.to_string())],
            errors => errors.to_vec(),
        };
    }

    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.form_errors.iter().find(|error| error.field == field)
    }

    // --- Session ---

    pub fn begin_session(&mut self, session: Arc<Session>) {
        self.tabs = std::array::from_fn(|index| match Category::from_index(index) {
            Some(category) if !session.is_available(category) => TabState::unavailable(),
            _ => TabState::unrequested(),
        });
        self.session = Some(session);
        self.active_tab = Category::GeoIp;
        self.form_errors.clear();
        self.scroll_offset = 0;
        self.state = AppState::Viewing;
    }

    /// Back to the form, keeping the last input for editing.
    pub fn reset(&mut self) {
        self.state = AppState::Editing;
        self.focus = InputField::Target;
        self.scroll_offset = 0;
    }

    /// Applies a change from the orchestrator. Changes for any other session are ignored.
    pub fn apply_change(&mut self, change: TabStateChange) -> bool {
        match &self.session {
            Some(session) if session.id() == change.session => {
                self.tabs[change.category.index()] = change.state;
                true
            }
            _ => false,
        }
    }

    // --- Tabs ---

    pub fn tab(&self, category: Category) -> &TabState {
        &self.tabs[category.index()]
    }

    pub fn active_state(&self) -> &TabState {
        self.tab(self.active_tab)
    }

    pub fn next_tab(&mut self) -> Category {
        let next = (self.active_tab.index() + 1) % Category::COUNT;
        self.select_tab(next)
    }

    pub fn previous_tab(&mut self) -> Category {
        let previous = (self.active_tab.index() + Category::COUNT - 1) % Category::COUNT;
        self.select_tab(previous)
    }

    fn select_tab(&mut self, index: usize) -> Category {
        if let Some(category) = Category::from_index(index) {
            self.active_tab = category;
            self.scroll_offset = 0;
        }
        self.active_tab
    }

    /// Pending with the retry budget spent.
    pub fn is_dormant(&self, category: Category) -> bool {
        self.tab(category).is_dormant(self.max_retries)
    }

    pub fn needs_activation(&self, category: Category) -> bool {
        self.tab(category).status == TabStatus::Unrequested
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }
}
