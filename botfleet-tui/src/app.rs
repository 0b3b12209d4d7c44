//! Application state for the TUI.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use botfleet_core::request::ReconcileRequest;
use botfleet_core::router::SELECT_ALL;
use botfleet_core::{FleetError, InputHistory, Selector};

use crate::config::{Config, Resolved};
use crate::logsink::LogBuffer;

/// Which widget receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Host,
    Port,
    Clients,
    Nicknames,
    Selector,
    Input,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Host,
        Focus::Port,
        Focus::Clients,
        Focus::Nicknames,
        Focus::Selector,
        Focus::Input,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// What the main loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Reconcile {
        request: ReconcileRequest,
        nicknames: PathBuf,
    },
    Dispatch {
        selector: Selector,
        text: String,
    },
    Quit,
}

pub struct App {
    pub host: String,
    pub port: String,
    pub clients: String,
    pub nicknames: String,
    pub channel: String,
    pub seed: Option<u64>,
    pub focus: Focus,
    /// `All` followed by bot nicknames in creation order.
    pub selector_options: Vec<String>,
    pub selected: usize,
    /// Command line contents. Starts out as the `/` sentinel.
    pub input: String,
    pub history: InputHistory,
    pub log: LogBuffer,
    /// A reconcile has been handed off and has not reported back yet.
    pub connecting: bool,
    pub online: usize,
    pub pool_remaining: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(settings: &Resolved, log: LogBuffer) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port.to_string(),
            clients: settings.clients.to_string(),
            nicknames: settings.nicknames.display().to_string(),
            channel: settings.channel.clone(),
            seed: settings.seed,
            focus: Focus::Clients,
            selector_options: vec![SELECT_ALL.to_string()],
            selected: 0,
            input: InputHistory::sentinel(),
            history: InputHistory::new(),
            log,
            connecting: false,
            online: 0,
            pool_remaining: 0,
            should_quit: false,
        }
    }

    /// Number of bots in the fleet, as last synced.
    pub fn fleet_size(&self) -> usize {
        self.selector_options.len() - 1
    }

    /// Rebuild the selector from the fleet's current names. The selection
    /// sticks to the same bot if it still exists, otherwise falls back to
    /// `All`.
    pub fn set_bots(&mut self, names: Vec<String>) {
        let current = self.selector_options.get(self.selected).cloned();
        let mut options = Vec::with_capacity(names.len() + 1);
        options.push(SELECT_ALL.to_string());
        options.extend(names);
        self.selected = current
            .and_then(|c| options.iter().position(|o| *o == c))
            .unwrap_or(0);
        self.selector_options = options;
    }

    pub fn selector(&self) -> Selector {
        self.selector_options
            .get(self.selected)
            .map(|label| Selector::parse(label))
            .unwrap_or(Selector::All)
    }

    pub fn reconcile_request(&self) -> Result<ReconcileRequest, FleetError> {
        ReconcileRequest::parse(&self.clients, &self.host, &self.port)
    }

    /// Form values to persist on quit.
    pub fn to_config(&self) -> Config {
        Config {
            host: Some(self.host.trim().to_string()).filter(|h| !h.is_empty()),
            port: self.port.trim().parse().ok(),
            clients: self.clients.trim().parse().ok(),
            nicknames: Some(PathBuf::from(self.nicknames.trim())).filter(|p| !p.as_os_str().is_empty()),
            channel: Some(self.channel.clone()),
            seed: self.seed,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return self.quit(),
            KeyCode::Esc => return self.quit(),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Action::None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return Action::None;
            }
            KeyCode::F(5) => return self.trigger_reconcile(),
            _ => {}
        }

        match self.focus {
            Focus::Selector => self.selector_key(key.code),
            Focus::Input => self.input_key(key.code),
            field => self.form_key(field, key.code),
        }
    }

    fn quit(&mut self) -> Action {
        self.should_quit = true;
        Action::Quit
    }

    fn trigger_reconcile(&self) -> Action {
        // One reconcile at a time; the pool is left alone until it reports back.
        if self.connecting {
            tracing::warn!("A reconciliation is already running");
            return Action::None;
        }
        match self.reconcile_request() {
            Ok(request) => Action::Reconcile {
                request,
                nicknames: PathBuf::from(self.nicknames.trim()),
            },
            Err(e) => {
                tracing::error!("{e}");
                Action::None
            }
        }
    }

    fn form_key(&mut self, field: Focus, code: KeyCode) -> Action {
        let value = match field {
            Focus::Host => &mut self.host,
            Focus::Port => &mut self.port,
            Focus::Clients => &mut self.clients,
            Focus::Nicknames => &mut self.nicknames,
            Focus::Selector | Focus::Input => return Action::None,
        };
        match code {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Enter => return self.trigger_reconcile(),
            _ => {}
        }
        Action::None
    }

    fn selector_key(&mut self, code: KeyCode) -> Action {
        let n = self.selector_options.len();
        match code {
            KeyCode::Left | KeyCode::Up => self.selected = (self.selected + n - 1) % n,
            KeyCode::Right | KeyCode::Down => self.selected = (self.selected + 1) % n,
            KeyCode::Home => self.selected = 0,
            KeyCode::Enter => self.focus = Focus::Input,
            _ => {}
        }
        Action::None
    }

    fn input_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Up => {
                if let Some(entry) = self.history.navigate_up() {
                    self.input = entry.to_string();
                }
            }
            KeyCode::Down => {
                if let Some(entry) = self.history.navigate_down() {
                    self.input = entry;
                }
            }
            KeyCode::Enter => return self.submit_input(),
            _ => {}
        }
        Action::None
    }

    fn submit_input(&mut self) -> Action {
        if self.input.is_empty() {
            return Action::None;
        }
        let text = std::mem::replace(&mut self.input, InputHistory::sentinel());
        self.history.submit(&text);
        Action::Dispatch {
            selector: self.selector(),
            text,
        }
    }
}

/// Strip terminal control characters (ESC sequences, C0/C1 controls) from
/// text before it reaches the screen.
pub fn sanitize_text(s: &str) -> String {
    s.chars()
        .filter(|&c| c == '\t' || (c >= ' ' && c != '\x7f' && !('\u{80}'..='\u{9f}').contains(&c)))
        .collect()
}
