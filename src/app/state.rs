use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use futures::{Stream, StreamExt};
use ratatui::{backend::Backend, Terminal};
use std::future::Future;
use std::io;
use std::path::PathBuf;

use super::keymap::{action_for, Action};
use super::selector::{viewport_rows, MenuInput, Selector, Transition};
use super::types::{App, MenuOutcome, Mode};
use crate::models::HostEntry;
use crate::signals::ProcessSignal;
use crate::{ssh_service, ui};

impl App {
    pub fn new(hosts: Vec<HostEntry>, key_dir: Option<PathBuf>) -> Self {
        let selector = Selector::new(hosts.len());
        Self {
            hosts,
            selector,
            mode: Mode::Hosts,
            key_dir,
            keys: Vec::new(),
            key_selector: Selector::new(0),
            status_message: None,
        }
    }

    pub fn with_status(mut self, message: Option<String>) -> Self {
        self.status_message = message;
        self
    }

    pub fn current_host(&self) -> Option<&HostEntry> {
        self.hosts.get(self.selector.cursor())
    }

    pub fn set_viewport(&mut self, rows: usize) {
        self.selector.set_viewport(rows);
        self.key_selector.set_viewport(rows);
    }

    /// Apply one key press. `Some` means the menu is done.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<MenuOutcome> {
        self.status_message = None;

        match (action_for(key), self.mode) {
            (Action::Interrupt, _) => Some(MenuOutcome::Quit),
            (Action::Ignore, _) => None,
            (Action::Menu(input), Mode::Hosts) => self.on_host_input(input),
            (Action::Menu(input), Mode::KeyPicker) => self.on_key_picker_input(input),
            (Action::CopyKey, Mode::Hosts) => {
                self.open_key_picker();
                None
            }
            (Action::CopyKey, Mode::KeyPicker) => None,
        }
    }

    fn on_host_input(&mut self, input: MenuInput) -> Option<MenuOutcome> {
        match self.selector.apply(input) {
            Transition::Browsing => None,
            Transition::Selected(index) => {
                let host = self.hosts[index].clone();
                tracing::info!("Selected host: {}", host.alias);
                Some(MenuOutcome::Connect(host))
            }
            Transition::Cancelled => Some(MenuOutcome::Quit),
        }
    }

    fn on_key_picker_input(&mut self, input: MenuInput) -> Option<MenuOutcome> {
        match self.key_selector.apply(input) {
            Transition::Browsing => None,
            Transition::Selected(index) => {
                let host = self.current_host()?.clone();
                let key = self.keys[index].clone();
                tracing::info!("Selected key {:?} for host {}", key, host.alias);
                Some(MenuOutcome::CopyKey { host, key })
            }
            Transition::Cancelled => {
                self.mode = Mode::Hosts;
                None
            }
        }
    }

    fn open_key_picker(&mut self) {
        let Some(host) = self.current_host() else {
            return;
        };
        if host.has_identity_file() {
            self.status_message = Some(format!("{} already has an IdentityFile", host.alias));
            return;
        }
        let Some(dir) = self.key_dir.clone() else {
            self.status_message = Some("No key directory to pick keys from".to_string());
            return;
        };

        match ssh_service::list_key_pairs(&dir) {
            Ok(keys) if keys.is_empty() => {
                self.status_message = Some(format!("No key pairs found in {}", dir.display()));
            }
            Ok(keys) => {
                let mut key_selector = Selector::new(keys.len());
                key_selector.set_viewport(self.selector.viewport());
                self.key_selector = key_selector;
                self.keys = keys;
                self.mode = Mode::KeyPicker;
            }
            Err(e) => {
                tracing::error!("Failed to list keys in {:?}: {:?}", dir, e);
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

/// Run the menu until the user picks something, quits, or `shutdown` fires.
/// One key press is read and fully handled before the next redraw.
pub async fn run_menu<B, E, S>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut E,
    shutdown: S,
) -> Result<MenuOutcome>
where
    B: Backend,
    E: Stream<Item = io::Result<Event>> + Unpin,
    S: Future<Output = ProcessSignal>,
{
    if app.hosts.is_empty() {
        return Ok(MenuOutcome::Quit);
    }
    tokio::pin!(shutdown);

    loop {
        let size = terminal.size().context("Failed to read terminal size")?;
        app.set_viewport(viewport_rows(size.height));
        terminal.draw(|f| ui::draw(f, app))?;

        let event = tokio::select! {
            biased;
            caught = &mut shutdown => {
                tracing::info!("{} received, leaving the menu", caught);
                return Ok(MenuOutcome::Quit);
            }
            event = events.next() => event,
        };
        let Some(event) = event else {
            tracing::warn!("Terminal event stream closed");
            return Ok(MenuOutcome::Quit);
        };

        if let Event::Key(key) = event.context("Failed to read terminal event")? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(outcome) = app.handle_key(key) {
                return Ok(outcome);
            }
        }
    }
}
