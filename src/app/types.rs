use std::path::PathBuf;

use super::selector::Selector;
use crate::models::HostEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hosts,
    KeyPicker,
}

/// What the menu hands back once it gives up the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Connect(HostEntry),
    CopyKey { host: HostEntry, key: PathBuf },
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub hosts: Vec<HostEntry>,
    pub selector: Selector,
    pub mode: Mode,

    // Key picker
    pub key_dir: Option<PathBuf>,
    pub keys: Vec<PathBuf>,
    pub key_selector: Selector,

    /// Shown in the status bar until the next key press.
    pub status_message: Option<String>,
}
