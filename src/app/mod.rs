pub mod keymap;
pub mod selector;
mod state;
mod types;

pub use state::run_menu;
pub use types::{App, MenuOutcome, Mode};
