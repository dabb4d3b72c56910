//! Reading `~/.ssh/config` into host entries and deriving rewritten copies of it

mod parser;
mod rewriter;

pub use parser::{parse_ssh_config, parse_ssh_config_content};
pub use rewriter::{rewrite_identity_files, write_derived_config, DerivedConfig};
