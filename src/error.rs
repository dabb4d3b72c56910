use std::path::PathBuf;

use crate::signals::ProcessSignal;

/// Failures the tool reports to the user. Everything else travels as `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SSH config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Key directory not found: {}", .0.display())]
    KeyDirNotFound(PathBuf),

    #[error("No hosts found in {}", .0.display())]
    NoHostsParsed(PathBuf),

    #[error("Host '{0}' is not present in the SSH config")]
    UnknownHostAlias(String),

    #[error("Malformed line: {0}")]
    MalformedLine(String),

    #[error("Interrupted by {0}")]
    Interrupted(ProcessSignal),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
