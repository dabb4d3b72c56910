//! Signals the tool listens for while it owns the terminal or waits on a child

use std::fmt;
use std::io;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessSignal {
    Interrupt,
    Terminate,
    Hangup,
}

impl ProcessSignal {
    /// Shell convention: 128 + signal number.
    pub fn exit_code(self) -> u8 {
        match self {
            ProcessSignal::Hangup => 129,
            ProcessSignal::Interrupt => 130,
            ProcessSignal::Terminate => 143,
        }
    }
}

impl fmt::Display for ProcessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessSignal::Interrupt => "SIGINT",
            ProcessSignal::Terminate => "SIGTERM",
            ProcessSignal::Hangup => "SIGHUP",
        };
        f.write_str(name)
    }
}

/// Handlers for SIGINT, SIGTERM and SIGHUP. While one of these is alive the
/// signals are delivered here instead of killing the process.
pub struct Signals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
    #[cfg(unix)]
    hangup: Signal,
}

impl Signals {
    #[cfg(unix)]
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    #[cfg(not(unix))]
    pub fn new() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> ProcessSignal {
        tokio::select! {
            Some(()) = self.interrupt.recv() => ProcessSignal::Interrupt,
            Some(()) = self.terminate.recv() => ProcessSignal::Terminate,
            Some(()) = self.hangup.recv() => ProcessSignal::Hangup,
            else => std::future::pending().await,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> ProcessSignal {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ProcessSignal::Interrupt,
            Err(e) => {
                tracing::warn!("Ctrl+C handler failed: {}", e);
                std::future::pending().await
            }
        }
    }
}
