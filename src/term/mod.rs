//! Terminal resource lifecycle.
//!
//! Every mutation of process-wide terminal state goes through a guard that
//! captures the previous value and puts it back exactly once, whether the
//! scope ends normally, through `?`, or by unwinding. Guards declared later
//! are dropped first, so restoration runs in reverse acquisition order.
//!
//! - [`TerminalModeGuard`] - termios local flags (echo, canonical input)
//! - [`FileStatusGuard`] - stdin `fcntl` status flags (non-blocking reads)
//! - [`SignalSuspender`] - blocks a signal around those mutations
//! - [`TerminalWindow`] - dimensions, refreshed after SIGWINCH
//! - [`TerminalSurface`] - frame painter bounded by the window

mod control;
mod file_status;
mod mode;
mod signals;
mod surface;
mod window;

#[cfg(test)]
pub(crate) use control::testing;
pub use control::{TerminalControl, Tty};
pub use file_status::{FileStatusGuard, FileStatusSet, FileStatusSetter};
pub use mode::{TerminalModeGuard, TerminalModeSet, TerminalModeSetter};
pub use signals::{SignalSuspender, Suspension};
pub use surface::TerminalSurface;
pub use window::{Dimensions, TerminalWindow, resize_signal};

/// A terminal or file-descriptor control primitive failed.
#[derive(Debug)]
pub enum TerminalError {
    /// termios, `fcntl` or signal-mask call failed.
    Os(nix::Error),
    /// Window size query, signal registration or output write failed.
    Io(std::io::Error),
}

impl std::fmt::Display for TerminalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalError::Os(e) => write!(f, "terminal control error: {}", e),
            TerminalError::Io(e) => write!(f, "terminal I/O error: {}", e),
        }
    }
}

impl std::error::Error for TerminalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TerminalError::Os(e) => Some(e),
            TerminalError::Io(e) => Some(e),
        }
    }
}

impl From<nix::Error> for TerminalError {
    fn from(e: nix::Error) -> Self {
        TerminalError::Os(e)
    }
}

impl From<std::io::Error> for TerminalError {
    fn from(e: std::io::Error) -> Self {
        TerminalError::Io(e)
    }
}
