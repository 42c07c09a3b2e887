//! Terminal window dimensions, refreshed after SIGWINCH.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::Signal;
use signal_hook::SigId;
use tracing::debug;

use super::control::TerminalControl;
use super::signals::SignalSuspender;
use super::TerminalError;

/// Size of the terminal in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub columns: u16,
    pub rows: u16,
}

/// Source of truth for the drawable area.
pub struct TerminalWindow<'a, C: TerminalControl> {
    control: &'a C,
    suspender: &'a SignalSuspender,
    resized: Arc<AtomicBool>,
    registration: Option<SigId>,
    dimensions: Dimensions,
}

impl<'a, C: TerminalControl> TerminalWindow<'a, C> {
    /// Reads the current size and subscribes to resize notifications for the
    /// signal `suspender` blocks (SIGWINCH).
    pub fn create(control: &'a C, suspender: &'a SignalSuspender) -> Result<Self, TerminalError> {
        let resized = Arc::new(AtomicBool::new(false));
        let registration = signal_hook::flag::register(suspender.signal() as i32, Arc::clone(&resized))?;
        let mut window = Self::with_resize_flag(control, suspender, resized)?;
        window.registration = Some(registration);
        Ok(window)
    }

    /// Builds a window that watches an externally owned resize flag.
    pub fn with_resize_flag(
        control: &'a C,
        suspender: &'a SignalSuspender,
        resized: Arc<AtomicBool>,
    ) -> Result<Self, TerminalError> {
        let dimensions = read_dimensions(control, suspender)?;
        Ok(Self {
            control,
            suspender,
            resized,
            registration: None,
            dimensions,
        })
    }

    /// Current dimensions, re-read first if a resize was signalled since the
    /// last call.
    pub fn dimensions(&mut self) -> Result<Dimensions, TerminalError> {
        if self.resized.swap(false, Ordering::SeqCst) {
            self.dimensions = read_dimensions(self.control, self.suspender)?;
            debug!(
                "Terminal resized to {}x{}",
                self.dimensions.columns, self.dimensions.rows
            );
        }
        Ok(self.dimensions)
    }
}

impl<C: TerminalControl> Drop for TerminalWindow<'_, C> {
    fn drop(&mut self) {
        if let Some(id) = self.registration.take() {
            signal_hook::low_level::unregister(id);
        }
    }
}

fn read_dimensions<C: TerminalControl>(
    control: &C,
    suspender: &SignalSuspender,
) -> Result<Dimensions, TerminalError> {
    let _suspension = suspender.suspend()?;
    let (columns, rows) = control.window_size()?;
    Ok(Dimensions { columns, rows })
}

/// The signal that announces window size changes.
pub fn resize_signal() -> Signal {
    Signal::SIGWINCH
}
