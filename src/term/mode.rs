//! Terminal line-discipline mode changes with guaranteed restoration.
//!
//! ```ignore
//! let mut setter = TerminalModeSet::new()
//!     .local_off(LocalFlags::ECHO)
//!     .local_off(LocalFlags::ICANON)
//!     .build_setter(&tty, &sigint);
//! let _guard = TerminalModeGuard::acquire(&mut setter)?;
//! // echo and canonical input stay off until `_guard` goes out of scope
//! ```

use nix::sys::termios::LocalFlags;
use tracing::{debug, warn};

use super::control::TerminalControl;
use super::signals::SignalSuspender;
use super::TerminalError;

/// Accumulates local-mode flags to switch on and off.
#[derive(Debug, Clone, Copy)]
pub struct TerminalModeSet {
    on: LocalFlags,
    off: LocalFlags,
}

impl TerminalModeSet {
    pub fn new() -> Self {
        Self {
            on: LocalFlags::empty(),
            off: LocalFlags::empty(),
        }
    }

    pub fn local_on(mut self, flags: LocalFlags) -> Self {
        self.on |= flags;
        self.off &= !flags;
        self
    }

    pub fn local_off(mut self, flags: LocalFlags) -> Self {
        self.off |= flags;
        self.on &= !flags;
        self
    }

    /// Flags resulting from applying this set on top of `current`.
    pub fn apply_to(&self, current: LocalFlags) -> LocalFlags {
        (current | self.on) & !self.off
    }

    /// Binds the set to a terminal. Mutations run with `suspender`'s signal
    /// blocked.
    pub fn build_setter<'a, C: TerminalControl>(
        self,
        control: &'a C,
        suspender: &'a SignalSuspender,
    ) -> TerminalModeSetter<'a, C> {
        TerminalModeSetter {
            control,
            suspender,
            set: self,
            previous: None,
        }
    }
}

impl Default for TerminalModeSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a [`TerminalModeSet`] and remembers the flags it replaced.
pub struct TerminalModeSetter<'a, C: TerminalControl> {
    control: &'a C,
    suspender: &'a SignalSuspender,
    set: TerminalModeSet,
    previous: Option<LocalFlags>,
}

impl<'a, C: TerminalControl> TerminalModeSetter<'a, C> {
    /// Captures the current flags and applies the set. Applying twice without
    /// a restore in between keeps the first capture.
    pub fn apply(&mut self) -> Result<(), TerminalError> {
        if self.previous.is_some() {
            return Ok(());
        }
        let _suspension = self.suspender.suspend()?;
        let current = self.control.local_flags()?;
        self.control.set_local_flags(self.set.apply_to(current))?;
        self.previous = Some(current);
        debug!("Terminal local flags {:?} -> {:?}", current, self.set.apply_to(current));
        Ok(())
    }

    /// Puts back the captured flags. Does nothing if nothing is applied.
    pub fn restore(&mut self) -> Result<(), TerminalError> {
        let Some(previous) = self.previous else {
            return Ok(());
        };
        let _suspension = self.suspender.suspend()?;
        self.control.set_local_flags(previous)?;
        self.previous = None;
        Ok(())
    }

    pub fn is_applied(&self) -> bool {
        self.previous.is_some()
    }
}

/// Keeps a mode applied for the guard's lifetime.
pub struct TerminalModeGuard<'s, 'a, C: TerminalControl> {
    setter: &'s mut TerminalModeSetter<'a, C>,
}

impl<'s, 'a, C: TerminalControl> TerminalModeGuard<'s, 'a, C> {
    pub fn acquire(setter: &'s mut TerminalModeSetter<'a, C>) -> Result<Self, TerminalError> {
        setter.apply()?;
        Ok(Self { setter })
    }

    /// Restores the terminal now. Later calls, and the drop, do nothing.
    pub fn release(&mut self) -> Result<(), TerminalError> {
        self.setter.restore()
    }
}

impl<C: TerminalControl> Drop for TerminalModeGuard<'_, '_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.setter.restore() {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}
