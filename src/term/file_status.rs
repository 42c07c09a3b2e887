//! File-status flag changes on standard input with guaranteed restoration.
//!
//! Mirrors [`mode`](super::mode) for `fcntl` status flags, e.g. switching
//! stdin to non-blocking reads for the lifetime of a guard.

use nix::fcntl::OFlag;
use tracing::{debug, warn};

use super::control::TerminalControl;
use super::signals::SignalSuspender;
use super::TerminalError;

/// Accumulates status flags to switch on and off.
#[derive(Debug, Clone, Copy)]
pub struct FileStatusSet {
    on: OFlag,
    off: OFlag,
}

impl FileStatusSet {
    pub fn new() -> Self {
        Self {
            on: OFlag::empty(),
            off: OFlag::empty(),
        }
    }

    pub fn status_on(mut self, flags: OFlag) -> Self {
        self.on |= flags;
        self.off &= !flags;
        self
    }

    pub fn status_off(mut self, flags: OFlag) -> Self {
        self.off |= flags;
        self.on &= !flags;
        self
    }

    pub fn apply_to(&self, current: OFlag) -> OFlag {
        (current | self.on) & !self.off
    }

    pub fn build_setter<'a, C: TerminalControl>(
        self,
        control: &'a C,
        suspender: &'a SignalSuspender,
    ) -> FileStatusSetter<'a, C> {
        FileStatusSetter {
            control,
            suspender,
            set: self,
            previous: None,
        }
    }
}

impl Default for FileStatusSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a [`FileStatusSet`] and remembers the flags it replaced.
pub struct FileStatusSetter<'a, C: TerminalControl> {
    control: &'a C,
    suspender: &'a SignalSuspender,
    set: FileStatusSet,
    previous: Option<OFlag>,
}

impl<'a, C: TerminalControl> FileStatusSetter<'a, C> {
    pub fn apply(&mut self) -> Result<(), TerminalError> {
        if self.previous.is_some() {
            return Ok(());
        }
        let _suspension = self.suspender.suspend()?;
        let current = self.control.status_flags()?;
        self.control.set_status_flags(self.set.apply_to(current))?;
        self.previous = Some(current);
        debug!("Stdin status flags {:?} -> {:?}", current, self.set.apply_to(current));
        Ok(())
    }

    pub fn restore(&mut self) -> Result<(), TerminalError> {
        let Some(previous) = self.previous else {
            return Ok(());
        };
        let _suspension = self.suspender.suspend()?;
        self.control.set_status_flags(previous)?;
        self.previous = None;
        Ok(())
    }

    pub fn is_applied(&self) -> bool {
        self.previous.is_some()
    }
}

/// Keeps status flags applied for the guard's lifetime.
pub struct FileStatusGuard<'s, 'a, C: TerminalControl> {
    setter: &'s mut FileStatusSetter<'a, C>,
}

impl<'s, 'a, C: TerminalControl> FileStatusGuard<'s, 'a, C> {
    pub fn acquire(setter: &'s mut FileStatusSetter<'a, C>) -> Result<Self, TerminalError> {
        setter.apply()?;
        Ok(Self { setter })
    }

    pub fn release(&mut self) -> Result<(), TerminalError> {
        self.setter.restore()
    }
}

impl<C: TerminalControl> Drop for FileStatusGuard<'_, '_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.setter.restore() {
            warn!("Failed to restore stdin status flags: {}", e);
        }
    }
}
