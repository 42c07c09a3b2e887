//! Scoped blocking of asynchronous signals.
//!
//! Terminal and file-descriptor state is mutated inside a [`Suspension`] so a
//! resize or interrupt handler never observes a half-applied change.

use nix::sys::signal::{SigSet, SigmaskHow, Signal, pthread_sigmask};
use tracing::warn;

use super::TerminalError;

/// Blocks one signal for as long as a [`Suspension`] is held.
#[derive(Debug, Clone, Copy)]
pub struct SignalSuspender {
    signal: Signal,
}

impl SignalSuspender {
    pub fn new(signal: Signal) -> Self {
        Self { signal }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Blocks the signal for the calling thread until the returned value is
    /// dropped. Deliveries raised meanwhile stay pending and arrive on drop.
    pub fn suspend(&self) -> Result<Suspension, TerminalError> {
        let mut set = SigSet::empty();
        set.add(self.signal);
        let mut previous = SigSet::empty();
        pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut previous))?;
        Ok(Suspension { previous })
    }
}

/// Restores the signal mask captured by [`SignalSuspender::suspend`].
#[must_use = "the signal is unblocked as soon as the suspension is dropped"]
pub struct Suspension {
    previous: SigSet,
}

impl Drop for Suspension {
    fn drop(&mut self) {
        if let Err(e) = pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None) {
            warn!("Failed to restore signal mask: {}", e);
        }
    }
}
