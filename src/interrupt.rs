//! Ctrl+C handling.
//!
//! The handler only raises a flag. The driver loop polls it and returns
//! normally, so every guard on the stack is released by ordinary scope exit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "shutdown requested" flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the process SIGINT handler and returns the flag it raises.
    ///
    /// Can only succeed once per process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let flag = Self::new();
        let handler_flag = flag.clone();
        ctrlc::set_handler(move || handler_flag.trigger())?;
        Ok(flag)
    }

    pub fn trigger(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
