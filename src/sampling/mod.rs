//! Interface counter sampling and bounded throughput history.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        SamplerDetector                        │
//! │   probes in order, keeps the first backend that answers       │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 │
//!        ┌────────────────────────┼─────────────────────────┐
//!        │                        │                         │
//! ┌──────▼───────┐        ┌───────▼───────┐        ┌────────▼────────┐
//! │ ProcfsSampler│        │ SysfsSampler  │        │ CommandSampler  │
//! │ net/dev      │        │ statistics/*  │        │ ip / netstat    │
//! └──────┬───────┘        └───────┬───────┘        └────────┬────────┘
//!        └────────────┬───────────┘                         │
//!              ┌──────▼──────┐                      ┌───────▼───────┐
//!              │ FileSystem  │ (trait)              │ CommandRunner │ (trait)
//!              └─────────────┘                      └───────────────┘
//! ```
//!
//! Samples flow into [`Throughput`], which derives per-tick deltas and stores
//! them in one [`TimeSeries`] per direction.

mod command;
mod detector;
pub mod mock;
pub mod parser;
mod procfs;
mod sysfs;
mod throughput;
mod time_series;
pub mod traits;

pub use command::{CommandKind, CommandSampler};
pub use detector::{DetectError, SamplerDetector};
pub use procfs::ProcfsSampler;
pub use sysfs::SysfsSampler;
pub use throughput::{Throughput, counter_delta};
pub use time_series::TimeSeries;
pub use traits::{CommandOutput, CommandRunner, FileSystem, RealFs, SystemRunner};

use chrono::{DateTime, Local};

/// Wall-clock instant used for samples and time-series keys.
pub type TimePoint = DateTime<Local>;

/// One reading of an interface's cumulative byte counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Bytes received since the interface was created.
    pub received_bytes: u64,
    /// Bytes transmitted since the interface was created.
    pub transmitted_bytes: u64,
    /// Moment the counters were read.
    pub timestamp: TimePoint,
}

impl Sample {
    /// Builds a sample stamped with the current time.
    pub fn now(received_bytes: u64, transmitted_bytes: u64) -> Self {
        Self {
            received_bytes,
            transmitted_bytes,
            timestamp: Local::now(),
        }
    }
}

/// A counter source could not produce a sample for the interface.
#[derive(Debug)]
pub enum SampleError {
    /// Counter file or command could not be accessed.
    Io(std::io::Error),
    /// Content was read but could not be understood.
    Parse(String),
    /// The source has no entry for the interface.
    InterfaceNotFound(String),
    /// The external command ran but reported failure.
    Command(String),
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Io(e) => write!(f, "I/O error: {}", e),
            SampleError::Parse(msg) => write!(f, "parse error: {}", msg),
            SampleError::InterfaceNotFound(name) => write!(f, "interface {} not found", name),
            SampleError::Command(msg) => write!(f, "command failed: {}", msg),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SampleError {
    fn from(e: std::io::Error) -> Self {
        SampleError::Io(e)
    }
}

impl From<parser::ParseError> for SampleError {
    fn from(e: parser::ParseError) -> Self {
        SampleError::Parse(e.message)
    }
}

/// A counter source selected once per process.
#[derive(Debug)]
pub enum Sampler<F: FileSystem, R: CommandRunner> {
    Procfs(ProcfsSampler<F>),
    Sysfs(SysfsSampler<F>),
    Command(CommandSampler<R>),
}

impl<F: FileSystem, R: CommandRunner> Sampler<F, R> {
    /// Reads the current counters for `interface`.
    pub fn get_sample(&self, interface: &str) -> Result<Sample, SampleError> {
        match self {
            Sampler::Procfs(s) => s.get_sample(interface),
            Sampler::Sysfs(s) => s.get_sample(interface),
            Sampler::Command(s) => s.get_sample(interface),
        }
    }

    /// Short backend name for logs and error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Sampler::Procfs(_) => "procfs",
            Sampler::Sysfs(_) => "sysfs",
            Sampler::Command(s) => s.kind().program(),
        }
    }
}
