//! Sampler backed by `/proc/net/dev`.

use std::path::Path;

use super::parser::parse_net_dev;
use super::traits::FileSystem;
use super::{Sample, SampleError};

/// Reads interface counters from the procfs network device table.
#[derive(Debug)]
pub struct ProcfsSampler<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> ProcfsSampler<F> {
    /// Creates a new procfs sampler.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    pub fn get_sample(&self, interface: &str) -> Result<Sample, SampleError> {
        let path = format!("{}/net/dev", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;

        let dev = parse_net_dev(&content)
            .into_iter()
            .find(|dev| dev.interface == interface)
            .ok_or_else(|| SampleError::InterfaceNotFound(interface.to_string()))?;

        Ok(Sample::now(dev.rx_bytes, dev.tx_bytes))
    }
}
