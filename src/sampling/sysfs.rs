//! Sampler backed by `/sys/class/net/<iface>/statistics`.

use std::path::Path;

use super::parser::parse_counter;
use super::traits::FileSystem;
use super::{Sample, SampleError};

/// Reads interface counters from per-interface sysfs statistics files.
#[derive(Debug)]
pub struct SysfsSampler<F: FileSystem> {
    fs: F,
    sys_path: String,
}

impl<F: FileSystem> SysfsSampler<F> {
    /// Creates a new sysfs sampler rooted at `sys_path` (usually "/sys").
    pub fn new(fs: F, sys_path: impl Into<String>) -> Self {
        Self {
            fs,
            sys_path: sys_path.into(),
        }
    }

    pub fn get_sample(&self, interface: &str) -> Result<Sample, SampleError> {
        let base = format!("{}/class/net/{}", self.sys_path, interface);
        if !self.fs.exists(Path::new(&base)) {
            return Err(SampleError::InterfaceNotFound(interface.to_string()));
        }

        let rx = self.read_stat(&base, "rx_bytes")?;
        let tx = self.read_stat(&base, "tx_bytes")?;
        Ok(Sample::now(rx, tx))
    }

    fn read_stat(&self, base: &str, name: &str) -> Result<u64, SampleError> {
        let path = format!("{}/statistics/{}", base, name);
        let content = self.fs.read_to_string(Path::new(&path))?;
        Ok(parse_counter(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::mock::MockFs;
    use crate::sampling::traits::RealFs;
    use std::fs;

    #[test]
    fn test_sysfs_sample() {
        let mut fs = MockFs::new();
        fs.add_sysfs_stats("/sys", "eth0", 4096, 512);

        let sampler = SysfsSampler::new(fs, "/sys");
        let sample = sampler.get_sample("eth0").unwrap();
        assert_eq!(sample.received_bytes, 4096);
        assert_eq!(sample.transmitted_bytes, 512);
    }

    #[test]
    fn test_sysfs_unknown_interface() {
        let sampler = SysfsSampler::new(MockFs::new(), "/sys");
        assert!(matches!(
            sampler.get_sample("eth0"),
            Err(SampleError::InterfaceNotFound(_))
        ));
    }

    #[test]
    fn test_sysfs_garbage_counter() {
        let mut fs = MockFs::new();
        fs.add_file("/sys/class/net/eth0/statistics/rx_bytes", "n/a\n");
        fs.add_file("/sys/class/net/eth0/statistics/tx_bytes", "1\n");

        let sampler = SysfsSampler::new(fs, "/sys");
        assert!(matches!(sampler.get_sample("eth0"), Err(SampleError::Parse(_))));
    }

    #[test]
    fn test_sysfs_on_real_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let stats = dir.path().join("class/net/eth0/statistics");
        fs::create_dir_all(&stats).unwrap();
        fs::write(stats.join("rx_bytes"), "100\n").unwrap();
        fs::write(stats.join("tx_bytes"), "200\n").unwrap();

        let sampler = SysfsSampler::new(RealFs::new(), dir.path().to_string_lossy());
        let sample = sampler.get_sample("eth0").unwrap();
        assert_eq!(sample.received_bytes, 100);
        assert_eq!(sample.transmitted_bytes, 200);
    }
}
