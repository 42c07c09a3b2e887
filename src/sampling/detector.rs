//! Startup selection of a working counter source.

use tracing::{debug, info};

use super::command::{CommandKind, CommandSampler};
use super::procfs::ProcfsSampler;
use super::sysfs::SysfsSampler;
use super::traits::{CommandRunner, FileSystem};
use super::{Sample, SampleError, Sampler};

/// Every backend failed during detection.
#[derive(Debug)]
pub enum DetectError {
    NoSamplerAvailable {
        interface: String,
        /// Backend name and the reason it was rejected, in probe order.
        attempts: Vec<(&'static str, SampleError)>,
    },
}

impl std::fmt::Display for DetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectError::NoSamplerAvailable {
                interface,
                attempts,
            } => {
                write!(f, "no working counter source for interface {}", interface)?;
                for (name, err) in attempts {
                    write!(f, "\n  {}: {}", name, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for DetectError {}

/// Probes samplers in priority order and keeps the first that works.
pub struct SamplerDetector<F: FileSystem, R: CommandRunner> {
    candidates: Vec<Sampler<F, R>>,
}

impl<F: FileSystem + Clone, R: CommandRunner + Clone> SamplerDetector<F, R> {
    /// Creates a detector with the standard priority: procfs, sysfs, then the
    /// `ip` and `netstat` commands.
    pub fn new(fs: F, runner: R, proc_path: &str, sys_path: &str) -> Self {
        Self::with_candidates(vec![
            Sampler::Procfs(ProcfsSampler::new(fs.clone(), proc_path)),
            Sampler::Sysfs(SysfsSampler::new(fs, sys_path)),
            Sampler::Command(CommandSampler::new(runner.clone(), CommandKind::Ip)),
            Sampler::Command(CommandSampler::new(runner, CommandKind::Netstat)),
        ])
    }
}

impl<F: FileSystem, R: CommandRunner> SamplerDetector<F, R> {
    /// Creates a detector over an explicit, ordered candidate list.
    pub fn with_candidates(candidates: Vec<Sampler<F, R>>) -> Self {
        Self { candidates }
    }

    /// Returns the first sampler that reads `interface`, along with the sample
    /// it produced. Candidates after the winner are never touched.
    pub fn detect_sampler(self, interface: &str) -> Result<(Sampler<F, R>, Sample), DetectError> {
        let mut attempts = Vec::new();

        for sampler in self.candidates {
            match sampler.get_sample(interface) {
                Ok(sample) => {
                    info!("Using {} counters for {}", sampler.name(), interface);
                    return Ok((sampler, sample));
                }
                Err(e) => {
                    debug!("Sampler {} unavailable for {}: {}", sampler.name(), interface, e);
                    attempts.push((sampler.name(), e));
                }
            }
        }

        Err(DetectError::NoSamplerAvailable {
            interface: interface.to_string(),
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::mock::{MockFs, MockRunner};

    const IP_OUTPUT: &str = "\
3: wlan0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500
    link/ether 52:54:00:aa:bb:cc brd ff:ff:ff:ff:ff:ff
    RX:  bytes packets errors dropped  missed   mcast
          777       7      0       0       0       0
    TX:  bytes packets errors dropped carrier collsns
          888       8      0       0       0       0
";

    #[test]
    fn test_detect_prefers_procfs() {
        let mut fs = MockFs::new();
        fs.add_net_dev("/proc", &[("eth0", 1, 2)]);
        fs.add_sysfs_stats("/sys", "eth0", 3, 4);
        let runner = MockRunner::new();

        let detector = SamplerDetector::new(fs, runner.clone(), "/proc", "/sys");
        let (sampler, sample) = detector.detect_sampler("eth0").unwrap();
        assert_eq!(sampler.name(), "procfs");
        assert_eq!(sample.received_bytes, 1);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_detect_falls_back_to_sysfs() {
        let mut fs = MockFs::new();
        fs.add_net_dev("/proc", &[("lo", 1, 1)]);
        fs.add_sysfs_stats("/sys", "eth0", 3, 4);

        let detector = SamplerDetector::new(fs, MockRunner::new(), "/proc", "/sys");
        let (sampler, sample) = detector.detect_sampler("eth0").unwrap();
        assert_eq!(sampler.name(), "sysfs");
        assert_eq!(sample.transmitted_bytes, 4);
    }

    #[test]
    fn test_detect_third_candidate_wins_and_fourth_never_runs() {
        let mut runner = MockRunner::new();
        runner.add_output("ip", IP_OUTPUT);
        runner.add_output("netstat", "");
        let calls = runner.clone();

        let detector = SamplerDetector::new(MockFs::new(), runner, "/proc", "/sys");
        let (sampler, sample) = detector.detect_sampler("wlan0").unwrap();

        assert_eq!(sampler.name(), "ip");
        assert_eq!(sample.received_bytes, 777);
        assert_eq!(sample.transmitted_bytes, 888);
        assert_eq!(calls.calls(), vec!["ip"]);
    }

    #[test]
    fn test_detect_chosen_sampler_keeps_working() {
        let mut fs = MockFs::new();
        fs.add_sysfs_stats("/sys", "eth0", 10, 20);

        let detector = SamplerDetector::new(fs, MockRunner::new(), "/proc", "/sys");
        let (sampler, _) = detector.detect_sampler("eth0").unwrap();
        assert_eq!(sampler.get_sample("eth0").unwrap().received_bytes, 10);
    }

    #[test]
    fn test_detect_result_is_debug_printable() {
        let mut fs = MockFs::new();
        fs.add_sysfs_stats("/sys", "eth0", 3, 4);

        let detector = SamplerDetector::new(fs, MockRunner::new(), "/proc", "/sys");
        let result = detector.detect_sampler("eth0");
        let rendered = format!("{:?}", result);
        assert!(rendered.starts_with("Ok((Sysfs(SysfsSampler"));
    }

    #[test]
    fn test_detect_nothing_available() {
        let mut runner = MockRunner::new();
        runner.add_failure("ip");
        let calls = runner.clone();

        let detector = SamplerDetector::new(MockFs::new(), runner, "/proc", "/sys");
        let err = detector.detect_sampler("eth0").unwrap_err();

        let DetectError::NoSamplerAvailable {
            interface,
            attempts,
        } = &err;
        assert_eq!(interface, "eth0");
        let names: Vec<&str> = attempts.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["procfs", "sysfs", "ip", "netstat"]);
        assert_eq!(calls.calls(), vec!["ip", "netstat"]);

        let report = err.to_string();
        assert!(report.contains("no working counter source for interface eth0"));
        assert!(report.contains("ip: command failed"));
    }
}
